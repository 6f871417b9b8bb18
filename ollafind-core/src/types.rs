//! Core data types for candidates, probe responses and findings
//!
//! # Examples
//!
//! ```
//! use ollafind_core::types::{ModelEntry, ProbeRecord};
//!
//! let model = ModelEntry::new("llama3");
//! let records = ProbeRecord::from_models("http://1.2.3.4:11434", &[model]);
//! assert_eq!(records[0].host, "1.2.3.4");
//! assert_eq!(records[0].model_name, "llama3");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A link returned by FOFA, believed to host Ollama
pub type CandidateEndpoint = String;

/// One entry of the `models` list returned by `/api/tags`
///
/// Only `name` is required; every other field is kept verbatim so the
/// line-log can reproduce the full entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelEntry {
    pub name: String,

    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl ModelEntry {
    /// Creates an entry with no extra details
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: Map::new(),
        }
    }

    /// Compact JSON form used for the line-log
    pub fn to_log_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.name.clone())
    }
}

/// Body of a successful `/api/tags` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagsResponse {
    pub models: Vec<ModelEntry>,
}

/// A confirmed model on an exposed endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeRecord {
    /// Host part of the URL, scheme, port and path removed
    pub host: String,
    pub url: CandidateEndpoint,
    pub model_name: String,
}

impl ProbeRecord {
    /// Builds one record per model, all sharing the same host and url
    pub fn from_models(url: &str, models: &[ModelEntry]) -> Vec<Self> {
        let host = host_of(url);
        models
            .iter()
            .map(|model| ProbeRecord {
                host: host.clone(),
                url: url.to_string(),
                model_name: model.name.clone(),
            })
            .collect()
    }
}

/// Extracts the bare host from a candidate URL
///
/// Strips `http://` / `https://`, anything from the first `/`, and the
/// port. Bracketed IPv6 literals keep their brackets.
///
/// # Examples
///
/// ```
/// use ollafind_core::types::host_of;
///
/// assert_eq!(host_of("http://1.2.3.4:11434"), "1.2.3.4");
/// assert_eq!(host_of("https://ollama.example.com/"), "ollama.example.com");
/// assert_eq!(host_of("http://[2001:db8::1]:11434"), "[2001:db8::1]");
/// ```
pub fn host_of(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    let authority = without_scheme.split('/').next().unwrap_or_default();

    if authority.starts_with('[') {
        if let Some(end) = authority.find(']') {
            return authority[..=end].to_string();
        }
    }

    authority.split(':').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_of_variants() {
        assert_eq!(host_of("http://1.2.3.4:11434"), "1.2.3.4");
        assert_eq!(host_of("https://1.2.3.4:443/path/x"), "1.2.3.4");
        assert_eq!(host_of("http://example.com"), "example.com");
        assert_eq!(host_of("5.6.7.8:11434"), "5.6.7.8");
        assert_eq!(host_of("http://[::1]:11434/"), "[::1]");
    }

    #[test]
    fn test_tags_response_deserialization() {
        let json = r#"{
            "models": [
                {"name": "llama3:latest", "size": 4661224676, "details": {"family": "llama"}},
                {"name": "qwen2:7b"}
            ]
        }"#;

        let response: TagsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.models.len(), 2);
        assert_eq!(response.models[0].name, "llama3:latest");
        assert_eq!(response.models[0].details["size"], 4661224676u64);
        assert!(response.models[1].details.is_empty());
    }

    #[test]
    fn test_tags_response_requires_models() {
        assert!(serde_json::from_str::<TagsResponse>(r#"{"status": "ok"}"#).is_err());
    }

    #[test]
    fn test_model_entry_requires_name() {
        let json = r#"{"models": [{"model": "llama3"}]}"#;
        assert!(serde_json::from_str::<TagsResponse>(json).is_err());
    }

    #[test]
    fn test_log_line_keeps_details() {
        let entry: ModelEntry =
            serde_json::from_str(r#"{"name": "phi3", "size": 12}"#).unwrap();
        let line = entry.to_log_line();
        assert!(line.contains(r#""name":"phi3""#));
        assert!(line.contains(r#""size":12"#));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_records_share_host_and_url() {
        let models = vec![ModelEntry::new("a"), ModelEntry::new("b")];
        let records = ProbeRecord::from_models("http://9.9.9.9:11434", &models);

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.host == "9.9.9.9"));
        assert!(records.iter().all(|r| r.url == "http://9.9.9.9:11434"));
        assert_eq!(records[0].model_name, "a");
        assert_eq!(records[1].model_name, "b");
    }

    #[test]
    fn test_records_from_empty_models() {
        assert!(ProbeRecord::from_models("http://9.9.9.9:11434", &[]).is_empty());
    }
}
