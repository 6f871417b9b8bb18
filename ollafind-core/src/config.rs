//! Runtime configuration for the FOFA client and the prober
//!
//! Both values are built once by the caller and handed to the component
//! that needs them; nothing here is process-global.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default FOFA API endpoint
pub const FOFA_API_BASE: &str = "https://fofa.info";

/// Timeout applied to FOFA API requests
pub const DEFAULT_FOFA_TIMEOUT_SECS: u64 = 30;

/// Timeout applied to each `/api/tags` probe
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

/// Credentials and endpoint for the FOFA search API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FofaConfig {
    /// FOFA API key
    pub key: String,
    /// Base URL of the API, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl FofaConfig {
    /// Creates a configuration for the public FOFA API
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_url: FOFA_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_FOFA_TIMEOUT_SECS),
        }
    }

    /// Points the client at another API root (mirrors, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that a key is present
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] when the key is empty or whitespace.
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::MissingKey);
        }
        Ok(())
    }
}

/// Settings for probing candidate endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub timeout: Duration,
    /// Ollama is usually deployed without TLS or with a self-signed certificate
    pub accept_invalid_certs: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            accept_invalid_certs: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fofa_config_defaults() {
        let config = FofaConfig::new("abc123");
        assert_eq!(config.key, "abc123");
        assert_eq!(config.base_url, "https://fofa.info");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = FofaConfig::new("k").with_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_validate_rejects_blank_key() {
        assert!(matches!(FofaConfig::new("").validate(), Err(Error::MissingKey)));
        assert!(matches!(FofaConfig::new("   ").validate(), Err(Error::MissingKey)));
        assert!(FofaConfig::new("k").validate().is_ok());
    }

    #[test]
    fn test_probe_config_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.accept_invalid_certs);
    }
}
