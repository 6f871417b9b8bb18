//! Error types for ollafind-core
//!
//! Provides a unified error type for all operations in the library.

/// Result type alias for ollafind operations
pub type Result<T> = std::result::Result<T, Error>;

/// FOFA's message for a key that does not belong to any account
pub const INVALID_ACCOUNT_MESSAGE: &str = "[-700] 账号无效";

/// Error types for ollafind operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No FOFA key was configured
    #[error("FOFA key is not configured (use --key or FOFA_KEY)")]
    MissingKey,

    /// FOFA rejected the key as belonging to no account
    #[error("FOFA account is invalid: {0}")]
    InvalidAccount(String),

    /// FOFA API reported an error
    #[error("FOFA API error: {0}")]
    FofaApi(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// Classifies an error message returned by the FOFA account endpoint
    pub fn from_account_message(errmsg: impl Into<String>) -> Self {
        let errmsg = errmsg.into();
        if errmsg.trim() == INVALID_ACCOUNT_MESSAGE {
            Error::InvalidAccount(errmsg)
        } else {
            Error::FofaApi(errmsg)
        }
    }

    /// Returns true if the operator should (re)configure the FOFA key
    pub fn needs_key_setup(&self) -> bool {
        matches!(self, Error::MissingKey | Error::InvalidAccount(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("number must be greater than 0".to_string());
        assert_eq!(err.to_string(), "Invalid input: number must be greater than 0");
    }

    #[test]
    fn test_csv_in_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("run.csv");

        let err = crate::output::CsvTable::create(&path).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_html_tags_body_is_json_error() {
        let parse = || -> Result<crate::types::TagsResponse> {
            Ok(serde_json::from_str("<html>nginx</html>")?)
        };

        let err = parse().unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("JSON parsing failed"));
    }

    #[test]
    fn test_fofa_api_error() {
        let err = Error::FofaApi("[820000] 查询语法错误".to_string());
        assert_eq!(err.to_string(), "FOFA API error: [820000] 查询语法错误");
    }

    #[test]
    fn test_invalid_account_classification() {
        let err = Error::from_account_message("[-700] 账号无效");
        assert!(matches!(err, Error::InvalidAccount(_)));
        assert!(err.needs_key_setup());
    }

    #[test]
    fn test_other_account_message_is_api_error() {
        let err = Error::from_account_message("[-702] 请求超时");
        assert!(matches!(err, Error::FofaApi(_)));
        assert!(!err.needs_key_setup());
    }

    #[test]
    fn test_missing_key_needs_setup() {
        assert!(Error::MissingKey.needs_key_setup());
        assert!(Error::MissingKey.to_string().contains("FOFA_KEY"));
    }

    #[test]
    fn test_generic_error() {
        let err = Error::Generic("something went wrong".to_string());
        assert_eq!(err.to_string(), "something went wrong");
    }
}
