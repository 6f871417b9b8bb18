//! CLI argument parsing and validation
//!
//! # Examples
//!
//! ```
//! use ollafind_core::args::OllafindArgs;
//!
//! let args = OllafindArgs::from_iter_safe(["ollafind", "-n", "100", "-k", "secret"]).unwrap();
//! assert_eq!(args.number, 100);
//! assert_eq!(args.query, r#"app="Ollama""#);
//! ```

use crate::config::{FofaConfig, ProbeConfig, DEFAULT_PROBE_TIMEOUT_SECS};
use crate::error::{Error, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Default FOFA query
pub const DEFAULT_QUERY: &str = r#"app="Ollama""#;

/// Default number of links to export
pub const DEFAULT_NUMBER: usize = 500;

/// Find exposed Ollama instances through FOFA
#[derive(Debug, Clone, Parser)]
#[command(name = "ollafind", version, about)]
pub struct OllafindArgs {
    /// FOFA query expression
    #[arg(short = 'q', long = "query", default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Number of links to export (also used as the page size)
    #[arg(short = 'n', long = "number", default_value_t = DEFAULT_NUMBER)]
    pub number: usize,

    /// FOFA API key
    #[arg(short = 'k', long = "key", env = "FOFA_KEY", hide_env_values = true, default_value = "")]
    pub key: String,

    /// Directory for the .txt and .csv results
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Probe timeout in seconds
    #[arg(long = "timeout", default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Show a progress bar while probing
    #[arg(long = "bar")]
    pub bar: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl OllafindArgs {
    /// Parses arguments without exiting the process on error
    pub fn from_iter_safe<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Checks values clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.number == 0 {
            return Err(Error::InvalidInput(
                "number must be greater than 0".into(),
            ));
        }
        if self.query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".into()));
        }
        if self.timeout == 0 {
            return Err(Error::InvalidInput(
                "timeout must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// FOFA settings from the parsed key
    pub fn fofa_config(&self) -> FofaConfig {
        FofaConfig::new(self.key.trim())
    }

    /// Probe settings from the parsed timeout
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            timeout: Duration::from_secs(self.timeout),
            ..ProbeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> OllafindArgs {
        let mut full = vec!["ollafind"];
        full.extend_from_slice(args);
        OllafindArgs::from_iter_safe(full).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["-k", "x"]);
        assert_eq!(args.query, DEFAULT_QUERY);
        assert_eq!(args.number, 500);
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert_eq!(args.timeout, 30);
        assert!(!args.bar);
        assert!(!args.verbose);
    }

    #[test]
    fn test_short_and_long_flags() {
        let args = parse(&["-q", "app=\"Ollama\" && country=\"CN\"", "-n", "20"]);
        assert_eq!(args.query, "app=\"Ollama\" && country=\"CN\"");
        assert_eq!(args.number, 20);

        let args = parse(&["--query", "port=\"11434\"", "--number", "7", "--bar", "-v"]);
        assert_eq!(args.query, "port=\"11434\"");
        assert_eq!(args.number, 7);
        assert!(args.bar);
        assert!(args.verbose);
    }

    #[test]
    fn test_non_numeric_number_rejected() {
        assert!(OllafindArgs::from_iter_safe(["ollafind", "-n", "lots"]).is_err());
    }

    #[test]
    fn test_validate_zero_number() {
        let args = parse(&["-n", "0", "-k", "x"]);
        assert!(matches!(args.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_validate_blank_query() {
        let args = parse(&["-q", "  ", "-k", "x"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_configs_from_args() {
        let args = parse(&["-k", " secret ", "--timeout", "5"]);
        assert_eq!(args.fofa_config().key, "secret");
        assert_eq!(args.probe_config().timeout, Duration::from_secs(5));
        assert!(args.probe_config().accept_invalid_certs);
    }
}
