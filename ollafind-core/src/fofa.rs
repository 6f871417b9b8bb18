//! FOFA search API client
//!
//! This module verifies the configured account and accumulates candidate
//! links page by page for a search expression.
//!
//! Pagination stops when the running total reaches the requested count,
//! when the API reports an error, or when a page comes back empty. An
//! error on the account check is fatal; errors while paging only end the
//! loop and the pages already fetched are kept.
//!
//! # Example
//!
//! ```no_run
//! use ollafind_core::config::FofaConfig;
//! use ollafind_core::fofa::FofaClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FofaClient::new(FofaConfig::new("your-key"))?;
//! let outcome = client
//!     .fetch_candidates(r#"app="Ollama""#, 100, |progress| {
//!         println!("page {}: {} links", progress.page, progress.total);
//!     })
//!     .await?;
//! println!("{} candidates", outcome.candidates.len());
//! # Ok(())
//! # }
//! ```

use crate::config::FofaConfig;
use crate::error::{Error, Result};
use crate::types::CandidateEndpoint;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

const ACCOUNT_PATH: &str = "/api/v1/info/my";
const SEARCH_PATH: &str = "/api/v1/search/all";
const SEARCH_FIELDS: &str = "link";

/// Client for the FOFA search API
#[derive(Debug, Clone)]
pub struct FofaClient {
    client: Client,
    config: FofaConfig,
    cancel: Option<Arc<AtomicBool>>,
}

/// Envelope shared by FOFA responses
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FofaResponse {
    #[serde(default)]
    pub error: bool,

    #[serde(default)]
    pub errmsg: Option<String>,

    /// Present on search responses; one link per entry with `fields=link`
    #[serde(default)]
    pub results: Vec<String>,
}

impl FofaResponse {
    fn error_message(&self) -> String {
        self.errmsg
            .clone()
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Progress notification emitted after each successful page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub page: u32,
    /// Links on this page
    pub fetched: usize,
    /// Links accumulated so far
    pub total: usize,
}

/// Why the pagination loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Running total reached the requested count
    TargetReached,
    /// A page returned no results
    EmptyPage,
    /// The API or the transport failed on a page
    ApiError(String),
    /// The cancellation flag was set between pages
    Interrupted,
}

/// Candidates gathered by [`FofaClient::fetch_candidates`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Links in page order; may exceed the requested count
    pub candidates: Vec<CandidateEndpoint>,
    /// Pages that contributed results
    pub pages: u32,
    pub stop: StopReason,
}

/// Encodes a search expression for the `qbase64` parameter
///
/// # Examples
///
/// ```
/// use ollafind_core::fofa::encode_query;
///
/// assert_eq!(encode_query(r#"app="Ollama""#), "YXBwPSJPbGxhbWEi");
/// ```
pub fn encode_query(expression: &str) -> String {
    STANDARD.encode(expression.as_bytes())
}

impl FofaClient {
    /// Creates a client for the given configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKey`] if no key is configured, or an HTTP
    /// error if the client cannot be built.
    pub fn new(config: FofaConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            cancel: None,
        })
    }

    /// Stops paging before the next page once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Returns the configuration this client was built with
    pub fn config(&self) -> &FofaConfig {
        &self.config
    }

    /// Checks that the key belongs to a valid account
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAccount`] when FOFA answers `[-700] 账号无效`
    /// - [`Error::FofaApi`] for any other API-reported error
    /// - HTTP/JSON errors if the request itself fails
    pub async fn verify_account(&self) -> Result<()> {
        let url = format!("{}{}", self.config.base_url, ACCOUNT_PATH);
        debug!(%url, "verifying FOFA account");

        let response: FofaResponse = self
            .client
            .get(&url)
            .query(&[("key", self.config.key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        if response.error {
            return Err(Error::from_account_message(response.error_message()));
        }
        Ok(())
    }

    /// Fetches a single page of links
    ///
    /// An API-level error (`"error": true`) is returned as [`Error::FofaApi`].
    pub async fn search_page(&self, qbase64: &str, page: u32, size: usize) -> Result<Vec<String>> {
        let url = format!("{}{}", self.config.base_url, SEARCH_PATH);
        debug!(page, size, "requesting FOFA page");

        let page = page.to_string();
        let size = size.to_string();
        let response: FofaResponse = self
            .client
            .get(&url)
            .query(&[
                ("key", self.config.key.as_str()),
                ("qbase64", qbase64),
                ("fields", SEARCH_FIELDS),
                ("page", page.as_str()),
                ("size", size.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.error {
            return Err(Error::FofaApi(response.error_message()));
        }
        Ok(response.results)
    }

    /// Verifies the account, then pages through results for `expression`
    ///
    /// `target_count` is sent as the page size and is the threshold at
    /// which paging stops. `on_page` is called after every page that
    /// contributed links.
    ///
    /// # Errors
    ///
    /// Fails only if `target_count` is zero or the account check fails.
    /// Errors on later pages end the loop and are reported through
    /// [`FetchOutcome::stop`].
    pub async fn fetch_candidates<F>(
        &self,
        expression: &str,
        target_count: usize,
        mut on_page: F,
    ) -> Result<FetchOutcome>
    where
        F: FnMut(&PageProgress),
    {
        if target_count == 0 {
            return Err(Error::InvalidInput(
                "target count must be greater than 0".into(),
            ));
        }

        self.verify_account().await?;

        let qbase64 = encode_query(expression);
        let mut candidates = Vec::new();
        let mut page: u32 = 1;

        let stop = loop {
            if self.is_cancelled() {
                info!(page, "FOFA paging interrupted");
                break StopReason::Interrupted;
            }

            let results = match self.search_page(&qbase64, page, target_count).await {
                Ok(results) => results,
                Err(e) => {
                    debug!(page, error = %e, "FOFA paging stopped");
                    break StopReason::ApiError(api_message(e));
                }
            };

            if results.is_empty() {
                info!(page, "FOFA returned an empty page");
                break StopReason::EmptyPage;
            }

            let progress = PageProgress {
                page,
                fetched: results.len(),
                total: candidates.len() + results.len(),
            };
            candidates.extend(results);
            page += 1;

            info!(page = progress.page, total = progress.total, "fetched FOFA page");
            on_page(&progress);

            if candidates.len() >= target_count {
                break StopReason::TargetReached;
            }
        };

        Ok(FetchOutcome {
            candidates,
            pages: page - 1,
            stop,
        })
    }
}

fn api_message(error: Error) -> String {
    match error {
        Error::FofaApi(msg) => msg,
        other => other.to_string(),
    }
}
