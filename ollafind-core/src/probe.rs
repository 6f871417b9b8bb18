//! Ollama detection and recording
//!
//! Every candidate is probed on `/api/tags`, one at a time and in input
//! order. A candidate that fails to answer, or answers with something
//! other than a model list, is reported and skipped; it never stops the
//! run. Endpoints with at least one model are written to the run's
//! [`RunOutputs`].

use crate::config::ProbeConfig;
use crate::error::{Error, Result};
use crate::output::RunOutputs;
use crate::types::{host_of, CandidateEndpoint, ModelEntry, TagsResponse};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Path of the Ollama model listing
pub const TAGS_PATH: &str = "/api/tags";

/// HTTP prober for the Ollama model listing
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    /// Creates a prober with the default 30 second timeout
    pub fn new() -> Result<Self> {
        Self::with_config(&ProbeConfig::default())
    }

    pub fn with_config(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self { client })
    }

    /// Requests `<url>/api/tags` and parses the model list
    ///
    /// The status code is not checked: any body that parses as a model
    /// list counts, anything else is an error.
    pub async fn probe(&self, url: &str) -> Result<Vec<ModelEntry>> {
        let tags_url = format!("{}{}", url.trim_end_matches('/'), TAGS_PATH);
        debug!(url = %tags_url, "probing");

        let body = self.client.get(&tags_url).send().await?.text().await?;
        let tags: TagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models)
    }
}

/// Result of probing one candidate
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Ollama answered with at least one model, and the finding was saved
    Exposed {
        url: CandidateEndpoint,
        host: String,
        models: Vec<ModelEntry>,
    },
    /// Ollama answered with an empty model list
    Empty { url: CandidateEndpoint },
    /// The probe or the write failed
    Failed { url: CandidateEndpoint, error: Error },
}

impl ProbeOutcome {
    pub fn url(&self) -> &str {
        match self {
            ProbeOutcome::Exposed { url, .. }
            | ProbeOutcome::Empty { url }
            | ProbeOutcome::Failed { url, .. } => url,
        }
    }

    pub fn is_exposed(&self) -> bool {
        matches!(self, ProbeOutcome::Exposed { .. })
    }
}

/// Counters for a completed (or interrupted) recording pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    pub probed: usize,
    pub exposed: usize,
    pub empty: usize,
    pub failed: usize,
    /// CSV rows written during the pass
    pub rows_written: usize,
    pub interrupted: bool,
}

/// Probes candidates sequentially and records findings
#[derive(Debug, Clone)]
pub struct ProbeRecorder {
    prober: Prober,
    cancel: Option<Arc<AtomicBool>>,
}

impl ProbeRecorder {
    pub fn new(prober: Prober) -> Self {
        Self {
            prober,
            cancel: None,
        }
    }

    /// Stops the pass before the next candidate once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Probes one candidate and writes its finding, if any
    pub async fn probe_one(&self, url: &str, outputs: &mut RunOutputs) -> ProbeOutcome {
        let models = match self.prober.probe(url).await {
            Ok(models) => models,
            Err(error) => {
                debug!(%url, %error, "probe failed");
                return ProbeOutcome::Failed {
                    url: url.to_string(),
                    error,
                };
            }
        };

        if models.is_empty() {
            debug!(%url, "no models");
            return ProbeOutcome::Empty {
                url: url.to_string(),
            };
        }

        if let Err(error) = outputs.write_finding(url, &models) {
            debug!(%url, %error, "failed to save finding");
            return ProbeOutcome::Failed {
                url: url.to_string(),
                error,
            };
        }

        info!(%url, models = models.len(), "exposed Ollama");
        ProbeOutcome::Exposed {
            url: url.to_string(),
            host: host_of(url),
            models,
        }
    }

    /// Probes every candidate in order, calling `on_outcome` after each
    pub async fn probe_and_record<F>(
        &self,
        candidates: &[CandidateEndpoint],
        outputs: &mut RunOutputs,
        mut on_outcome: F,
    ) -> ProbeSummary
    where
        F: FnMut(&ProbeOutcome),
    {
        let mut summary = ProbeSummary::default();
        let rows_before = outputs.rows_written();

        for url in candidates {
            if self.is_cancelled() {
                summary.interrupted = true;
                break;
            }

            let outcome = self.probe_one(url, outputs).await;
            summary.probed += 1;
            match outcome {
                ProbeOutcome::Exposed { .. } => summary.exposed += 1,
                ProbeOutcome::Empty { .. } => summary.empty += 1,
                ProbeOutcome::Failed { .. } => summary.failed += 1,
            }
            on_outcome(&outcome);
        }

        summary.rows_written = outputs.rows_written() - rows_before;
        summary
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}
