//! Ollafind Core Library
//!
//! This library finds publicly exposed Ollama instances. It pages through
//! FOFA search results for a query, then probes every returned link on
//! `/api/tags` and records the models each exposed instance serves.
//!
//! # Modules
//!
//! - [`args`] - CLI argument parsing and validation
//! - [`config`] - FOFA and probe configuration
//! - [`fofa`] - FOFA search API client and candidate accumulation
//! - [`probe`] - Ollama detection and recording
//! - [`types`] - Candidates, model entries and findings
//! - [`output`] - Text and CSV sinks
//!
//! # Example
//!
//! ```no_run
//! use ollafind_core::config::FofaConfig;
//! use ollafind_core::fofa::FofaClient;
//! use ollafind_core::output::RunOutputs;
//! use ollafind_core::probe::{ProbeRecorder, Prober};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FofaClient::new(FofaConfig::new("your-key"))?;
//! let fetched = client.fetch_candidates(r#"app="Ollama""#, 100, |_| {}).await?;
//!
//! let mut outputs = RunOutputs::create(".", chrono::Local::now())?;
//! let recorder = ProbeRecorder::new(Prober::new()?);
//! let summary = recorder
//!     .probe_and_record(&fetched.candidates, &mut outputs, |_| {})
//!     .await;
//! println!("{} exposed", summary.exposed);
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod fofa;
pub mod output;
pub mod probe;
pub mod types;

pub use error::{Error, Result};
