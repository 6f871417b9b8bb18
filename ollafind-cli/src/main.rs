//! Ollafind - exposed Ollama finder
//!
//! Exports links for a FOFA query, probes each one on `/api/tags` and
//! saves the instances that list models to `<stamp>.txt` and `<stamp>.csv`.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ollafind_core::{
    args::OllafindArgs,
    fofa::{FetchOutcome, FofaClient, StopReason},
    output::RunOutputs,
    probe::{ProbeOutcome, ProbeRecorder, ProbeSummary, Prober},
};
use std::env;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[tokio::main]
async fn main() {
    // Second Ctrl+C exits immediately; the first lets the current request finish
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    if let Err(e) = ctrlc::set_handler(move || {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            eprintln!("\nForce exiting...");
            process::exit(1);
        }
        flag.store(true, Ordering::SeqCst);
        eprintln!("\nCaught interrupt signal, finishing current request...");
    }) {
        eprintln!("Failed to install Ctrl-C handler: {}", e);
    }

    if let Err(e) = run(cancel).await {
        eprintln!("{}", fail(&format!("Error: {}", e)));
        if let Some(core) = e.downcast_ref::<ollafind_core::Error>() {
            if core.needs_key_setup() {
                eprintln!("{}", fail("Configure a FOFA key with --key or FOFA_KEY"));
            }
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    let started = chrono::Local::now();

    let args = match OllafindArgs::from_iter_safe(env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    init_tracing(args.verbose);
    args.validate()?;

    println!("{}", ok(&format!("Query: {}", args.query)));
    println!("{}", ok(&format!("Number: {}", args.number)));

    // Stage 1: FOFA
    let client = FofaClient::new(args.fofa_config())?.with_cancel_flag(Arc::clone(&cancel));
    let fetched = client
        .fetch_candidates(&args.query, args.number, |progress| {
            println!("{}", ok(&format!("FOFA links exported: {}", progress.total)));
        })
        .await?;
    report_fetch(&fetched);

    // A run cancelled while paging leaves no output files
    if cancel.load(Ordering::SeqCst) {
        if fetched.stop != StopReason::Interrupted {
            println!("{}", fail("Interrupted, nothing probed"));
        }
        return Ok(());
    }

    // Stage 2: probe and record
    let mut outputs = RunOutputs::create(&args.output_dir, started)?;
    debug!(csv = %outputs.csv_path().display(), "outputs created");

    let recorder = ProbeRecorder::new(Prober::with_config(&args.probe_config())?)
        .with_cancel_flag(Arc::clone(&cancel));

    let progress_bar = if args.bar {
        let pb = ProgressBar::new(fetched.candidates.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("#>-"),
        );
        pb.set_draw_target(ProgressDrawTarget::stdout());
        Some(pb)
    } else {
        None
    };

    let summary = recorder
        .probe_and_record(&fetched.candidates, &mut outputs, |outcome| {
            let line = outcome_line(outcome);
            match progress_bar {
                Some(ref pb) => {
                    if let Some(line) = line {
                        pb.println(line);
                    }
                    pb.inc(1);
                }
                None => {
                    if let Some(line) = line {
                        println!("{}", line);
                    }
                }
            }
        })
        .await;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    report_summary(&summary, &outputs);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "ollafind_core=debug,ollafind=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn report_fetch(fetched: &FetchOutcome) {
    match fetched.stop {
        StopReason::TargetReached => {}
        StopReason::EmptyPage => {
            println!(
                "{}",
                fail(&format!("FOFA returned no more results after {} page(s)", fetched.pages))
            );
        }
        StopReason::ApiError(ref msg) => {
            println!("{}", fail(&format!("FOFA error: {}", msg)));
        }
        StopReason::Interrupted => {
            println!(
                "{}",
                fail(&format!("Interrupted after {} FOFA page(s), nothing probed", fetched.pages))
            );
        }
    }
}

/// Operator line for one probe; empty model lists stay quiet
fn outcome_line(outcome: &ProbeOutcome) -> Option<String> {
    match outcome {
        ProbeOutcome::Exposed { url, models, .. } => Some(ok(&format!(
            "Ollama: {} models: {}",
            url,
            models.len()
        ))),
        ProbeOutcome::Failed { url, error } => {
            Some(fail(&format!("Not Ollama: {} ({})", url, error)))
        }
        ProbeOutcome::Empty { .. } => None,
    }
}

fn report_summary(summary: &ProbeSummary, outputs: &RunOutputs) {
    if summary.interrupted {
        println!("{}", fail("Interrupted, remaining candidates were skipped"));
    }

    for path in outputs.saved_paths() {
        let label = match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => "CSV",
            _ => "TXT",
        };
        println!("{}", ok(&format!("{} saved to {}", label, path.display())));
    }

    debug!(
        probed = summary.probed,
        exposed = summary.exposed,
        empty = summary.empty,
        failed = summary.failed,
        rows = summary.rows_written,
        "probe summary"
    );
}

/// `[+] msg` with a red marker
fn ok(msg: &str) -> String {
    format!("[{}] {}", "+".red().bold(), msg)
}

/// `[-] msg` with a blue marker
fn fail(msg: &str) -> String {
    format!("[{}] {}", "-".blue(), msg)
}
