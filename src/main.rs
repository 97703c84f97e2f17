//! This program processes event dumps from the GitHub Archive, whose general
//! documentation you can find at <https://www.gharchive.org/>.
//!
//! It keeps the push events, and for every pushed commit whose message is
//! long enough, writes one CSV row with the author's name and the three
//! leading word 3-grams of the normalized commit message.

mod config;
mod events;
mod ingest;
mod ngrams;
mod output;
mod progress;
mod rows;

use crate::{config::Config, progress::ProgressReport};
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use std::num::NonZeroUsize;

/// Extract per-author commit message 3-grams from GitHub push events
///
/// Inputs are event dumps in the GitHub Archive format: one JSON event per
/// line, optionally gzip-compressed. Events that are not push events, push
/// events without commits, and commits whose normalized message is shorter
/// than five words contribute no output.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Input event dumps, as local paths or http(s) URLs
    ///
    /// GH Archive distributes the public event timeline as hourly files like
    /// "https://data.gharchive.org/2015-01-01-15.json.gz". Inputs whose name
    /// ends in ".gz" are transparently decompressed.
    #[arg(required = true)]
    inputs: Vec<Box<str>>,

    /// Output CSV path
    ///
    /// The file is created (or truncated) and receives one header row
    /// followed by one row per qualifying commit.
    #[arg(short, long, default_value = "results.csv")]
    output: Box<str>,

    /// In-memory commit chunk size
    ///
    /// Collected commits are sliced into chunks of this many records, which
    /// are independent from each other. This enables easy parallelization of
    /// the n-gram pass.
    ///
    /// The associated chunk size is a tunable parameter. If it is set too
    /// low, constant overheads for spawning parallel tasks will not be
    /// properly amortized. But if it is set too high, parallel load
    /// balancing will be less effective.
    #[arg(long, default_value = "500")]
    memory_chunk: NonZeroUsize,
}
//
impl Args {
    /// Decode and validate CLI arguments
    pub fn parse_and_check() -> Result<Self> {
        // Decode CLI arguments
        let args = Args::parse();

        // Check CLI arguments for basic sanity
        anyhow::ensure!(
            !args.output.is_empty(),
            "output path should not be an empty string"
        );
        Ok(args)
    }
}
//
#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    setup_logging().map_err(|e| anyhow::format_err!("{e}"))?;

    // Decode CLI arguments
    let args = Args::parse_and_check()?;

    // Set up progress reporting
    let report = ProgressReport::new();

    // Collect eligible commits from all inputs
    let config = Config::new(args);
    let client = reqwest::Client::new();
    let commits = ingest::fetch_and_collect(config.clone(), client, &report).await?;
    log::info!("Collected {} commits from eligible push events", commits.len());

    // Turn commit messages into per-author 3-gram rows
    let rows = rows::extract_rows(&config, &commits, &report);
    log::info!(
        "{} of {} commits reached the token threshold",
        rows.len(),
        commits.len()
    );

    // Write the tabular summary
    output::write_rows(&config, rows, &report)
        .await
        .context("writing the output CSV")?;
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Commit author name, as recorded in the pushed commit
pub type AuthorName = Box<str>;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}
