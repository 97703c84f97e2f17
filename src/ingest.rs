//! Ingestion of GitHub Archive event dumps
//!
//! Event dumps are JSON Lines files, one event per line, usually
//! gzip-compressed. Inputs may live on the local filesystem or behind an
//! http(s) URL (GH Archive serves hourly files like
//! `https://data.gharchive.org/2015-01-01-15.json.gz`), and all inputs are
//! fetched and decoded concurrently.

use crate::{
    config::Config,
    events::{self, CommitRecord, Event},
    progress::{ProgressReport, ProgressTracker, Work},
    Result,
};
use anyhow::Context;
use async_compression::tokio::bufread::GzipDecoder;
use futures::{StreamExt, TryStreamExt};
use reqwest::Response;
use std::{
    io::{self, ErrorKind},
    pin::Pin,
    sync::Arc,
};
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::JoinSet,
};
use tokio_util::io::{ReaderStream, StreamReader};

/// Fetch all configured inputs, extract their commits, collect in one place
pub async fn fetch_and_collect(
    config: Arc<Config>,
    client: reqwest::Client,
    report: &ProgressReport,
) -> Result<Vec<CommitRecord>> {
    // Track input opening and byte-level decoding progress
    let num_inputs = config.inputs.len();
    let opened = report.add("Opening event dumps", Work::Steps(num_inputs));
    let bytes = report.add("Reading and decoding events", Work::GrowingBytes);

    // Start processing every input
    let mut tasks = JoinSet::new();
    for input in config.inputs.iter().cloned() {
        tasks.spawn(fetch_and_extract(
            client.clone(),
            input,
            opened.clone(),
            bytes.clone(),
        ));
    }

    // Collect commit records as inputs finish
    let mut commits = Vec::new();
    while let Some(input_commits) = tasks.join_next().await {
        commits.append(&mut input_commits.context("collecting commits from one input")??);
    }
    Ok(commits)
}

/// Fetch one input and extract the commits of its eligible push events
async fn fetch_and_extract(
    client: reqwest::Client,
    input: Box<str>,
    opened: ProgressTracker,
    bytes: ProgressTracker,
) -> Result<Vec<CommitRecord>> {
    // Open the input as a stream of raw bytes, tracking download/read volume
    let context = || format!("opening {input}");
    let raw: Pin<Box<dyn AsyncBufRead + Send>> = if is_url(&input) {
        let response = client
            .get(&*input)
            .send()
            .await
            .and_then(Response::error_for_status)
            .with_context(context)?;
        bytes.add_work(response.content_length().with_context(context)?);
        let byte_counter = bytes.clone();
        let blocks = response.bytes_stream().map(move |res| {
            res
                // Track how many input bytes have been downloaded so far
                .inspect(|block| {
                    byte_counter.make_progress(block.len() as u64);
                })
                // Translate reqwest errors into I/O errors
                .map_err(|e| io::Error::new(ErrorKind::Other, Box::new(e)))
        });
        Box::pin(StreamReader::new(blocks))
    } else {
        let file = File::open(&*input).await.with_context(context)?;
        bytes.add_work(file.metadata().await.with_context(context)?.len());
        let byte_counter = bytes.clone();
        let blocks = ReaderStream::new(file).map_ok(move |block| {
            byte_counter.make_progress(block.len() as u64);
            block
        });
        Box::pin(StreamReader::new(blocks))
    };
    if opened.make_progress(1) {
        bytes.done_adding_work();
    }

    // Apply a gzip decoder when the input is compressed
    let reader: Pin<Box<dyn AsyncBufRead + Send>> = if input.ends_with(".gz") {
        Box::pin(BufReader::new(GzipDecoder::new(raw)))
    } else {
        raw
    };

    collect_commits(reader, &input).await
}

/// Truth that an input designates a remote file rather than a local one
fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Decode JSON Lines events from a reader, flatten eligible commits
///
/// Ineligible events are silently skipped. A line that does not decode as an
/// event, or an eligible commit with missing fields, aborts processing of
/// the whole input.
async fn collect_commits(
    reader: impl AsyncBufRead + Unpin,
    input: &str,
) -> Result<Vec<CommitRecord>> {
    let mut early_filter = events::make_early_filter();
    let mut commits = Vec::new();
    let mut lines = reader.lines();
    let mut line_number = 0usize;
    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("reading {input}"))?
    {
        line_number += 1;
        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("decoding the event at {input}:{line_number}"))?;
        if !early_filter(&event) {
            continue;
        }
        events::flatten_commits(&event, &mut commits)
            .with_context(|| format!("extracting commits at {input}:{line_number}"))?;
    }
    log::debug!("Collected {} commits from {input}", commits.len());
    Ok(commits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_eligible_push_events_contribute() {
        let lines = concat!(
            r#"{"type":"PushEvent","payload":{"commits":[{"author":{"name":"Alice"},"message":"Fix the bug in the parser"}]}}"#,
            "\n",
            r#"{"type":"WatchEvent","payload":{}}"#,
            "\n",
            r#"{"type":"PushEvent","payload":{"commits":[]}}"#,
            "\n",
            r#"{"type":"PushEvent","payload":{"commits":[{"author":{"name":"Bob"},"message":"Quick fix"}]}}"#,
            "\n",
        );
        let commits = collect_commits(lines.as_bytes(), "events.json")
            .await
            .unwrap();
        // The short message is kept here: the token threshold belongs to the
        // n-gram pass, not to ingestion
        assert_eq!(
            commits,
            vec![
                CommitRecord {
                    author: "Alice".into(),
                    message: "Fix the bug in the parser".into(),
                },
                CommitRecord {
                    author: "Bob".into(),
                    message: "Quick fix".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn multiple_commits_per_event_are_flattened() {
        let lines = concat!(
            r#"{"type":"PushEvent","payload":{"commits":[{"author":{"name":"Alice"},"message":"one"},{"author":{"name":"Bob"},"message":"two"}]}}"#,
            "\n",
        );
        let commits = collect_commits(lines.as_bytes(), "events.json")
            .await
            .unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(&*commits[0].author, "Alice");
        assert_eq!(&*commits[1].author, "Bob");
    }

    #[tokio::test]
    async fn malformed_lines_are_fatal() {
        let lines = "{\"type\":\"PushEvent\"\n";
        let result = collect_commits(lines.as_bytes(), "events.json").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_commit_fields_are_fatal() {
        let lines = concat!(
            r#"{"type":"PushEvent","payload":{"commits":[{"message":"no author on this one"}]}}"#,
            "\n",
        );
        let result = collect_commits(lines.as_bytes(), "events.json").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_input_yields_no_commits() {
        let commits = collect_commits(&b""[..], "events.json").await.unwrap();
        assert!(commits.is_empty());
    }
}
