//! Data model of the GitHub Archive event stream
//!
//! An archived event is a JSON object with a `type` tag and a type-specific
//! `payload`. Only the fields that commit extraction needs are decoded here,
//! everything else in the object is ignored.

use crate::{AuthorName, Result};
use anyhow::Context;
use serde::Deserialize;

/// Event type tag of a push to a repository
pub const PUSH_EVENT: &str = "PushEvent";

/// Event record from the GitHub Archive timeline
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
pub struct Event {
    /// Event type tag, e.g. "PushEvent" or "WatchEvent"
    #[serde(rename = "type", default)]
    pub event_type: Option<Box<str>>,

    /// Event payload, whose layout depends on the event type
    #[serde(default)]
    pub payload: Option<Payload>,
}
//
impl Event {
    /// Commits carried by this event, if any
    pub fn commits(&self) -> &[Commit] {
        self.payload
            .as_ref()
            .and_then(|payload| payload.commits.as_deref())
            .unwrap_or(&[])
    }
}

/// Payload of an event, as far as commit extraction is concerned
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
pub struct Payload {
    /// Commits carried by a push event
    ///
    /// Absent or null on other event types, and empty on pushes that only
    /// moved refs over pre-existing commits.
    #[serde(default)]
    pub commits: Option<Vec<Commit>>,
}

/// Commit from a push event payload
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
pub struct Commit {
    /// Author of the commit
    #[serde(default)]
    pub author: Option<CommitAuthor>,

    /// Free-text commit message
    #[serde(default)]
    pub message: Option<Box<str>>,
}

/// Author sub-record of a commit
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
pub struct CommitAuthor {
    /// Author name, which is the only author identity we use
    #[serde(default)]
    pub name: Option<AuthorName>,
}

/// Commit record after filtering and flattening
///
/// This is the unit of work of the n-gram pass: one author name and one raw
/// commit message, with no remaining link to the source event.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CommitRecord {
    /// Name of the commit author
    pub author: AuthorName,

    /// Raw commit message
    pub message: Box<str>,
}

/// Build the early filter that decides which events are worth processing
///
/// An event qualifies when it is a push event carrying at least one commit.
/// Field absence means "does not qualify" at this stage, never an error.
pub fn make_early_filter() -> impl FnMut(&Event) -> bool {
    |event| event.event_type.as_deref() == Some(PUSH_EVENT) && !event.commits().is_empty()
}

/// Flatten a filtered-in event into one [`CommitRecord`] per commit
///
/// Unlike eligibility, field absence is a hard error here: an event that
/// made it through the early filter is expected to carry well-formed
/// commits, and a missing author name or message is a data quality problem
/// that should surface to the caller rather than be papered over.
pub fn flatten_commits(event: &Event, records: &mut Vec<CommitRecord>) -> Result<()> {
    for commit in event.commits() {
        let author = commit
            .author
            .as_ref()
            .and_then(|author| author.name.clone())
            .context("pushed commit lacks an author name")?;
        let message = commit
            .message
            .clone()
            .context("pushed commit lacks a message")?;
        records.push(CommitRecord { author, message });
    }
    Ok(())
}
