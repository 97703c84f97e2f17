//! Parallel mapping of commit records to output rows
//!
//! The 3-gram extraction is a pure function over a single commit, so commits
//! are processed in independent chunks with no ordering dependency between
//! them and no shared mutable state.

use crate::{
    config::Config,
    events::CommitRecord,
    ngrams,
    progress::{ProgressReport, Work},
    AuthorName,
};
use rayon::prelude::*;
use serde::Serialize;

/// Output row: one qualifying commit's author and leading 3-grams
///
/// The serde field renames define the header of the output CSV.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct OutputRow {
    /// Name of the commit author
    pub author: AuthorName,

    /// Gram window at token offset 0
    #[serde(rename = "3-gram 1")]
    pub gram1: Box<str>,

    /// Gram window at token offset 1
    #[serde(rename = "3-gram 2")]
    pub gram2: Box<str>,

    /// Gram window at token offset 2
    #[serde(rename = "3-gram 3")]
    pub gram3: Box<str>,
}

/// Map commits to output rows in parallel
///
/// Commits whose normalized message does not reach the token threshold
/// contribute no row and are silently dropped.
pub fn extract_rows(
    config: &Config,
    commits: &[CommitRecord],
    report: &ProgressReport,
) -> Vec<OutputRow> {
    let chunk_size = config.memory_chunk.get();
    let grams = report.add(
        "Extracting 3-grams",
        Work::PercentSteps(commits.len().div_ceil(chunk_size)),
    );
    commits
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            let rows = chunk
                .iter()
                .filter_map(commit_filter_map)
                .collect::<Vec<_>>();
            grams.make_progress(1);
            rows
        })
        .collect()
}

/// Turn one commit into its output row, or discard it
fn commit_filter_map(commit: &CommitRecord) -> Option<OutputRow> {
    let Some([gram1, gram2, gram3]) = ngrams::three_grams(&commit.message) else {
        log::trace!(
            "Rejected commit {commit:?} from the output: message below the token threshold"
        );
        return None;
    };
    Some(OutputRow {
        author: commit.author.clone(),
        gram1,
        gram2,
        gram3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn test_config(memory_chunk: usize) -> Config {
        Config {
            inputs: Box::new([]),
            output: "results.csv".into(),
            memory_chunk: NonZeroUsize::new(memory_chunk).expect("test chunk should be nonzero"),
        }
    }

    fn commit(author: &str, message: &str) -> CommitRecord {
        CommitRecord {
            author: author.into(),
            message: message.into(),
        }
    }

    #[test]
    fn authors_are_never_cross_mixed() {
        let commits = [
            commit("Alice", "Fix the Bug in Parser, please!!"),
            commit("Bob", "rework the config loading code path"),
        ];
        let rows = extract_rows(&test_config(500), &commits, &ProgressReport::new());
        assert_eq!(
            rows,
            vec![
                OutputRow {
                    author: "Alice".into(),
                    gram1: "fix the bug".into(),
                    gram2: "the bug in".into(),
                    gram3: "bug in parser".into(),
                },
                OutputRow {
                    author: "Bob".into(),
                    gram1: "rework the config".into(),
                    gram2: "the config loading".into(),
                    gram3: "config loading code".into(),
                },
            ]
        );
    }

    #[test]
    fn short_messages_contribute_no_row() {
        let commits = [
            commit("Alice", "Quick fix"),
            commit("Bob", "a commit message with enough words"),
            commit("Carol", "wip"),
        ];
        let rows = extract_rows(&test_config(500), &commits, &ProgressReport::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(&*rows[0].author, "Bob");
    }

    #[test]
    fn chunk_size_does_not_affect_results() {
        let commits = (0..23)
            .map(|i| commit(&format!("author{i}"), "five words are just enough"))
            .collect::<Vec<_>>();
        let one_by_one = extract_rows(&test_config(1), &commits, &ProgressReport::new());
        let in_bulk = extract_rows(&test_config(500), &commits, &ProgressReport::new());
        assert_eq!(one_by_one, in_bulk);
        assert_eq!(in_bulk.len(), 23);
    }
}
