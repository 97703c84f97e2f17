//! CSV output stage
//!
//! The tabular summary is written with a header row whose column names are
//! derived from [`OutputRow`]'s serde renames:
//! `author,3-gram 1,3-gram 2,3-gram 3`.

use crate::{
    config::Config,
    progress::{ProgressReport, Work},
    rows::OutputRow,
    Result,
};
use anyhow::Context;
use csv_async::AsyncSerializer;
use tokio::fs::File;

/// Write output rows to the configured CSV file
pub async fn write_rows(
    config: &Config,
    rows: Vec<OutputRow>,
    report: &ProgressReport,
) -> Result<()> {
    let written = report.add("Writing output rows", Work::Steps(rows.len()));
    let file = File::create(&*config.output)
        .await
        .with_context(|| format!("creating {}", config.output))?;
    let mut writer = AsyncSerializer::from_writer(file);
    for row in rows {
        writer
            .serialize(&row)
            .await
            .with_context(|| format!("writing a row to {}", config.output))?;
        written.make_progress(1);
    }
    writer
        .flush()
        .await
        .with_context(|| format!("flushing {}", config.output))?;
    Ok(())
}
