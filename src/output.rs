//! Output formatting and persistence for dashboards and rejected rows.
//!
//! Supports pretty-printing, JSON serialization, and CSV export of the
//! rejected-rows report.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::parser::RejectedRow;
use crate::report::Dashboard;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Logs the dashboard using Rust's debug pretty-print format.
pub fn print_pretty(dashboard: &Dashboard) {
    debug!("{:#?}", dashboard);
}

/// Serializes the dashboard as pretty-printed JSON.
pub fn to_json(dashboard: &Dashboard) -> Result<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

/// Writes `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)?;
            info!(path = %path.display(), bytes = content.len(), "Report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RejectedRecord<'a> {
    line: usize,
    store: Option<&'a str>,
    reason: String,
}

/// Writes the rejected-rows report as CSV, replacing any existing file.
///
/// The header is written even when nothing was rejected.
pub fn write_rejected_rows(path: &Path, rejected: &[RejectedRow]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(["line", "store", "reason"])?;
    for row in rejected {
        writer.serialize(RejectedRecord {
            line: row.line,
            store: row.store.as_deref(),
            reason: row.error.to_string(),
        })?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rejected.len(), "Rejected rows written");
    Ok(())
}
