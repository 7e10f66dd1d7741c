//! One-time extraction of the survey workbook into the CSV the loader reads.

use std::path::Path;

use calamine::{DataType, Reader, Xlsx, XlsxError, open_workbook};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use crate::error::{AnalyticsError, Result};

/// Copies the first worksheet of `workbook` to `output` as CSV.
///
/// Header text and column order are kept verbatim. Returns the number of data
/// rows written.
#[tracing::instrument(skip_all, fields(workbook = %workbook.display(), output = %output.display()))]
pub fn extract_workbook(workbook: &Path, output: &Path) -> Result<usize> {
    let mut book: Xlsx<_> = open_workbook(workbook)
        .map_err(|e: XlsxError| AnalyticsError::Workbook(e.to_string()))?;
    let range = book
        .worksheet_range_at(0)
        .ok_or_else(|| AnalyticsError::Workbook("workbook has no sheets".to_string()))?
        .map_err(|e| AnalyticsError::Workbook(e.to_string()))?;

    let mut writer = csv::Writer::from_path(output)?;
    let mut rows = range.rows();

    let header = rows
        .next()
        .ok_or_else(|| AnalyticsError::Workbook("first sheet is empty".to_string()))?;
    debug!(?header, "Workbook header");
    writer.write_record(header.iter().map(cell_text))?;

    let mut written = 0;
    for row in rows {
        writer.write_record(row.iter().map(cell_text))?;
        written += 1;
    }
    writer.flush()?;

    info!(rows = written, "Workbook extracted");
    Ok(written)
}

/// Text form of one cell. Date cells become `YYYY-MM-DD HH:MM:SS`.
fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(serial) => excel_datetime(*serial)
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| serial.to_string()),
        DataType::Error(e) => format!("{e:?}"),
    }
}

/// Converts an Excel serial date (days since 1899-12-30) to a timestamp,
/// rounded to the second.
pub fn excel_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}
