//! Report writers for the command-line driver.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::verdict::ValidationReport;

/// Output format of a written report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One `Status,Message,Errors` row per record.
    #[default]
    Csv,
    /// The `{filename, row_count, results}` envelope.
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("cannot write report to {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("cannot encode report as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot encode report as CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the envelope as pretty-printed JSON.
pub fn write_json<W: Write>(report: &ValidationReport, writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Writes one row per verdict. The `Errors` cell holds the JSON array text
/// of the error lines.
pub fn write_csv<W: Write>(report: &ValidationReport, writer: W) -> Result<(), ReportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["Status", "Message", "Errors"])?;
    for verdict in &report.results {
        let errors = serde_json::to_string(&verdict.errors())?;
        out.write_record([verdict.status.as_str(), verdict.message.as_str(), errors.as_str()])?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the report to `path` in the requested format.
pub fn write_to_path(
    report: &ValidationReport,
    path: &Path,
    format: ReportFormat,
) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|e| ReportError::Io(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);
    match format {
        ReportFormat::Csv => write_csv(report, &mut writer)?,
        ReportFormat::Json => write_json(report, &mut writer)?,
    }
    writer
        .flush()
        .map_err(|e| ReportError::Io(path.to_path_buf(), e))
}
