//! Console report and persistence of the merged table.
//!
//! Supports the plain-text correlation report, a JSON log record, and CSV export.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::merge::MergedRow;
use crate::stats::{Correlation, Significance};

/// Machine-readable summary of a correlation run.
#[derive(Debug, Serialize)]
pub struct CorrelationReport {
    pub generated_at: DateTime<Utc>,
    pub coefficient: f64,
    pub p_value: f64,
    pub sample_size: usize,
    pub significance_level: f64,
    pub significance: Significance,
}

impl CorrelationReport {
    pub fn new(correlation: &Correlation, alpha: f64) -> Self {
        Self {
            generated_at: Utc::now(),
            coefficient: correlation.coefficient,
            p_value: correlation.p_value,
            sample_size: correlation.sample_size,
            significance_level: alpha,
            significance: correlation.significance(alpha),
        }
    }
}

/// Confidence level as a whole percentage, e.g. 95 for alpha = 0.05.
fn confidence_percent(alpha: f64) -> f64 {
    ((1.0 - alpha) * 100.0 * 1e6).round() / 1e6
}

/// Writes the three report lines: coefficient (2 dp), p-value (4 dp) and verdict.
pub fn write_report<W: Write>(out: &mut W, correlation: &Correlation, alpha: f64) -> Result<()> {
    writeln!(
        out,
        "Correlation between obesity rate and integrity score: {:.2}",
        correlation.coefficient
    )?;
    writeln!(out, "P-value of the correlation: {:.4}", correlation.p_value)?;

    let verdict = match correlation.significance(alpha) {
        Significance::Significant => "is statistically significant",
        Significance::NotSignificant => "is not statistically significant",
    };
    writeln!(
        out,
        "The correlation {verdict} at the {}% confidence level.",
        confidence_percent(alpha)
    )?;
    Ok(())
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &CorrelationReport) -> Result<()> {
    debug!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes the merged rows to `path` as CSV with a header, replacing any existing file.
pub fn write_merged_csv(path: &Path, rows: &[MergedRow]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Merged table written");
    Ok(())
}
