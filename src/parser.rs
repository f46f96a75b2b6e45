//! Normalization of the raw CSV and JSON sources into typed rows.
//!
//! Header and field whitespace is stripped, state names are mapped to
//! two-letter codes and value columns are coerced to numbers. Unknown names
//! and non-numeric values become `None` instead of failing the parse.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::states::state_code;

/// Source column holding the full state name.
pub const STATE_COLUMN: &str = "State";
/// Source column holding the obesity prevalence percentage.
pub const PREVALENCE_COLUMN: &str = "Prevalence";

/// One row of the CDC obesity table after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObesityRow {
    pub state_name: String,
    pub state_code: Option<&'static str>,
    pub obesity_rate: Option<f64>,
}

/// One state from the integrity overview after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityRow {
    pub state_code: &'static str,
    pub integrity_score: Option<f64>,
}

/// Parses a trimmed string as a finite float; anything else is missing.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric coercion for JSON values: numbers pass through, numeric strings
/// are parsed, everything else is missing.
pub fn coerce_json_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => coerce_numeric(s),
        _ => None,
    }
}

/// Reads the obesity CSV from any reader.
///
/// # Errors
///
/// Fails on malformed CSV or when the `State` / `Prevalence` columns are absent.
pub fn parse_obesity_csv<R: Read>(reader: R) -> Result<Vec<ObesityRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    };
    let state_idx = column(STATE_COLUMN)?;
    let rate_idx = column(PREVALENCE_COLUMN)?;

    let mut rows = Vec::new();
    let mut unmapped = 0usize;
    let mut non_numeric = 0usize;

    for record in rdr.records() {
        let record = record?;
        let state_name = record.get(state_idx).unwrap_or_default().to_string();
        let code = state_code(&state_name);
        let rate = record.get(rate_idx).and_then(coerce_numeric);

        if code.is_none() {
            unmapped += 1;
            debug!(state = %state_name, "No state code for name");
        }
        if rate.is_none() {
            non_numeric += 1;
        }

        rows.push(ObesityRow {
            state_name,
            state_code: code,
            obesity_rate: rate,
        });
    }

    debug!(rows = rows.len(), unmapped, non_numeric, "Obesity CSV parsed");
    Ok(rows)
}

/// Reads the obesity CSV previously saved at `path`.
pub fn load_obesity_csv(path: &Path) -> Result<Vec<ObesityRow>> {
    let file = File::open(path)?;
    parse_obesity_csv(file)
}

/// Extracts per-state integrity scores from the overview document.
///
/// Expects `{"states": [{"name": ..., "score": ...}, ...]}`. Entries whose
/// name is not one of the 50 states are skipped.
pub fn parse_integrity_json(doc: &Value) -> Result<Vec<IntegrityRow>> {
    let states = doc
        .get("states")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::JsonShape("missing 'states' array".to_string()))?;

    let mut rows = Vec::with_capacity(states.len());
    let mut skipped = 0usize;

    for entry in states {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| PipelineError::JsonShape("state entry without a 'name'".to_string()))?;

        let Some(code) = state_code(name) else {
            skipped += 1;
            debug!(state = %name, "Skipping integrity entry with no state code");
            continue;
        };

        let score = entry.get("score").and_then(coerce_json_numeric);
        rows.push(IntegrityRow {
            state_code: code,
            integrity_score: score,
        });
    }

    debug!(rows = rows.len(), skipped, "Integrity JSON parsed");
    Ok(rows)
}
