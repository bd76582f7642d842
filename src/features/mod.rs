pub mod datetime;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::ingest;
use crate::table::Table;

/// Direction of a transaction: money in or money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Income,
    Spend,
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flow::Income => write!(f, "income"),
            Flow::Spend => write!(f, "spend"),
        }
    }
}

/// One row of the feature set the scoring API expects. Field order matches
/// the wire format: amount, mcc_code, tr_type, flow, hour.
///
/// The type itself carries the guarantees the API relies on — no field can
/// be null, non-finite, or outside its domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub amount: f64,
    pub mcc_code: i64,
    pub tr_type: i64,
    pub flow: Flow,
    pub hour: u8,
}

/// Parse a cell as a finite number. Whitespace is trimmed; anything that
/// fails to parse, or parses to NaN/Inf, is None rather than an error.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Derive the feature rows the scoring API expects from a normalized table.
///
/// Total over any input: missing or malformed cells fall back to defaults
/// (amount 0.0, codes 0, hour 0, flow spend) instead of failing, so every
/// input row yields a well-formed [`FeatureRow`].
pub fn build_features(table: &Table, config: &ScoringConfig) -> Vec<FeatureRow> {
    let amount_col = table.column_index("amount");
    let mcc_col = table.column_index("mcc_code");
    let tr_type_col = table.column_index("tr_type");
    let hour_col = table.column_index("hour");
    let datetime_col = table.column_index("tr_datetime");
    let flow_col = table.column_index("flow");

    table
        .rows
        .iter()
        .map(|row| {
            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(String::as_str);

            let amount = cell(amount_col).and_then(coerce_numeric);
            let mcc_code = cell(mcc_col).and_then(coerce_numeric);
            let tr_type = cell(tr_type_col).and_then(coerce_numeric);

            // An explicit hour column wins over tr_datetime; with neither,
            // the whole column defaults to 0.
            let hour = if hour_col.is_some() {
                cell(hour_col)
                    .and_then(coerce_numeric)
                    .map(|h| (h as i64).rem_euclid(24) as u8)
                    .unwrap_or(0)
            } else if datetime_col.is_some() {
                cell(datetime_col)
                    .and_then(|s| datetime::parse_relative_datetime(s, config.anchor_date))
                    .map(|ts| ts.hour() as u8)
                    .unwrap_or(0)
            } else {
                0
            };

            // An explicit flow column wins over the amount sign. A missing
            // amount counts as 0, which classifies as income.
            let flow = if let Some(idx) = flow_col {
                normalize_flow(row.get(idx).map(String::as_str).unwrap_or(""), config)
            } else if amount_col.is_some() {
                if amount.unwrap_or(0.0) >= 0.0 {
                    Flow::Income
                } else {
                    Flow::Spend
                }
            } else {
                Flow::Spend
            };

            FeatureRow {
                amount: amount.unwrap_or(0.0),
                mcc_code: mcc_code.map(|v| v as i64).unwrap_or(0),
                tr_type: tr_type.map(|v| v as i64).unwrap_or(0),
                flow,
                hour,
            }
        })
        .collect()
}

/// Lowercase a raw flow label, map configured synonyms, and force anything
/// still outside the two canonical values to spend.
fn normalize_flow(raw: &str, config: &ScoringConfig) -> Flow {
    let lower = raw.trim().to_lowercase();
    match lower.as_str() {
        "income" => Flow::Income,
        "spend" => Flow::Spend,
        other => config.flow_synonyms.get(other).copied().unwrap_or(Flow::Spend),
    }
}

/// CLI entry point for the `features` subcommand: derive the feature CSV
/// without touching the network.
pub fn run(input: &Path, output: &Path, max_rows: usize) -> Result<()> {
    let config = ScoringConfig::from_env();

    let raw = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let mut table =
        ingest::normalize(&raw).with_context(|| format!("parsing {}", input.display()))?;
    ingest::require_columns(&table, &config.required_columns)?;

    if max_rows > 0 && table.rows.len() > max_rows {
        println!("Limiting to the first {} of {} rows", max_rows, table.rows.len());
        table.truncate(max_rows);
    }

    let rows = build_features(&table, &config);

    let mut wtr = csv::Writer::from_path(output)
        .with_context(|| format!("creating {}", output.display()))?;
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    println!("Wrote {} feature rows to {}", rows.len(), output.display());
    Ok(())
}
