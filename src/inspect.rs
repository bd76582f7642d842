use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ScoringConfig;
use crate::ingest;

/// CLI entry point for the `inspect` subcommand: parse an upload and report
/// what the scorer would see, without calling the API.
pub fn run(input: &Path, limit: usize) -> Result<()> {
    let config = ScoringConfig::from_env();

    let raw = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let table =
        ingest::normalize(&raw).with_context(|| format!("parsing {}", input.display()))?;

    println!(
        "{}: {} rows, {} columns",
        input.display(),
        table.rows.len(),
        table.columns.len()
    );
    println!("Columns: {}", table.columns.join(", "));

    let missing = table.missing_columns(&config.required_columns);
    if missing.is_empty() {
        println!("All required columns present.");
    } else {
        println!("Missing required columns: {}", missing.join(", "));
        println!("Semicolon-delimited exports are the usual cause — check the file's delimiter.");
    }

    if !table.rows.is_empty() {
        let shown = table.rows.len().min(limit);
        println!("\nFirst {shown} row(s):");
        println!("  {}", table.columns.join(" | "));
        for row in table.rows.iter().take(limit) {
            println!("  {}", row.join(" | "));
        }
    }

    Ok(())
}
