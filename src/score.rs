use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::client::ScoringClient;
use crate::config::ScoringConfig;
use crate::{features, ingest, merge};

/// Per-run knobs for the `score` subcommand.
pub struct ScoreOptions {
    pub output: PathBuf,
    pub api_url: Option<String>,
    pub max_rows: usize,
    pub timeout_secs: u64,
}

/// Run the full pipeline: health gate, ingest, validate, truncate, derive
/// features, score, merge, export. A batch either fully succeeds or the run
/// halts with nothing written.
pub fn run(input: &Path, opts: &ScoreOptions) -> Result<()> {
    let mut config = ScoringConfig::from_env();
    if let Some(url) = &opts.api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }

    let rt = tokio::runtime::Runtime::new().context("creating async runtime")?;
    let client = ScoringClient::new(
        &config.api_base_url,
        Duration::from_secs(opts.timeout_secs),
        config.health_timeout,
    )?;

    // 1. Gate on the health endpoint before touching the upload.
    println!("Checking scoring API at {} ...", config.api_base_url);
    rt.block_on(client.health())?;
    println!("  OK  API is available");

    // 2. Read and normalize the upload.
    let raw = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let mut table =
        ingest::normalize(&raw).with_context(|| format!("parsing {}", input.display()))?;
    println!(
        "Parsed {} rows, {} columns from {}",
        table.rows.len(),
        table.columns.len(),
        input.display()
    );

    // 3. Reject the batch wholesale if required columns are absent.
    ingest::require_columns(&table, &config.required_columns)?;

    // 4. Optional row limit, applied before feature derivation so the
    //    export covers exactly the scored subset.
    if opts.max_rows > 0 && table.rows.len() > opts.max_rows {
        println!(
            "Limiting to the first {} of {} rows",
            opts.max_rows,
            table.rows.len()
        );
        table.truncate(opts.max_rows);
    }

    // 5. Derive the feature rows.
    let rows = features::build_features(&table, &config);

    // 6. Score the batch — one round trip, no retries.
    println!("Scoring {} rows ...", rows.len());
    let predictions = rt.block_on(client.predict_batch(&rows))?;

    // 7. Merge predictions back onto the original rows.
    let scored = match merge::merge(&table, &predictions) {
        Ok(scored) => scored,
        Err(e @ merge::MergeError::ShapeMismatch { .. }) => {
            eprintln!("Response dump for diagnosis:");
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&predictions).unwrap_or_default()
            );
            return Err(e.into());
        }
    };

    // 8. Export.
    let bytes = scored.to_csv_bytes().context("encoding scored CSV")?;
    std::fs::write(&opts.output, bytes)
        .with_context(|| format!("writing {}", opts.output.display()))?;

    println!(
        "Done: wrote {} scored rows to {}",
        scored.rows.len(),
        opts.output.display()
    );
    Ok(())
}
