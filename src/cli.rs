use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Transaction risk front-end — normalize a CSV of raw transactions, derive
/// the minimal feature set, and score it through the remote API.
#[derive(Parser)]
#[command(name = "tx-risk", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score a transactions CSV through the API and write the merged result
    Score {
        /// Path to the transactions CSV
        file: PathBuf,

        /// Output path for the scored CSV
        #[arg(long, short = 'o', default_value = "transactions_scored.csv")]
        output: PathBuf,

        /// Scoring API base URL (overrides TX_RISK_API_URL)
        #[arg(long)]
        api_url: Option<String>,

        /// Maximum rows to process (0 = unlimited)
        #[arg(long, default_value = "0")]
        max_rows: usize,

        /// Predict request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Derive the feature CSV without calling the API
    Features {
        /// Path to the transactions CSV
        file: PathBuf,

        /// Output path for the feature CSV
        #[arg(long, short = 'o', default_value = "transactions_features.csv")]
        output: PathBuf,

        /// Maximum rows to process (0 = unlimited)
        #[arg(long, default_value = "0")]
        max_rows: usize,
    },

    /// Parse a CSV and report its shape, columns, and a bounded preview
    Inspect {
        /// Path to the transactions CSV
        file: PathBuf,

        /// Number of data rows to preview
        #[arg(long, default_value = "30")]
        limit: usize,
    },

    /// Probe the scoring API health endpoint
    Check {
        /// Scoring API base URL (overrides TX_RISK_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
}
