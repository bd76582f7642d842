use anyhow::{Context, Result};

use crate::client::ScoringClient;
use crate::config::ScoringConfig;

/// CLI entry point for the `check` subcommand: probe the health endpoint
/// and report availability.
pub fn run(api_url: Option<&str>) -> Result<()> {
    let mut config = ScoringConfig::from_env();
    if let Some(url) = api_url {
        config.api_base_url = url.trim_end_matches('/').to_string();
    }

    let rt = tokio::runtime::Runtime::new().context("creating async runtime")?;
    let client = ScoringClient::new(
        &config.api_base_url,
        config.health_timeout,
        config.health_timeout,
    )?;

    match rt.block_on(client.health()) {
        Ok(()) => {
            println!("API at {} is available", config.api_base_url);
            Ok(())
        }
        Err(e) => {
            eprintln!("API at {} is unavailable: {e}", config.api_base_url);
            std::process::exit(1);
        }
    }
}
