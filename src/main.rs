use clap::Parser;

use tx_risk::cli::{Cli, Command};
use tx_risk::score::ScoreOptions;
use tx_risk::{check, features, inspect, score};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Score {
            file,
            output,
            api_url,
            max_rows,
            timeout,
        } => score::run(&file, &ScoreOptions {
            output,
            api_url,
            max_rows,
            timeout_secs: timeout,
        }),
        Command::Features {
            file,
            output,
            max_rows,
        } => features::run(&file, &output, max_rows),
        Command::Inspect { file, limit } => inspect::run(&file, limit),
        Command::Check { api_url } => check::run(api_url.as_deref()),
    }
}
