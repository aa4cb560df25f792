//! Polymarket Trader Ranking
//!
//! Scores and ranks prediction-market traders from their raw trade and
//! closed-position history: FIFO PnL attribution, drawdown risk, and
//! population-wide shrinkage scoring.

mod errors;
mod metrics;
mod models;
mod pipeline;
mod scoring;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::models::RawTrade;
use crate::pipeline::{run_scoring_pass, PipelineInput};
use crate::scoring::ScoringConfig;

/// Trader scoring and leaderboard CLI.
#[derive(Parser)]
#[command(name = "polyrank")]
#[command(about = "Score and rank prediction-market traders", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full scoring pass and print the leaderboard
    Score {
        /// JSON file with raw trade records
        #[arg(short, long)]
        trades: Option<PathBuf>,

        /// JSON file with raw closed-position records
        #[arg(short, long)]
        positions: Option<PathBuf>,

        /// Maximum number of traders to show
        #[arg(long, default_value = "50")]
        limit: usize,

        /// Write the full scored output as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run FIFO PnL attribution over raw trades
    MatchTrades {
        /// JSON file with raw trade records
        #[arg(short, long)]
        trades: PathBuf,

        /// Write matched trades as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective scoring configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ScoringConfig::from_env()?;

    match cli.command {
        Commands::Score {
            trades,
            positions,
            limit,
            output,
        } => {
            let input = PipelineInput {
                trades: match trades {
                    Some(path) => load_json(&path)?,
                    None => Vec::new(),
                },
                closed_positions: match positions {
                    Some(path) => load_json(&path)?,
                    None => Vec::new(),
                },
            };

            let outcome = run_scoring_pass(input, &config).await?;
            info!(
                traders = outcome.traders.len(),
                population = outcome.population.population_size,
                "scoring pass complete"
            );

            println!(
                "\n{:<6} {:<44} {:>8} {:>8} {:>10} {:>8} {:<14}",
                "RANK", "ADDRESS", "WIN%", "ROI%", "PNL", "SCORE", "TIER"
            );
            println!("{}", "-".repeat(104));
            for trader in outcome.traders.iter().take(limit) {
                println!(
                    "{:<6} {:<44} {:>7.1}% {:>7.1}% {:>10.2} {:>8.2} {:<14}",
                    trader.rank,
                    trader.aggregate.wallet,
                    trader.aggregate.win_rate,
                    trader.aggregate.roi,
                    trader.aggregate.total_pnl,
                    trader.final_score,
                    trader.volume_tier
                );
            }

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&outcome.traders)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("\nWrote {} scored traders to {}", outcome.traders.len(), path.display());
            }
        }

        Commands::MatchTrades { trades, output } => {
            let raw: Vec<RawTrade> = load_json(&trades)?;
            let cleaned = pipeline::cleaner::clean_trades(raw);
            let matched = pipeline::matcher::match_trades(cleaned);

            let with_pnl = matched.iter().filter(|m| m.pnl.is_some()).count();
            println!("Matched {} trades ({} with realized PnL)", matched.len(), with_pnl);

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&matched)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote matched trades to {}", path.display());
            }
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
