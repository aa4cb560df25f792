//! End-to-end scoring pipeline: clean, match, aggregate per trader in
//! parallel, then score the population in one pass.

pub mod cleaner;
pub mod matcher;

use std::collections::HashMap;

use futures::future::join_all;
use tracing::warn;

use crate::errors::PipelineError;
use crate::metrics::aggregator;
use crate::models::{
    ClosedPosition, MatchedTrade, PopulationStats, RawClosedPosition, RawTrade, ScoredTrader,
    TraderAggregate,
};
use crate::scoring::{score_population, ScoringConfig};

/// Raw records for one scoring pass, as fetched by a collaborator.
#[derive(Debug, Default)]
pub struct PipelineInput {
    pub trades: Vec<RawTrade>,
    pub closed_positions: Vec<RawClosedPosition>,
}

/// Everything a scoring pass produces: the ranked traders, the per-trade
/// attribution, and the population statistics behind the scores.
#[derive(Debug)]
pub struct ScoringOutcome {
    pub traders: Vec<ScoredTrader>,
    pub matched_trades: Vec<MatchedTrade>,
    pub population: PopulationStats,
}

/// Per-wallet work unit handed to a blocking worker.
struct WalletRecords {
    wallet: String,
    trades: Vec<crate::models::CleanedTrade>,
    positions: Vec<ClosedPosition>,
}

/// Run a full scoring pass over raw records.
///
/// Cleaning and deduplication are global (duplicates can span wallets in
/// a merged fetch); matching and aggregation run per wallet on the
/// blocking pool; scoring runs once over the whole population. A failure
/// inside one wallet's computation drops that trader with a warning and
/// never aborts the batch.
pub async fn run_scoring_pass(
    input: PipelineInput,
    config: &ScoringConfig,
) -> Result<ScoringOutcome, PipelineError> {
    config.validate()?;

    let trades = cleaner::clean_trades(input.trades);
    let positions = cleaner::clean_closed_positions(input.closed_positions);

    let mut by_wallet: HashMap<String, WalletRecords> = HashMap::new();
    for trade in trades {
        let key = trade.wallet.to_lowercase();
        by_wallet
            .entry(key)
            .or_insert_with(|| WalletRecords {
                wallet: trade.wallet.clone(),
                trades: Vec::new(),
                positions: Vec::new(),
            })
            .trades
            .push(trade);
    }
    for position in positions {
        let key = position.wallet.to_lowercase();
        by_wallet
            .entry(key)
            .or_insert_with(|| WalletRecords {
                wallet: position.wallet.clone(),
                trades: Vec::new(),
                positions: Vec::new(),
            })
            .positions
            .push(position);
    }

    // Deterministic trader order: ties in the final ranking resolve by
    // this order, so it cannot depend on hash iteration.
    let mut records: Vec<WalletRecords> = by_wallet.into_values().collect();
    records.sort_by(|a, b| a.wallet.to_lowercase().cmp(&b.wallet.to_lowercase()));

    let workers = records.into_iter().map(|rec| {
        let wallet = rec.wallet.clone();
        let handle = tokio::task::spawn_blocking(move || aggregate_wallet(rec));
        async move {
            match handle.await {
                Ok(result) => result,
                Err(source) => Err(PipelineError::WorkerFailed { wallet, source }),
            }
        }
    });

    let mut aggregates: Vec<TraderAggregate> = Vec::new();
    let mut matched_trades: Vec<MatchedTrade> = Vec::new();
    for result in join_all(workers).await {
        match result {
            Ok((aggregate, matched)) => {
                aggregates.push(aggregate);
                matched_trades.extend(matched);
            }
            Err(err) => {
                warn!(error = %err, "skipping trader after failed computation");
            }
        }
    }

    let (traders, population) = score_population(aggregates, config);

    Ok(ScoringOutcome {
        traders,
        matched_trades,
        population,
    })
}

/// Match and aggregate one wallet's records. Closed positions are the
/// preferred realized-outcome source; wallets with only trade records
/// fall back to FIFO-matched PnL.
fn aggregate_wallet(
    rec: WalletRecords,
) -> Result<(TraderAggregate, Vec<MatchedTrade>), PipelineError> {
    let matched = matcher::match_trades(rec.trades);
    let aggregate = if rec.positions.is_empty() {
        aggregator::aggregate_matched_trades(&rec.wallet, &matched)?
    } else {
        aggregator::aggregate_closed_positions(&rec.wallet, &rec.positions)?
    };
    Ok((aggregate, matched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const WALLET_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const WALLET_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn raw_trade(wallet: &str, tx: &str, side: &str, size: &str, price: &str, ts: i64) -> RawTrade {
        RawTrade {
            wallet: Some(wallet.to_string()),
            transaction_hash: Some(tx.to_string()),
            asset: Some("asset-1".to_string()),
            condition_id: Some("0xc1".to_string()),
            side: Some(side.to_string()),
            size: size.parse().unwrap(),
            price: price.parse().unwrap(),
            timestamp: ts,
            ..Default::default()
        }
    }

    fn raw_position(wallet: &str, bought: &str, avg: &str, pnl: &str, ts: i64) -> RawClosedPosition {
        RawClosedPosition {
            wallet: Some(wallet.to_string()),
            total_bought: bought.parse().unwrap(),
            avg_price: avg.parse().unwrap(),
            realized_pnl: pnl.parse().unwrap(),
            timestamp: ts,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_pass_ranks_all_traders() {
        let input = PipelineInput {
            trades: vec![
                raw_trade(WALLET_A, "0xt1", "BUY", "10", "0.4", 1),
                raw_trade(WALLET_A, "0xt2", "SELL", "10", "0.9", 2),
                raw_trade(WALLET_B, "0xt3", "BUY", "10", "0.6", 1),
                raw_trade(WALLET_B, "0xt4", "SELL", "10", "0.2", 2),
            ],
            closed_positions: Vec::new(),
        };
        let outcome = run_scoring_pass(input, &ScoringConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.traders.len(), 2);
        assert_eq!(outcome.matched_trades.len(), 4);
        assert_eq!(outcome.population.total_traders, 2);
        // The profitable wallet outranks the losing one.
        assert_eq!(outcome.traders[0].aggregate.wallet, WALLET_A);
        assert_eq!(outcome.traders[0].rank, 1);
        assert_eq!(outcome.traders[1].rank, 2);
    }

    #[tokio::test]
    async fn test_closed_positions_preferred_over_trades() {
        let input = PipelineInput {
            trades: vec![
                raw_trade(WALLET_A, "0xt1", "BUY", "10", "0.4", 1),
                raw_trade(WALLET_A, "0xt2", "SELL", "10", "0.9", 2),
            ],
            closed_positions: vec![
                raw_position(WALLET_A, "100", "0.5", "25", 1),
                raw_position(WALLET_A, "100", "0.5", "-10", 2),
            ],
        };
        let outcome = run_scoring_pass(input, &ScoringConfig::default())
            .await
            .unwrap();

        let trader = &outcome.traders[0];
        assert_eq!(trader.aggregate.total_trades, 2);
        assert_eq!(trader.aggregate.total_pnl, dec!(15));
        // Trades are still matched and returned even when positions win
        // the aggregation.
        assert_eq!(outcome.matched_trades.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_records_never_reach_scoring() {
        let mut orphan = raw_trade(WALLET_A, "0xt1", "BUY", "10", "0.4", 1);
        orphan.wallet = Some("garbage".to_string());
        let input = PipelineInput {
            trades: vec![orphan],
            closed_positions: Vec::new(),
        };
        let outcome = run_scoring_pass(input, &ScoringConfig::default())
            .await
            .unwrap();
        assert!(outcome.traders.is_empty());
        assert!(outcome.matched_trades.is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_trader_is_isolated() {
        let input = PipelineInput {
            trades: vec![
                raw_trade(WALLET_A, "0xt1", "BUY", "10", "0.4", 1),
                raw_trade(WALLET_A, "0xt2", "SELL", "10", "0.9", 2),
            ],
            closed_positions: vec![raw_position(
                WALLET_B,
                "79228162514264337593543950335",
                "79228162514264337593543950335",
                "0",
                1,
            )],
        };
        let outcome = run_scoring_pass(input, &ScoringConfig::default())
            .await
            .unwrap();

        // Wallet B overflows during aggregation and is skipped; wallet A
        // still gets scored.
        assert_eq!(outcome.traders.len(), 1);
        assert_eq!(outcome.traders[0].aggregate.wallet, WALLET_A);
    }

    #[tokio::test]
    async fn test_empty_input_is_a_valid_pass() {
        let outcome = run_scoring_pass(PipelineInput::default(), &ScoringConfig::default())
            .await
            .unwrap();
        assert!(outcome.traders.is_empty());
        assert_eq!(outcome.population.population_size, 0);
    }
}
