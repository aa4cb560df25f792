//! Metric aggregator: rolls per-position / per-trade realized outcomes
//! into one `TraderAggregate` per wallet.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::PipelineError;
use crate::models::{ClosedPosition, MatchedTrade, TraderAggregate};

/// Number of top stakes averaged into `max_stake`. Averaging instead of
/// taking the single largest stake keeps one outlier bet from defining a
/// trader's whale profile.
const TOP_STAKES: usize = 5;

/// One realized outcome, normalized from either source record type.
struct Outcome {
    stake: Decimal,
    pnl: Option<Decimal>,
    timestamp: i64,
}

/// Aggregate closed positions for one wallet. Closed positions are the
/// settled ground truth; every record carries a realized PnL.
pub fn aggregate_closed_positions(
    wallet: &str,
    positions: &[ClosedPosition],
) -> Result<TraderAggregate, PipelineError> {
    let outcomes = positions
        .iter()
        .map(|p| {
            Ok(Outcome {
                stake: checked_mul(p.total_bought, p.avg_price, wallet)?,
                pnl: Some(p.realized_pnl),
                timestamp: p.timestamp,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;
    aggregate(wallet, outcomes)
}

/// Aggregate FIFO-matched trades for one wallet. Trades without an
/// attributed PnL (BUYs, unattributable SELLs) still contribute stake and
/// trade count but are excluded from the win-rate denominator.
pub fn aggregate_matched_trades(
    wallet: &str,
    trades: &[MatchedTrade],
) -> Result<TraderAggregate, PipelineError> {
    let outcomes = trades
        .iter()
        .map(|m| {
            Ok(Outcome {
                stake: checked_mul(m.trade.size, m.trade.price, wallet)?,
                pnl: m.pnl,
                timestamp: m.trade.timestamp,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;
    aggregate(wallet, outcomes)
}

fn aggregate(wallet: &str, mut outcomes: Vec<Outcome>) -> Result<TraderAggregate, PipelineError> {
    outcomes.sort_by_key(|o| o.timestamp);

    let mut agg = TraderAggregate::new(wallet.to_string());
    let mut stakes: Vec<Decimal> = Vec::with_capacity(outcomes.len());

    for outcome in &outcomes {
        agg.total_trades += 1;
        agg.total_stakes = checked_add(agg.total_stakes, outcome.stake, wallet)?;
        let sq = checked_mul(outcome.stake, outcome.stake, wallet)?;
        agg.sum_sq_stakes = checked_add(agg.sum_sq_stakes, sq, wallet)?;
        stakes.push(outcome.stake);

        let Some(pnl) = outcome.pnl else {
            continue;
        };
        agg.total_trades_with_pnl += 1;
        agg.total_pnl = checked_add(agg.total_pnl, pnl, wallet)?;
        agg.pnl_history.push(pnl);

        if pnl > Decimal::ZERO {
            agg.winning_trades += 1;
            agg.winning_stakes = checked_add(agg.winning_stakes, outcome.stake, wallet)?;
        } else if pnl < Decimal::ZERO {
            agg.all_losses.push(pnl);
            if pnl < agg.worst_loss {
                agg.worst_loss = pnl;
            }
        }
    }

    agg.max_stake = top_stakes_mean(&mut stakes);
    agg.win_streak = trailing_win_streak(&agg.pnl_history);

    if !agg.total_stakes.is_zero() {
        agg.roi = (agg.total_pnl / agg.total_stakes).to_f64().unwrap_or(0.0) * 100.0;
        agg.stake_win_rate =
            (agg.winning_stakes / agg.total_stakes).to_f64().unwrap_or(0.0) * 100.0;
    }
    if agg.total_trades_with_pnl > 0 {
        agg.win_rate =
            f64::from(agg.winning_trades) / f64::from(agg.total_trades_with_pnl) * 100.0;
    }

    Ok(agg)
}

/// Mean of the largest `TOP_STAKES` stakes (all of them when fewer exist).
fn top_stakes_mean(stakes: &mut [Decimal]) -> Decimal {
    if stakes.is_empty() {
        return Decimal::ZERO;
    }
    stakes.sort_unstable_by(|a, b| b.cmp(a));
    let top = &stakes[..stakes.len().min(TOP_STAKES)];
    let sum: Decimal = top.iter().sum();
    sum / Decimal::from(top.len())
}

/// Consecutive wins at the tail of the chronological PnL sequence.
fn trailing_win_streak(pnl_history: &[Decimal]) -> u32 {
    pnl_history
        .iter()
        .rev()
        .take_while(|pnl| **pnl > Decimal::ZERO)
        .count() as u32
}

fn checked_add(a: Decimal, b: Decimal, wallet: &str) -> Result<Decimal, PipelineError> {
    a.checked_add(b).ok_or_else(|| PipelineError::NumericOverflow {
        wallet: wallet.to_string(),
    })
}

fn checked_mul(a: Decimal, b: Decimal, wallet: &str) -> Result<Decimal, PipelineError> {
    a.checked_mul(b).ok_or_else(|| PipelineError::NumericOverflow {
        wallet: wallet.to_string(),
    })
}
