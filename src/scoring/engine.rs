//! Population-wide shrinkage and scoring engine.
//!
//! Operates over every trader's aggregate at once: the shrinkage prior,
//! the shrinkage targets (population medians), and the percentile anchors
//! are all cross-sectional, so scores are batch-recomputed rather than
//! updated per trader.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use statrs::statistics::{Data, Median, OrderStatistics};
use tracing::info;

use super::config::ScoringConfig;
use super::tags::{NewTraderTag, StreakTier, VolumeTier};
use crate::metrics::risk;
use crate::models::{PopulationStats, ScoredTrader, TraderAggregate};

/// Sub-score used when a metric cannot be normalized: degenerate
/// percentile anchors, or an undefined risk score. Neutral, not zero, so
/// a missing statistic neither punishes nor rewards.
const NEUTRAL_SCORE: f64 = 50.0;

/// Shrunk per-trader statistics computed before normalization.
struct ShrunkStats {
    n_eff: f64,
    w_shrunk: f64,
    roi_shrunk: f64,
    pnl_adj: f64,
    pnl_shrunk: f64,
}

/// Score and rank a full population of trader aggregates.
///
/// Returns the scored traders ordered by rank, plus the population
/// statistics (prior, medians, anchors) that produced the scores.
pub fn score_population(
    aggregates: Vec<TraderAggregate>,
    config: &ScoringConfig,
) -> (Vec<ScoredTrader>, PopulationStats) {
    let total_traders = aggregates.len();
    if aggregates.is_empty() {
        return (Vec::new(), PopulationStats::empty());
    }

    // Traders with enough PnL-carrying trades shape the prior, the
    // medians, and the anchors; everyone still gets scored.
    let eligible: Vec<&TraderAggregate> = {
        let qualified: Vec<&TraderAggregate> = aggregates
            .iter()
            .filter(|a| a.total_trades_with_pnl >= config.min_population_trades)
            .collect();
        if qualified.is_empty() {
            aggregates.iter().collect()
        } else {
            qualified
        }
    };

    let prior = stake_weighted_prior(&eligible);
    let roi_median = median(eligible.iter().map(|a| a.roi).collect());
    let pnl_median = median(
        eligible
            .iter()
            .map(|a| whale_adjusted_pnl(a, config))
            .collect(),
    );

    let shrunk: Vec<ShrunkStats> = aggregates
        .iter()
        .map(|a| shrink(a, prior, roi_median, pnl_median, config))
        .collect();

    // Percentile anchors come from the eligible subset of the shrunk
    // values, keeping thin traders from stretching the scale.
    let eligible_shrunk: Vec<&ShrunkStats> = if eligible.len() == aggregates.len() {
        shrunk.iter().collect()
    } else {
        aggregates
            .iter()
            .zip(shrunk.iter())
            .filter(|(a, _)| a.total_trades_with_pnl >= config.min_population_trades)
            .map(|(_, s)| s)
            .collect()
    };
    let w_anchors = anchors(eligible_shrunk.iter().map(|s| s.w_shrunk).collect(), config);
    let roi_anchors = anchors(
        eligible_shrunk.iter().map(|s| s.roi_shrunk).collect(),
        config,
    );
    let pnl_anchors = anchors(
        eligible_shrunk.iter().map(|s| s.pnl_shrunk).collect(),
        config,
    );

    let stats = PopulationStats {
        prior_win_rate: prior,
        roi_median,
        pnl_median,
        w_anchors,
        roi_anchors,
        pnl_anchors,
        population_size: eligible.len(),
        total_traders,
    };

    let calculated_at = Utc::now();
    let mut scored: Vec<ScoredTrader> = aggregates
        .into_iter()
        .zip(shrunk)
        .map(|(aggregate, s)| {
            let score_win_rate = normalize(s.w_shrunk, w_anchors);
            let score_roi = normalize(s.roi_shrunk, roi_anchors);
            let score_pnl = normalize(s.pnl_shrunk, pnl_anchors);
            let score_risk = risk::risk_score_from_pnl(
                &aggregate.pnl_history,
                config.initial_capital,
                config.risk_k,
            )
            .unwrap_or(NEUTRAL_SCORE);

            let final_score = (config.weight_win_rate * score_win_rate
                + config.weight_roi * score_roi
                + config.weight_pnl * score_pnl
                + config.weight_risk * score_risk)
                .clamp(0.0, 100.0);

            let volume_tier = VolumeTier::classify(aggregate.total_stakes);
            let streak_tier = StreakTier::classify(aggregate.win_streak);
            let new_trader_tag =
                NewTraderTag::classify(aggregate.total_pnl, aggregate.total_trades);

            ScoredTrader {
                aggregate,
                n_eff: s.n_eff,
                w_shrunk: s.w_shrunk,
                roi_shrunk: s.roi_shrunk,
                pnl_adj: s.pnl_adj,
                pnl_shrunk: s.pnl_shrunk,
                score_win_rate,
                score_roi,
                score_pnl,
                score_risk,
                final_score,
                rank: 0,
                volume_tier,
                streak_tier,
                new_trader_tag,
                calculated_at,
            }
        })
        .collect();

    // Stable sort: equal final scores keep their input order.
    scored.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, trader) in scored.iter_mut().enumerate() {
        trader.rank = (i + 1) as u32;
    }

    info!(
        traders = total_traders,
        population = stats.population_size,
        prior = stats.prior_win_rate,
        "scored trader population"
    );

    (scored, stats)
}

/// Stake-weighted mean win rate (as a fraction) over the population.
/// With no stakes to weight by, falls back to the uninformative 0.5.
fn stake_weighted_prior(eligible: &[&TraderAggregate]) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for agg in eligible {
        let stakes = agg.total_stakes.to_f64().unwrap_or(0.0);
        weighted += (agg.win_rate / 100.0) * stakes;
        total += stakes;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.5
    }
}

/// Concentration-damped PnL: a trader whose volume is dominated by a few
/// huge bets has their headline PnL pulled down before shrinkage.
fn whale_adjusted_pnl(agg: &TraderAggregate, config: &ScoringConfig) -> f64 {
    let total_pnl = agg.total_pnl.to_f64().unwrap_or(0.0);
    let total_stakes = agg.total_stakes.to_f64().unwrap_or(0.0);
    if total_stakes <= 0.0 {
        return total_pnl;
    }
    let max_stake = agg.max_stake.to_f64().unwrap_or(0.0);
    total_pnl / (1.0 + config.whale_alpha * max_stake / total_stakes)
}

fn shrink(
    agg: &TraderAggregate,
    prior: f64,
    roi_median: f64,
    pnl_median: f64,
    config: &ScoringConfig,
) -> ShrunkStats {
    let alpha = config.shrink_alpha;

    let total_stakes = agg.total_stakes.to_f64().unwrap_or(0.0);
    let sum_sq = agg.sum_sq_stakes.to_f64().unwrap_or(0.0);
    let n_eff = if sum_sq > 0.0 {
        total_stakes * total_stakes / sum_sq
    } else {
        0.0
    };

    // Trade-count variant: classic pseudo-count shrinkage.
    let w_trade = {
        let denom = f64::from(agg.total_trades_with_pnl) + alpha;
        if denom > 0.0 {
            (f64::from(agg.winning_trades) + alpha * prior) / denom
        } else {
            prior
        }
    };
    // Stake-weighted variant: shrunk by effective sample size instead of
    // nominal trade count.
    let w_stake = shrink_toward(agg.stake_win_rate / 100.0, n_eff, prior, alpha);
    let w_shrunk = config.win_trade_weight * w_trade + config.win_stake_weight * w_stake;

    let roi_shrunk = shrink_toward(agg.roi, n_eff, roi_median, alpha);
    let pnl_adj = whale_adjusted_pnl(agg, config);
    let pnl_shrunk = shrink_toward(pnl_adj, n_eff, pnl_median, alpha);

    ShrunkStats {
        n_eff,
        w_shrunk,
        roi_shrunk,
        pnl_adj,
        pnl_shrunk,
    }
}

/// Pull `value` toward `target` with weight `alpha` against the effective
/// sample size.
fn shrink_toward(value: f64, n_eff: f64, target: f64, alpha: f64) -> f64 {
    let denom = n_eff + alpha;
    if denom > 0.0 {
        (value * n_eff + target * alpha) / denom
    } else {
        target
    }
}

fn median(values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Data::new(values).median()
}

/// Low/high percentile anchors over the population's shrunk values.
fn anchors(values: Vec<f64>, config: &ScoringConfig) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mut data = Data::new(values);
    let low = data.percentile(config.percentile_low.round() as usize);
    let high = data.percentile(config.percentile_high.round() as usize);
    (low, high)
}

/// Rescale a shrunk value onto 0-100 between the population anchors,
/// saturating outside them. Degenerate anchors (all traders identical)
/// give the neutral score.
fn normalize(value: f64, (low, high): (f64, f64)) -> f64 {
    let span = high - low;
    if !span.is_finite() || span.abs() < 1e-12 {
        return NEUTRAL_SCORE;
    }
    ((value - low) / span * 100.0).clamp(0.0, 100.0)
}

impl PopulationStats {
    /// Stats for an empty scoring pass.
    pub fn empty() -> Self {
        Self {
            prior_win_rate: 0.5,
            roi_median: 0.0,
            pnl_median: 0.0,
            w_anchors: (0.0, 0.0),
            roi_anchors: (0.0, 0.0),
            pnl_anchors: (0.0, 0.0),
            population_size: 0,
            total_traders: 0,
        }
    }
}
