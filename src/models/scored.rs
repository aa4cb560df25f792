//! Scored trader output: shrunk statistics, sub-scores, composite score,
//! rank, and descriptive tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::TraderAggregate;
use crate::scoring::tags::{NewTraderTag, StreakTier, VolumeTier};

/// A trader after the population-wide scoring pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTrader {
    /// The per-trader rollup this score was derived from
    #[serde(flatten)]
    pub aggregate: TraderAggregate,

    /// Concentration-adjusted effective sample size:
    /// total_stakes² / sum_sq_stakes
    pub n_eff: f64,

    /// Shrunk win rate as a fraction (blend of trade-count and
    /// stake-weighted variants)
    pub w_shrunk: f64,

    /// Shrunk ROI in percent
    pub roi_shrunk: f64,

    /// Whale-adjusted PnL: total_pnl damped by stake concentration
    pub pnl_adj: f64,

    /// Shrunk whale-adjusted PnL
    pub pnl_shrunk: f64,

    /// Win-rate sub-score, 0-100
    pub score_win_rate: f64,

    /// ROI sub-score, 0-100
    pub score_roi: f64,

    /// PnL sub-score, 0-100
    pub score_pnl: f64,

    /// Risk sub-score from maximum-drawdown decay, 0-100
    pub score_risk: f64,

    /// Weighted composite of the four sub-scores, clamped to 0-100
    pub final_score: f64,

    /// 1-based leaderboard rank (final_score descending, stable ties)
    pub rank: u32,

    /// Volume band for the trader's total stakes
    pub volume_tier: VolumeTier,

    /// Streak band for trailing consecutive wins, if any
    pub streak_tier: Option<StreakTier>,

    /// Early-performance tag for low-prediction-count traders, if any
    pub new_trader_tag: Option<NewTraderTag>,

    /// When this score was computed
    pub calculated_at: DateTime<Utc>,
}

/// Cross-sectional statistics the engine derived from the eligible
/// population: the shrinkage targets and percentile anchors behind every
/// individual score in the same pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Stake-weighted mean win rate (fraction) used as shrinkage prior
    pub prior_win_rate: f64,

    /// Population median raw ROI in percent
    pub roi_median: f64,

    /// Population median whale-adjusted PnL
    pub pnl_median: f64,

    /// 1st/99th percentile of shrunk win rate
    pub w_anchors: (f64, f64),

    /// 1st/99th percentile of shrunk ROI
    pub roi_anchors: (f64, f64),

    /// 1st/99th percentile of shrunk PnL
    pub pnl_anchors: (f64, f64),

    /// Traders that met the eligibility cutoff for priors and anchors
    pub population_size: usize,

    /// All traders scored in the pass
    pub total_traders: usize,
}
