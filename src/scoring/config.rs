//! Scoring configuration: shrinkage strengths, percentile anchors, and
//! composite blend weights.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the population-wide scoring pass.
///
/// Every knob has an environment override (`POLYRANK_*`) so deployments
/// can tune scoring policy without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Shrinkage pseudo-count: larger values pull small-sample traders
    /// harder toward the population prior
    pub shrink_alpha: f64,

    /// Whale damping strength for concentration-adjusted PnL
    pub whale_alpha: f64,

    /// Decay strength for the drawdown risk score
    pub risk_k: f64,

    /// Starting balance for equity-curve reconstruction
    pub initial_capital: f64,

    /// Minimum PnL-carrying trades for a trader to shape the population
    /// prior and percentile anchors
    pub min_population_trades: u32,

    /// Lower percentile anchor for sub-score normalization
    pub percentile_low: f64,

    /// Upper percentile anchor for sub-score normalization
    pub percentile_high: f64,

    /// Blend weight for the win-rate sub-score
    pub weight_win_rate: f64,

    /// Blend weight for the ROI sub-score
    pub weight_roi: f64,

    /// Blend weight for the PnL sub-score
    pub weight_pnl: f64,

    /// Blend weight for the risk sub-score
    pub weight_risk: f64,

    /// Share of the trade-count variant inside the blended win rate
    pub win_trade_weight: f64,

    /// Share of the stake-weighted variant inside the blended win rate
    pub win_stake_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            shrink_alpha: 50.0,
            whale_alpha: 4.0,
            risk_k: 2.1,
            initial_capital: 1000.0,
            min_population_trades: 5,
            percentile_low: 1.0,
            percentile_high: 99.0,
            weight_win_rate: 0.30,
            weight_roi: 0.30,
            weight_pnl: 0.30,
            weight_risk: 0.10,
            win_trade_weight: 0.5,
            win_stake_weight: 0.5,
        }
    }
}

impl ScoringConfig {
    /// Build from defaults plus `POLYRANK_*` environment overrides.
    /// Unparseable values fall back to the default silently; validation
    /// still runs afterwards.
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        let cfg = Self {
            shrink_alpha: env_f64("POLYRANK_SHRINK_ALPHA", d.shrink_alpha),
            whale_alpha: env_f64("POLYRANK_WHALE_ALPHA", d.whale_alpha),
            risk_k: env_f64("POLYRANK_RISK_K", d.risk_k),
            initial_capital: env_f64("POLYRANK_INITIAL_CAPITAL", d.initial_capital),
            min_population_trades: std::env::var("POLYRANK_MIN_POPULATION_TRADES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.min_population_trades),
            percentile_low: env_f64("POLYRANK_PERCENTILE_LOW", d.percentile_low),
            percentile_high: env_f64("POLYRANK_PERCENTILE_HIGH", d.percentile_high),
            weight_win_rate: env_f64("POLYRANK_WEIGHT_WIN_RATE", d.weight_win_rate),
            weight_roi: env_f64("POLYRANK_WEIGHT_ROI", d.weight_roi),
            weight_pnl: env_f64("POLYRANK_WEIGHT_PNL", d.weight_pnl),
            weight_risk: env_f64("POLYRANK_WEIGHT_RISK", d.weight_risk),
            win_trade_weight: env_f64("POLYRANK_WIN_TRADE_WEIGHT", d.win_trade_weight),
            win_stake_weight: env_f64("POLYRANK_WIN_STAKE_WEIGHT", d.win_stake_weight),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject weight sets that would silently rescale or invert scores.
    pub fn validate(&self) -> Result<()> {
        let blend_sum =
            self.weight_win_rate + self.weight_roi + self.weight_pnl + self.weight_risk;
        if (blend_sum - 1.0).abs() > 1e-9 {
            bail!("blend weights must sum to 1.0, got {blend_sum}");
        }
        let win_sum = self.win_trade_weight + self.win_stake_weight;
        if (win_sum - 1.0).abs() > 1e-9 {
            bail!("win-rate variant weights must sum to 1.0, got {win_sum}");
        }
        if self.shrink_alpha < 0.0 || self.whale_alpha < 0.0 {
            bail!("shrinkage strengths must be non-negative");
        }
        if self.risk_k <= 0.0 {
            bail!("risk decay k must be positive");
        }
        if self.percentile_low >= self.percentile_high {
            bail!(
                "percentile anchors must be ordered, got {} >= {}",
                self.percentile_low,
                self.percentile_high
            );
        }
        Ok(())
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
