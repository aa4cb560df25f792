//! Per-trader rollup of realized outcomes, recomputed wholesale each
//! scoring pass.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary statistics for one wallet, produced by the metric aggregator and
/// consumed by the population-wide scoring engine. Value object: never
/// mutated after construction within a scoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraderAggregate {
    /// Wallet address this rollup belongs to
    pub wallet: String,

    /// Total records seen (including those without a realized PnL)
    pub total_trades: u32,

    /// Records carrying a realized PnL (the win-rate denominator)
    pub total_trades_with_pnl: u32,

    /// Records with realized PnL > 0
    pub winning_trades: u32,

    /// Σ stake over all records
    pub total_stakes: Decimal,

    /// Σ stake over records with realized PnL > 0
    pub winning_stakes: Decimal,

    /// Σ stake² — quadratic term for the concentration-adjusted
    /// effective sample size downstream
    pub sum_sq_stakes: Decimal,

    /// Σ realized PnL
    pub total_pnl: Decimal,

    /// Return on investment as a percentage (0 when no stakes)
    pub roi: f64,

    /// Trade-count win rate as a percentage (0 when no PnL records)
    pub win_rate: f64,

    /// Stake-weighted win rate as a percentage: winning_stakes / total_stakes
    pub stake_win_rate: f64,

    /// Mean of the top-5 largest individual stakes
    pub max_stake: Decimal,

    /// Most negative realized PnL (0 when there are no losses)
    pub worst_loss: Decimal,

    /// All negative realized PnL values, for risk diagnostics
    pub all_losses: Vec<Decimal>,

    /// Chronological realized PnL sequence, for equity-curve reconstruction
    pub pnl_history: Vec<Decimal>,

    /// Trailing consecutive wins at the end of the PnL sequence
    pub win_streak: u32,
}

impl TraderAggregate {
    /// Empty rollup for a wallet with no usable records.
    pub fn new(wallet: String) -> Self {
        Self {
            wallet,
            total_trades: 0,
            total_trades_with_pnl: 0,
            winning_trades: 0,
            total_stakes: Decimal::ZERO,
            winning_stakes: Decimal::ZERO,
            sum_sq_stakes: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
            roi: 0.0,
            win_rate: 0.0,
            stake_win_rate: 0.0,
            max_stake: Decimal::ZERO,
            worst_loss: Decimal::ZERO,
            all_losses: Vec::new(),
            pnl_history: Vec::new(),
            win_streak: 0,
        }
    }
}
