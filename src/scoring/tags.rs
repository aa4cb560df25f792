//! Descriptive tier classification: volume bands, win-streak bands, and
//! early-performance tags. Pure lookups over aggregate numbers.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Volume band for a trader's total stakes, nine bands from under $5k to
/// over $100M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTier {
    Shrimp,
    Crab,
    Fish,
    YoungDolphin,
    Dolphin,
    Shark,
    Whale,
    MegaWhale,
    EliteWhale,
}

impl VolumeTier {
    /// Lower-inclusive, upper-exclusive bands.
    pub fn classify(total_stakes: Decimal) -> Self {
        if total_stakes < dec!(5_000) {
            VolumeTier::Shrimp
        } else if total_stakes < dec!(20_000) {
            VolumeTier::Crab
        } else if total_stakes < dec!(50_000) {
            VolumeTier::Fish
        } else if total_stakes < dec!(200_000) {
            VolumeTier::YoungDolphin
        } else if total_stakes < dec!(500_000) {
            VolumeTier::Dolphin
        } else if total_stakes < dec!(1_000_000) {
            VolumeTier::Shark
        } else if total_stakes < dec!(10_000_000) {
            VolumeTier::Whale
        } else if total_stakes < dec!(100_000_000) {
            VolumeTier::MegaWhale
        } else {
            VolumeTier::EliteWhale
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeTier::Shrimp => "Shrimp",
            VolumeTier::Crab => "Crab",
            VolumeTier::Fish => "Fish",
            VolumeTier::YoungDolphin => "Young Dolphin",
            VolumeTier::Dolphin => "Dolphin",
            VolumeTier::Shark => "Shark",
            VolumeTier::Whale => "Whale",
            VolumeTier::MegaWhale => "Mega Whale",
            VolumeTier::EliteWhale => "Elite Whale",
        }
    }
}

impl fmt::Display for VolumeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Streak band for trailing consecutive wins. Streaks under 3 carry no
/// tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakTier {
    Warm,
    Hot,
    Blazing,
    Scorching,
    Inferno,
    Unstoppable,
    Legendary,
}

impl StreakTier {
    pub fn classify(consecutive_wins: u32) -> Option<Self> {
        match consecutive_wins {
            n if n >= 30 => Some(StreakTier::Legendary),
            n if n >= 20 => Some(StreakTier::Unstoppable),
            n if n >= 15 => Some(StreakTier::Inferno),
            n if n >= 10 => Some(StreakTier::Scorching),
            n if n >= 8 => Some(StreakTier::Blazing),
            n if n >= 5 => Some(StreakTier::Hot),
            n if n >= 3 => Some(StreakTier::Warm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakTier::Warm => "Warm",
            StreakTier::Hot => "Hot",
            StreakTier::Blazing => "Blazing",
            StreakTier::Scorching => "Scorching",
            StreakTier::Inferno => "Inferno",
            StreakTier::Unstoppable => "Unstoppable",
            StreakTier::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for StreakTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Early-performance tag for traders with fewer than 30 predictions.
/// PnL bands are lower-inclusive; below $20 there is no tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewTraderTag {
    GreenBeginning,
    PromisingStart,
    StrongDebut,
    HotStart,
}

impl NewTraderTag {
    pub fn classify(total_pnl: Decimal, total_predictions: u32) -> Option<Self> {
        if total_predictions >= 30 {
            return None;
        }
        if total_pnl >= dec!(10_000) {
            Some(NewTraderTag::HotStart)
        } else if total_pnl >= dec!(1_000) {
            Some(NewTraderTag::StrongDebut)
        } else if total_pnl >= dec!(100) {
            Some(NewTraderTag::PromisingStart)
        } else if total_pnl >= dec!(20) {
            Some(NewTraderTag::GreenBeginning)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NewTraderTag::GreenBeginning => "Green Beginning",
            NewTraderTag::PromisingStart => "Promising Start",
            NewTraderTag::StrongDebut => "Strong Debut",
            NewTraderTag::HotStart => "Hot Start",
        }
    }
}

impl fmt::Display for NewTraderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
