//! Position records: open FIFO inventory lots and settled closed positions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One open inventory unit inside the matcher's per-(wallet, asset) FIFO
/// queue. Lots only live for the duration of a matching pass; they are
/// consumed (or partially consumed) by SELL matches and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionLot {
    /// Tokens remaining in this lot
    pub size: Decimal,

    /// Unit price the lot was opened at
    pub price: Decimal,

    /// Unix timestamp the lot was opened
    pub timestamp: i64,
}

/// Raw closed-position record from the upstream API, tolerant of both
/// field-naming conventions like [`RawTrade`](super::RawTrade).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClosedPosition {
    /// Trader's wallet address
    #[serde(
        default,
        rename = "proxyWallet",
        alias = "proxy_wallet",
        alias = "wallet",
        alias = "user"
    )]
    pub wallet: Option<String>,

    /// Total shares bought over the life of the position
    #[serde(default, rename = "totalBought", alias = "total_bought")]
    pub total_bought: Decimal,

    /// Average entry price per share
    #[serde(default, rename = "avgPrice", alias = "avg_price")]
    pub avg_price: Decimal,

    /// Realized PnL at settlement
    #[serde(default, rename = "realizedPnl", alias = "realized_pnl")]
    pub realized_pnl: Decimal,

    /// Last observed market price
    #[serde(default, rename = "curPrice", alias = "cur_price")]
    pub cur_price: Option<Decimal>,

    /// Unix timestamp of settlement
    #[serde(default)]
    pub timestamp: i64,

    /// Market title for display
    #[serde(default)]
    pub title: Option<String>,

    /// Market slug
    #[serde(default, rename = "slug", alias = "market_slug")]
    pub slug: Option<String>,
}

/// Settled position with a validated wallet — the ground-truth unit for
/// realized outcomes that most aggregation consumes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPosition {
    /// Validated 0x-prefixed wallet address
    pub wallet: String,

    /// Total shares bought over the life of the position
    pub total_bought: Decimal,

    /// Average entry price per share
    pub avg_price: Decimal,

    /// Realized PnL at settlement
    pub realized_pnl: Decimal,

    /// Last observed market price
    pub cur_price: Option<Decimal>,

    /// Unix timestamp of settlement
    pub timestamp: i64,

    /// Market title for display
    pub title: Option<String>,

    /// Market slug
    pub slug: Option<String>,
}

impl ClosedPosition {
    /// Cost basis committed to this position.
    pub fn stake(&self) -> Decimal {
        self.total_bought * self.avg_price
    }
}
