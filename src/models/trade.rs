//! Trade records at each stage of the attribution pipeline: raw API records,
//! cleaned canonical trades, and FIFO-matched trades with realized PnL.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }

    /// Parse a raw side string, case-insensitively. A missing or
    /// unrecognized side defaults to BUY.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_uppercase()) {
            Some(s) if s == "SELL" => TradeSide::Sell,
            _ => TradeSide::Buy,
        }
    }
}

/// Raw trade record as delivered by the upstream data API.
///
/// The source emits two field-naming conventions (camelCase and snake_case)
/// depending on the endpoint; serde aliases fold both into one canonical
/// schema here, so nothing downstream ever sees the dual names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrade {
    /// Trader's wallet address
    #[serde(
        default,
        rename = "proxyWallet",
        alias = "proxy_wallet",
        alias = "wallet",
        alias = "user"
    )]
    pub wallet: Option<String>,

    /// On-chain transaction hash
    #[serde(
        default,
        rename = "transactionHash",
        alias = "transaction_hash",
        alias = "tx_hash"
    )]
    pub transaction_hash: Option<String>,

    /// Outcome token identifier
    #[serde(default, alias = "token_id")]
    pub asset: Option<String>,

    /// Market condition ID
    #[serde(default, rename = "conditionId", alias = "condition_id")]
    pub condition_id: Option<String>,

    /// Trade direction ("BUY"/"SELL"); missing defaults to BUY
    #[serde(default)]
    pub side: Option<String>,

    /// Number of outcome tokens traded
    #[serde(default, alias = "shares_normalized")]
    pub size: Decimal,

    /// Price per token in USDC (0.0 to 1.0)
    #[serde(default)]
    pub price: Decimal,

    /// Unix timestamp of the trade
    #[serde(default)]
    pub timestamp: i64,

    /// Market title for display
    #[serde(default)]
    pub title: Option<String>,

    /// Market slug
    #[serde(default, rename = "slug", alias = "market_slug")]
    pub slug: Option<String>,

    /// Outcome name being traded (e.g., "Yes", "No")
    #[serde(default)]
    pub outcome: Option<String>,
}

/// Trade record after cleaning: validated wallet, canonical field names,
/// typed side. Produced exclusively by the cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedTrade {
    /// Validated 0x-prefixed wallet address (original casing preserved)
    pub wallet: String,

    /// Trade direction
    pub side: TradeSide,

    /// Outcome token identifier
    pub asset: String,

    /// Market condition ID (may be empty when the source omits it)
    pub condition_id: String,

    /// Number of outcome tokens traded
    pub size: Decimal,

    /// Price per token in USDC
    pub price: Decimal,

    /// Unix timestamp of the trade
    pub timestamp: i64,

    /// On-chain transaction hash
    pub transaction_hash: String,

    /// Market title for display
    pub title: Option<String>,

    /// Market slug
    pub slug: Option<String>,

    /// Outcome name being traded
    pub outcome: Option<String>,
}

impl CleanedTrade {
    /// Identity key for deduplication. Wallet, hash, and asset compare
    /// case-insensitively.
    pub fn dedup_key(&self) -> (String, String, i64, String) {
        (
            self.wallet.to_lowercase(),
            self.transaction_hash.to_lowercase(),
            self.timestamp,
            self.asset.to_lowercase(),
        )
    }

    /// USDC stake committed by this trade.
    pub fn stake(&self) -> Decimal {
        self.size * self.price
    }
}

impl From<CleanedTrade> for RawTrade {
    /// A cleaned trade is a valid raw record; used to feed cleaner output
    /// back through the cleaner (idempotence).
    fn from(t: CleanedTrade) -> Self {
        RawTrade {
            wallet: Some(t.wallet),
            transaction_hash: Some(t.transaction_hash),
            asset: Some(t.asset),
            condition_id: Some(t.condition_id),
            side: Some(t.side.as_str().to_string()),
            size: t.size,
            price: t.price,
            timestamp: t.timestamp,
            title: t.title,
            slug: t.slug,
            outcome: t.outcome,
        }
    }
}

/// Cleaned trade annotated with FIFO-attributed entry/exit prices and
/// realized PnL. Immutable once produced for a given input set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedTrade {
    #[serde(flatten)]
    pub trade: CleanedTrade,

    /// Weighted-average cost of the BUY lots this trade consumed
    /// (or the buy price itself for a BUY)
    pub entry_price: Option<Decimal>,

    /// Sell price for a SELL; None for a BUY
    pub exit_price: Option<Decimal>,

    /// Realized PnL; None when no entry could be attributed
    pub pnl: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_parse_defaults_to_buy() {
        assert_eq!(TradeSide::parse_or_default(None), TradeSide::Buy);
        assert_eq!(TradeSide::parse_or_default(Some("buy")), TradeSide::Buy);
        assert_eq!(TradeSide::parse_or_default(Some("sell")), TradeSide::Sell);
        assert_eq!(TradeSide::parse_or_default(Some("SELL")), TradeSide::Sell);
        assert_eq!(TradeSide::parse_or_default(Some("???")), TradeSide::Buy);
    }

    #[test]
    fn test_raw_trade_accepts_camel_case() {
        let json = r#"{
            "proxyWallet": "0x1111111111111111111111111111111111111111",
            "transactionHash": "0xabc",
            "asset": "7001",
            "conditionId": "0xc1",
            "side": "SELL",
            "size": "10",
            "price": "0.55",
            "timestamp": 1700000000
        }"#;
        let raw: RawTrade = serde_json::from_str(json).unwrap();
        assert_eq!(
            raw.wallet.as_deref(),
            Some("0x1111111111111111111111111111111111111111")
        );
        assert_eq!(raw.transaction_hash.as_deref(), Some("0xabc"));
        assert_eq!(raw.size, dec!(10));
    }

    #[test]
    fn test_raw_trade_accepts_snake_case() {
        let json = r#"{
            "proxy_wallet": "0x1111111111111111111111111111111111111111",
            "tx_hash": "0xabc",
            "token_id": "7001",
            "condition_id": "0xc1",
            "price": "0.55",
            "size": "10",
            "timestamp": 1700000000,
            "market_slug": "some-market"
        }"#;
        let raw: RawTrade = serde_json::from_str(json).unwrap();
        assert_eq!(
            raw.wallet.as_deref(),
            Some("0x1111111111111111111111111111111111111111")
        );
        assert_eq!(raw.asset.as_deref(), Some("7001"));
        assert_eq!(raw.slug.as_deref(), Some("some-market"));
        assert!(raw.side.is_none());
    }

    #[test]
    fn test_dedup_key_case_insensitive() {
        let t = CleanedTrade {
            wallet: "0xAbCd111111111111111111111111111111111111".to_string(),
            side: TradeSide::Buy,
            asset: "TOK".to_string(),
            condition_id: String::new(),
            size: dec!(1),
            price: dec!(0.5),
            timestamp: 42,
            transaction_hash: "0xFF".to_string(),
            title: None,
            slug: None,
            outcome: None,
        };
        let (w, h, ts, a) = t.dedup_key();
        assert_eq!(w, "0xabcd111111111111111111111111111111111111");
        assert_eq!(h, "0xff");
        assert_eq!(ts, 42);
        assert_eq!(a, "tok");
    }
}
