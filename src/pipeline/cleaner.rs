//! Trade cleaner: validation, normalization, and deduplication of raw
//! records before any PnL attribution happens.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::models::{CleanedTrade, ClosedPosition, RawClosedPosition, RawTrade, TradeSide};

/// A valid wallet is "0x" followed by exactly 40 hex digits.
pub fn is_valid_wallet(wallet: &str) -> bool {
    wallet.len() == 42
        && wallet.starts_with("0x")
        && wallet[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Clean raw trade records:
/// 1. drop records missing wallet or transaction hash, or with an invalid
///    wallet format,
/// 2. normalize side (default BUY) into the canonical schema,
/// 3. deduplicate on (wallet, tx hash, timestamp, asset), case-insensitive
///    on the string parts — the first record with a given key wins.
///
/// Invalid and duplicate records are dropped, never retried or merged.
pub fn clean_trades(records: Vec<RawTrade>) -> Vec<CleanedTrade> {
    let input_count = records.len();
    let mut seen: HashSet<(String, String, i64, String)> = HashSet::new();
    let mut cleaned: Vec<CleanedTrade> = Vec::with_capacity(records.len());
    let mut dropped_invalid = 0usize;
    let mut dropped_duplicate = 0usize;

    for record in records {
        let Some(wallet) = record.wallet.filter(|w| !w.is_empty()) else {
            dropped_invalid += 1;
            continue;
        };
        let Some(tx_hash) = record.transaction_hash.filter(|h| !h.is_empty()) else {
            dropped_invalid += 1;
            continue;
        };
        if !is_valid_wallet(&wallet) {
            debug!(wallet = %wallet, "dropping trade with invalid wallet address");
            dropped_invalid += 1;
            continue;
        }

        let trade = CleanedTrade {
            side: TradeSide::parse_or_default(record.side.as_deref()),
            asset: record.asset.unwrap_or_default(),
            condition_id: record.condition_id.unwrap_or_default(),
            size: record.size,
            price: record.price,
            timestamp: record.timestamp,
            title: record.title,
            slug: record.slug,
            outcome: record.outcome,
            wallet,
            transaction_hash: tx_hash,
        };

        if !seen.insert(trade.dedup_key()) {
            debug!(tx = %trade.transaction_hash, "dropping duplicate trade");
            dropped_duplicate += 1;
            continue;
        }

        cleaned.push(trade);
    }

    info!(
        input = input_count,
        kept = cleaned.len(),
        dropped_invalid,
        dropped_duplicate,
        "cleaned trade records"
    );

    cleaned
}

/// Validate raw closed-position records, dropping any without a
/// well-formed wallet address.
pub fn clean_closed_positions(records: Vec<RawClosedPosition>) -> Vec<ClosedPosition> {
    let input_count = records.len();
    let mut cleaned: Vec<ClosedPosition> = Vec::with_capacity(records.len());

    for record in records {
        let Some(wallet) = record.wallet.filter(|w| is_valid_wallet(w)) else {
            continue;
        };
        cleaned.push(ClosedPosition {
            wallet,
            total_bought: record.total_bought,
            avg_price: record.avg_price,
            realized_pnl: record.realized_pnl,
            cur_price: record.cur_price,
            timestamp: record.timestamp,
            title: record.title,
            slug: record.slug,
        });
    }

    info!(
        input = input_count,
        kept = cleaned.len(),
        "cleaned closed-position records"
    );

    cleaned
}
