//! FIFO PnL matcher: attributes entry/exit prices and realized PnL to
//! cleaned trades using first-in-first-out inventory accounting.

use std::collections::{HashMap, VecDeque};

use rust_decimal::Decimal;
use tracing::info;

use crate::models::{CleanedTrade, MatchedTrade, PositionLot, TradeSide};

/// Match BUY and SELL trades through per-(wallet, asset) FIFO lot queues.
///
/// Trades are processed in ascending timestamp order (stable for ties).
/// A BUY opens a new lot. A SELL consumes lots from the front of its
/// wallet's queue for the asset:
/// - entry price is the size-weighted average cost of the consumed lots,
/// - exit price is the sell's own price,
/// - realized PnL is `(exit - entry) x full sell size`, even when the
///   queue could only cover part of the sell.
///
/// A SELL that finds no open lots is unattributable: it keeps its exit
/// price but carries no entry price and no PnL.
///
/// Every input trade appears exactly once in the output, in processing
/// order.
pub fn match_trades(mut trades: Vec<CleanedTrade>) -> Vec<MatchedTrade> {
    trades.sort_by_key(|t| t.timestamp);

    let mut queues: HashMap<(String, String), VecDeque<PositionLot>> = HashMap::new();
    let mut matched: Vec<MatchedTrade> = Vec::with_capacity(trades.len());
    let mut unattributed_sells = 0usize;

    for trade in trades {
        let key = (trade.wallet.to_lowercase(), trade.asset.to_lowercase());
        match trade.side {
            TradeSide::Buy => {
                queues.entry(key).or_default().push_back(PositionLot {
                    size: trade.size,
                    price: trade.price,
                    timestamp: trade.timestamp,
                });
                let entry_price = trade.price;
                matched.push(MatchedTrade {
                    trade,
                    entry_price: Some(entry_price),
                    exit_price: None,
                    pnl: None,
                });
            }
            TradeSide::Sell => {
                let queue = queues.entry(key).or_default();
                let (total_size, total_cost) = consume_lots(queue, trade.size);

                if total_size > Decimal::ZERO {
                    let entry_price = total_cost / total_size;
                    let pnl = (trade.price - entry_price) * trade.size;
                    let exit_price = trade.price;
                    matched.push(MatchedTrade {
                        trade,
                        entry_price: Some(entry_price),
                        exit_price: Some(exit_price),
                        pnl: Some(pnl),
                    });
                } else {
                    unattributed_sells += 1;
                    let exit_price = trade.price;
                    matched.push(MatchedTrade {
                        trade,
                        entry_price: None,
                        exit_price: Some(exit_price),
                        pnl: None,
                    });
                }
            }
        }
    }

    info!(
        trades = matched.len(),
        unattributed_sells, "matched trades via FIFO attribution"
    );

    matched
}

/// Pop lots from the front of `queue` until `wanted` size is consumed or
/// the queue empties. A partially consumed lot is shrunk in place and
/// stays at the front. Returns (consumed size, consumed cost).
fn consume_lots(queue: &mut VecDeque<PositionLot>, wanted: Decimal) -> (Decimal, Decimal) {
    let mut remaining = wanted;
    let mut total_size = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    while remaining > Decimal::ZERO {
        let Some(lot) = queue.front_mut() else {
            break;
        };
        let take = lot.size.min(remaining);
        total_size += take;
        total_cost += take * lot.price;
        remaining -= take;
        lot.size -= take;
        if lot.size <= Decimal::ZERO {
            queue.pop_front();
        }
    }

    (total_size, total_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const WALLET: &str = "0xd2e08bc2a0b4c7d8e9f0a1b2c3d4e5f601234567";
    const OTHER_WALLET: &str = "0xe3f19cd3b1c5d8e9f0a1b2c3d4e5f60123456789";

    fn trade(side: TradeSide, size: Decimal, price: Decimal, ts: i64) -> CleanedTrade {
        trade_for(WALLET, "asset-1", side, size, price, ts)
    }

    fn trade_for(
        wallet: &str,
        asset: &str,
        side: TradeSide,
        size: Decimal,
        price: Decimal,
        ts: i64,
    ) -> CleanedTrade {
        CleanedTrade {
            wallet: wallet.to_string(),
            side,
            asset: asset.to_string(),
            condition_id: "0xc1".to_string(),
            size,
            price,
            timestamp: ts,
            transaction_hash: format!("0xtx{ts}"),
            title: None,
            slug: None,
            outcome: None,
        }
    }

    #[test]
    fn test_fifo_weighted_average_entry() {
        // 10 @ $1 and 5 @ $2 bought, then 12 sold @ $3. The sell consumes
        // the whole first lot plus 2 units of the second:
        // entry = (10*1 + 2*2) / 12, pnl = (3 - entry) * 12 = 22.
        let trades = vec![
            trade(TradeSide::Buy, dec!(10), dec!(1), 1),
            trade(TradeSide::Buy, dec!(5), dec!(2), 2),
            trade(TradeSide::Sell, dec!(12), dec!(3), 3),
        ];
        let matched = match_trades(trades);
        assert_eq!(matched.len(), 3);

        let sell = &matched[2];
        let entry = sell.entry_price.unwrap();
        assert!((entry - dec!(1.1667)).abs() < dec!(0.0001));
        assert_eq!(sell.exit_price, Some(dec!(3)));
        let pnl = sell.pnl.unwrap();
        assert!((pnl - dec!(22)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_partial_lot_remains_for_next_sell() {
        let trades = vec![
            trade(TradeSide::Buy, dec!(10), dec!(1), 1),
            trade(TradeSide::Buy, dec!(5), dec!(2), 2),
            trade(TradeSide::Sell, dec!(12), dec!(3), 3),
            // 3 units @ $2 remain; this sell closes them out
            trade(TradeSide::Sell, dec!(3), dec!(4), 4),
        ];
        let matched = match_trades(trades);
        let second_sell = &matched[3];
        assert_eq!(second_sell.entry_price, Some(dec!(2)));
        assert_eq!(second_sell.pnl, Some(dec!(6)));
    }

    #[test]
    fn test_unattributable_sell_has_no_pnl() {
        let matched = match_trades(vec![trade(TradeSide::Sell, dec!(5), dec!(0.7), 1)]);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].entry_price, None);
        assert_eq!(matched[0].exit_price, Some(dec!(0.7)));
        assert_eq!(matched[0].pnl, None);
    }

    #[test]
    fn test_oversized_sell_uses_full_size_for_pnl() {
        // Only 4 of the 10 sold units have matching inventory; PnL is
        // still computed over the full sell size.
        let trades = vec![
            trade(TradeSide::Buy, dec!(4), dec!(0.5), 1),
            trade(TradeSide::Sell, dec!(10), dec!(0.8), 2),
        ];
        let matched = match_trades(trades);
        let sell = &matched[1];
        assert_eq!(sell.entry_price, Some(dec!(0.5)));
        assert_eq!(sell.pnl, Some(dec!(3))); // (0.8 - 0.5) * 10
    }

    #[test]
    fn test_lots_are_wallet_isolated() {
        let trades = vec![
            trade_for(WALLET, "asset-1", TradeSide::Buy, dec!(10), dec!(0.5), 1),
            trade_for(OTHER_WALLET, "asset-1", TradeSide::Sell, dec!(10), dec!(0.9), 2),
        ];
        let matched = match_trades(trades);
        // The other wallet never bought, so its sell is unattributable
        // even though the asset id matches an open lot.
        assert_eq!(matched[1].pnl, None);
    }

    #[test]
    fn test_trades_sorted_by_timestamp_before_matching() {
        // Sell arrives first in input order but later in time.
        let trades = vec![
            trade(TradeSide::Sell, dec!(5), dec!(1), 10),
            trade(TradeSide::Buy, dec!(5), dec!(0.4), 5),
        ];
        let matched = match_trades(trades);
        assert_eq!(matched[0].trade.side, TradeSide::Buy);
        assert_eq!(matched[1].pnl, Some(dec!(3))); // (1 - 0.4) * 5
    }

    #[test]
    fn test_zero_size_trades_pass_through() {
        let trades = vec![
            trade(TradeSide::Buy, dec!(0), dec!(0.5), 1),
            trade(TradeSide::Sell, dec!(0), dec!(0.6), 2),
        ];
        let matched = match_trades(trades);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[1].pnl, None);
    }

    #[test]
    fn test_no_trade_dropped_or_duplicated() {
        let trades: Vec<CleanedTrade> = (0..20)
            .map(|i| {
                let side = if i % 3 == 0 { TradeSide::Sell } else { TradeSide::Buy };
                trade(side, dec!(2), dec!(0.5), i)
            })
            .collect();
        let hashes: Vec<String> = trades.iter().map(|t| t.transaction_hash.clone()).collect();
        let matched = match_trades(trades);
        let mut out: Vec<String> = matched
            .iter()
            .map(|m| m.trade.transaction_hash.clone())
            .collect();
        out.sort();
        let mut expected = hashes;
        expected.sort();
        assert_eq!(out, expected);
    }
}
