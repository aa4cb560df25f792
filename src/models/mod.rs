//! Data models for raw records, cleaned trades, positions, aggregates, and
//! scored traders.

mod aggregate;
mod position;
mod scored;
mod trade;

pub use aggregate::TraderAggregate;
pub use position::{ClosedPosition, PositionLot, RawClosedPosition};
pub use scored::{PopulationStats, ScoredTrader};
pub use trade::{CleanedTrade, MatchedTrade, RawTrade, TradeSide};
