//! Per-trader metric computation: realized-outcome aggregation and
//! drawdown risk scoring.

pub mod aggregator;
pub mod risk;
