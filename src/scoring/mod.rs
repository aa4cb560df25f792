//! Population-wide scoring: configuration, the shrinkage engine, and
//! tier classification.

pub mod config;
pub mod engine;
pub mod tags;

pub use config::ScoringConfig;
pub use engine::score_population;
