pub mod curve;
pub mod eth;
pub mod rebalance;
pub mod time;
