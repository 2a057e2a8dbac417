//! Fixed-point numeric primitives shared by the auction rebalance engine.
//!
//! Position units, curve prices and fee rates are all 18-decimal ("WAD")
//! scaled [`alloy_primitives::U256`] values. Every multiply/divide in this
//! crate takes an explicit rounding direction because target reachability
//! under repeated bidding depends on which way a call site rounds.

pub mod units;
pub mod wad;

pub use {
    units::WadUnit,
    wad::{MulDiv, WAD, WadExt},
};
