//! Auction-based rebalancing for basket tokens.
//!
//! A manager declares per-asset target unit allocations and a price curve for
//! each asset; bidders then settle many small, independent Dutch-style
//! auctions that exchange single assets against a designated settlement
//! asset. The basket's recorded holdings converge toward the targets one bid
//! at a time.
//!
//! The engine never owns the basket itself: share accounting, position
//! storage and token movement stay behind the [`infra::basket::Basket`] seam,
//! fee percentages behind [`infra::fee::FeeRegistry`] and price curve
//! resolution behind [`infra::curves::CurveRegistry`].

pub mod domain;
pub mod infra;

#[cfg(test)]
mod tests;

pub use domain::{
    curve::{CurveData, Price, PriceCurve},
    rebalance::{AuctionParams, Error, RebalanceModule},
};
