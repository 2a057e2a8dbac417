//! Price curves.
//!
//! A curve maps time elapsed inside the rebalance window to a settlement
//! price, expressed as settlement-asset wei per WAD of the auctioned asset.
//! Curves are stateless evaluators; all per-auction shape parameters travel
//! as ABI-encoded [`CurveData`] blobs chosen by the basket manager, and are
//! decoded and validated again on every evaluation.

pub mod constant;
pub mod exponential;
pub mod linear;

pub use self::{
    constant::Constant,
    exponential::BoundedStepwiseExponential,
    linear::BoundedStepwiseLinear,
};
use crate::domain::{eth::U256, time::Duration};

/// A settlement price: settlement-asset wei per WAD (10^18 base units) of the
/// auctioned asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(pub U256);

/// Opaque ABI-encoded curve parameters, stored per asset and interpreted by
/// the curve the manager named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurveData(pub Vec<u8>);

/// A price curve evaluator.
pub trait PriceCurve: Send + Sync {
    /// Computes the price at `elapsed` seconds into a window of length
    /// `duration`.
    ///
    /// Implementations must be total over arbitrary `elapsed` values: a
    /// malicious bidder controls when they call, so evaluation past the
    /// nominal duration clamps rather than fails.
    fn price(
        &self,
        data: &CurveData,
        elapsed: Duration,
        duration: Duration,
    ) -> Result<Price, Error>;
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("malformed curve parameters")]
    InvalidParameters,
    #[error("price computation overflowed")]
    Overflow,
}
