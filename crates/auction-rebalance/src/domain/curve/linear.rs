//! The bounded stepwise linear curve.
//!
//! The price moves by a fixed slope once per elapsed time bucket and is
//! clamped to a `[min_price, max_price]` band. Decreasing variants implement
//! the classic Dutch auction; increasing variants let the manager pay up over
//! time for assets entering the basket.

use {
    super::{CurveData, Error, Price, PriceCurve},
    crate::domain::{eth::U256, time::Duration},
    alloy_sol_types::SolValue,
};

#[derive(Debug, Default)]
pub struct BoundedStepwiseLinear;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearParams {
    pub initial_price: U256,
    /// Absolute price change applied per completed bucket.
    pub bucket_slope: U256,
    pub bucket_size: Duration,
    pub is_decreasing: bool,
    pub max_price: U256,
    pub min_price: U256,
}

type Abi = (U256, U256, U256, bool, U256, U256);

impl LinearParams {
    pub fn encode(&self) -> CurveData {
        let tuple: Abi = (
            self.initial_price,
            self.bucket_slope,
            U256::from(self.bucket_size.as_secs()),
            self.is_decreasing,
            self.max_price,
            self.min_price,
        );
        CurveData(tuple.abi_encode())
    }

    pub fn decode(data: &CurveData) -> Result<Self, Error> {
        let (initial_price, bucket_slope, bucket_size, is_decreasing, max_price, min_price) =
            Abi::abi_decode(&data.0).map_err(|_| Error::InvalidParameters)?;
        let bucket_size = u64::try_from(bucket_size).map_err(|_| Error::InvalidParameters)?;
        let params = Self {
            initial_price,
            bucket_slope,
            bucket_size: Duration(bucket_size),
            is_decreasing,
            max_price,
            min_price,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), Error> {
        let valid = self.bucket_size.as_secs() > 0
            && !self.initial_price.is_zero()
            && !self.min_price.is_zero()
            && self.min_price <= self.initial_price
            && self.initial_price <= self.max_price;
        if valid { Ok(()) } else { Err(Error::InvalidParameters) }
    }
}

impl PriceCurve for BoundedStepwiseLinear {
    fn price(
        &self,
        data: &CurveData,
        elapsed: Duration,
        _duration: Duration,
    ) -> Result<Price, Error> {
        let params = LinearParams::decode(data)?;
        let buckets = elapsed.as_secs() / params.bucket_size.as_secs();
        // An overflowing total change only ever pushes the price further
        // toward a bound, so saturating and clamping is exact.
        let change = params
            .bucket_slope
            .checked_mul(U256::from(buckets))
            .unwrap_or(U256::MAX);
        let price = if params.is_decreasing {
            params.initial_price.saturating_sub(change)
        } else {
            params.initial_price.saturating_add(change)
        };
        Ok(Price(price.clamp(params.min_price, params.max_price)))
    }
}
