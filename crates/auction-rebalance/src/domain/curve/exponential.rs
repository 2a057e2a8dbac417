//! The bounded stepwise exponential curve.
//!
//! The price is scaled by a fixed WAD ratio once per elapsed time bucket and
//! clamped to a `[min_price, max_price]` band. The ratio must be at least
//! WAD; decreasing curves divide by the accumulated factor, increasing ones
//! multiply by it.

use {
    super::{CurveData, Error, Price, PriceCurve},
    crate::domain::{eth::U256, time::Duration},
    alloy_sol_types::SolValue,
    number::{WAD, WadExt},
};

#[derive(Debug, Default)]
pub struct BoundedStepwiseExponential;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialParams {
    pub initial_price: U256,
    /// WAD-scaled per-bucket scale factor, at least WAD.
    pub bucket_ratio: U256,
    pub bucket_size: Duration,
    pub is_decreasing: bool,
    pub max_price: U256,
    pub min_price: U256,
}

type Abi = (U256, U256, U256, bool, U256, U256);

impl ExponentialParams {
    pub fn encode(&self) -> CurveData {
        let tuple: Abi = (
            self.initial_price,
            self.bucket_ratio,
            U256::from(self.bucket_size.as_secs()),
            self.is_decreasing,
            self.max_price,
            self.min_price,
        );
        CurveData(tuple.abi_encode())
    }

    pub fn decode(data: &CurveData) -> Result<Self, Error> {
        let (initial_price, bucket_ratio, bucket_size, is_decreasing, max_price, min_price) =
            Abi::abi_decode(&data.0).map_err(|_| Error::InvalidParameters)?;
        let bucket_size = u64::try_from(bucket_size).map_err(|_| Error::InvalidParameters)?;
        let params = Self {
            initial_price,
            bucket_ratio,
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
            && self.bucket_ratio >= WAD
            && !self.initial_price.is_zero()
            && !self.min_price.is_zero()
            && self.min_price <= self.initial_price
            && self.initial_price <= self.max_price;
        if valid { Ok(()) } else { Err(Error::InvalidParameters) }
    }
}

impl PriceCurve for BoundedStepwiseExponential {
    fn price(
        &self,
        data: &CurveData,
        elapsed: Duration,
        _duration: Duration,
    ) -> Result<Price, Error> {
        let params = ExponentialParams::decode(data)?;
        let buckets = elapsed.as_secs() / params.bucket_size.as_secs();
        // Exponentiation by squaring keeps adversarially large elapsed times
        // cheap. A factor too large to represent pins the price to the bound
        // the curve was heading for anyway.
        let price = match params.bucket_ratio.checked_wad_pow(buckets) {
            Some(factor) if params.is_decreasing => params
                .initial_price
                .checked_wad_div_down(factor)
                .unwrap_or(U256::ZERO),
            Some(factor) => params
                .initial_price
                .checked_wad_mul_down(factor)
                .unwrap_or(U256::MAX),
            None if params.is_decreasing => U256::ZERO,
            None => U256::MAX,
        };
        Ok(Price(price.clamp(params.min_price, params.max_price)))
    }
}
