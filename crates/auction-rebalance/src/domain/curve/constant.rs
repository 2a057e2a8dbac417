//! The constant curve: a fixed price for the whole window.

use {
    super::{CurveData, Error, Price, PriceCurve},
    crate::domain::{eth::U256, time::Duration},
    alloy_sol_types::SolValue,
};

/// Quotes the same price regardless of elapsed time.
#[derive(Debug, Default)]
pub struct Constant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantParams {
    pub price: U256,
}

impl ConstantParams {
    pub fn encode(&self) -> CurveData {
        CurveData(self.price.abi_encode())
    }

    pub fn decode(data: &CurveData) -> Result<Self, Error> {
        let price = U256::abi_decode(&data.0).map_err(|_| Error::InvalidParameters)?;
        if price.is_zero() {
            return Err(Error::InvalidParameters);
        }
        Ok(Self { price })
    }
}

impl PriceCurve for Constant {
    fn price(
        &self,
        data: &CurveData,
        _elapsed: Duration,
        _duration: Duration,
    ) -> Result<Price, Error> {
        let params = ConstantParams::decode(data)?;
        Ok(Price(params.price))
    }
}
