use alloy_primitives::{
    U256,
    utils::{ParseUnits, parse_units},
};

use crate::wad::WAD;

/// WAD-scaled literals, mainly for tests and fixtures: `2_000u64.wad()`,
/// `0.0005f64.wad()`.
pub trait WadUnit: std::marker::Sized {
    /// Returns the value scaled by `10^18`.
    fn wad(self) -> U256;
}

impl WadUnit for u64 {
    fn wad(self) -> U256 {
        U256::from(self) * WAD
    }
}

impl WadUnit for u128 {
    fn wad(self) -> U256 {
        U256::from(self) * WAD
    }
}

impl WadUnit for f64 {
    fn wad(self) -> U256 {
        match parse_units(&self.to_string(), "ether").unwrap() {
            ParseUnits::U256(val) => val,
            _ => panic!("could not parse number as u256: {self}"),
        }
    }
}
