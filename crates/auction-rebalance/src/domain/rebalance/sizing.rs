//! Auction sizing.
//!
//! All sizing happens in notional space: a position unit (asset base units
//! per basket share, WAD scaled) times the total share supply gives the
//! basket's notional holding of an asset. Target units are recorded at the
//! reference position multiplier declared when the rebalance started; as the
//! live multiplier drifts (streaming fees accrue, targets get raised), the
//! effective target scales with it.
//!
//! Rounding favors the basket throughout: current notionals round down,
//! target notionals round up, so an auction never sells past the target and
//! never buys beyond it.

use {
    super::error::{Error, Result},
    crate::domain::eth::{TokenAddress, U256},
    number::{MulDiv, WAD, WadExt},
};

/// Which way the auctioned asset moves relative to the basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The basket holds too much; bidders buy the asset and pay settlement.
    LeavingBasket,
    /// The basket holds too little; bidders sell the asset for settlement.
    EnteringBasket,
}

/// Everything sizing needs about one asset, captured at call time.
#[derive(Debug, Clone)]
pub struct SizingInputs {
    pub asset: TokenAddress,
    pub current_unit: U256,
    pub target_unit: U256,
    pub live_multiplier: U256,
    pub reference_multiplier: U256,
    pub total_supply: U256,
    /// WAD-scaled protocol fee rate taken from settlement received by the
    /// basket.
    pub fee_rate: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionSize {
    pub direction: Direction,
    /// Largest bid quantity, in asset base units, that does not overshoot
    /// the target.
    pub max_quantity: U256,
}

impl SizingInputs {
    /// The recorded target unit rescaled from the reference multiplier to the
    /// live one.
    pub fn normalized_target_unit(&self) -> Result<U256> {
        if self.reference_multiplier.is_zero() {
            return Err(Error::Overflow);
        }
        self.target_unit
            .checked_mul_div_down(self.live_multiplier, self.reference_multiplier)
            .ok_or(Error::Overflow)
    }

    pub fn current_notional(&self) -> Result<U256> {
        self.current_unit
            .checked_wad_mul_down(self.total_supply)
            .ok_or(Error::Overflow)
    }

    pub fn target_notional(&self) -> Result<U256> {
        self.normalized_target_unit()?
            .checked_wad_mul_up(self.total_supply)
            .ok_or(Error::Overflow)
    }

    pub fn target_met(&self) -> Result<bool> {
        Ok(self.current_notional()? == self.target_notional()?)
    }

    pub fn exceeds_target(&self) -> Result<bool> {
        Ok(self.current_notional()? > self.target_notional()?)
    }
}

/// Sizes the auction for one asset, or fails if its target is already met.
pub fn auction_size(inputs: &SizingInputs) -> Result<AuctionSize> {
    let current = inputs.current_notional()?;
    let target = inputs.target_notional()?;
    match current.cmp(&target) {
        std::cmp::Ordering::Equal => Err(Error::TargetAlreadyMet(inputs.asset)),
        std::cmp::Ordering::Greater => Ok(AuctionSize {
            direction: Direction::LeavingBasket,
            max_quantity: current - target,
        }),
        std::cmp::Ordering::Less => {
            // The protocol fee is skimmed from what the basket receives, so
            // the gross buy quantity is the shortfall inflated by the fee.
            let shortfall = target - current;
            let keep_rate = WAD
                .checked_sub(inputs.fee_rate)
                .filter(|rate| !rate.is_zero())
                .ok_or(Error::Overflow)?;
            let max_quantity = shortfall
                .checked_mul_div_down(WAD, keep_rate)
                .ok_or(Error::Overflow)?;
            Ok(AuctionSize {
                direction: Direction::EnteringBasket,
                max_quantity,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::eth::Address,
        number::{WAD, WadUnit},
    };

    fn inputs() -> SizingInputs {
        SizingInputs {
            asset: TokenAddress(Address::repeat_byte(0xaa)),
            current_unit: 1000_u64.wad(),
            target_unit: 800_u64.wad(),
            live_multiplier: WAD,
            reference_multiplier: WAD,
            total_supply: WAD,
            fee_rate: U256::ZERO,
        }
    }

    #[test]
    fn surplus_sizes_a_sell_auction() {
        let size = auction_size(&inputs()).unwrap();
        assert_eq!(size.direction, Direction::LeavingBasket);
        assert_eq!(size.max_quantity, 200_u64.wad());
    }

    #[test]
    fn shortfall_sizes_a_buy_auction() {
        let size = auction_size(&SizingInputs {
            target_unit: 1200_u64.wad(),
            ..inputs()
        })
        .unwrap();
        assert_eq!(size.direction, Direction::EnteringBasket);
        assert_eq!(size.max_quantity, 200_u64.wad());
    }

    #[test]
    fn buy_quantity_is_inflated_by_the_fee() {
        // A 0.5% fee on an 840 shortfall means buying
        // floor(840e18 * 1e18 / 0.995e18) base units gross.
        let size = auction_size(&SizingInputs {
            current_unit: U256::ZERO,
            target_unit: 840_u64.wad(),
            fee_rate: 0.005.wad(),
            ..inputs()
        })
        .unwrap();
        assert_eq!(size.direction, Direction::EnteringBasket);
        assert_eq!(
            size.max_quantity,
            U256::from(844_221_105_527_638_190_954_u128)
        );
        // The net of the fee lands exactly on the shortfall.
        let fee = size.max_quantity.checked_wad_mul_down(0.005.wad()).unwrap();
        assert_eq!(size.max_quantity - fee, 840_u64.wad());
    }

    #[test]
    fn exact_target_is_already_met() {
        let result = auction_size(&SizingInputs {
            target_unit: 1000_u64.wad(),
            ..inputs()
        });
        assert!(matches!(result, Err(Error::TargetAlreadyMet(_))));
    }

    #[test]
    fn target_scales_with_multiplier_drift() {
        // Multiplier dropped 1% since the reference was taken, so the
        // effective target drops with it and the sell auction grows.
        let size = auction_size(&SizingInputs {
            live_multiplier: 0.99.wad(),
            ..inputs()
        })
        .unwrap();
        assert_eq!(size.direction, Direction::LeavingBasket);
        assert_eq!(size.max_quantity, 1000_u64.wad() - 792_u64.wad());
    }

    #[test]
    fn full_fee_rate_is_rejected() {
        let result = auction_size(&SizingInputs {
            target_unit: 1200_u64.wad(),
            fee_rate: WAD,
            ..inputs()
        });
        assert!(matches!(result, Err(Error::Overflow)));
    }
}
