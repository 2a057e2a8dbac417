//! 18-decimal fixed-point arithmetic over [`U256`].
//!
//! All intermediate products go through 512 bits so `a * b / c` never
//! overflows before the division. Callers pick floor or ceiling rounding per
//! call site.

use alloy_primitives::{U256, U512, ruint::UintTryFrom};

/// The fixed-point scaling factor, `10^18`.
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// `self * num / den` computed through a 512-bit intermediate.
pub trait MulDiv: Sized {
    /// Floor rounding. `None` when `den` is zero or the result does not fit.
    fn checked_mul_div_down(&self, num: Self, den: Self) -> Option<Self>;

    /// Ceiling rounding. `None` when `den` is zero or the result does not
    /// fit.
    fn checked_mul_div_up(&self, num: Self, den: Self) -> Option<Self>;
}

impl MulDiv for U256 {
    fn checked_mul_div_down(&self, num: Self, den: Self) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        let wide: U512 = self.widening_mul(num);
        let quotient = wide.checked_div(U512::from(den))?;
        U256::uint_try_from(quotient).ok()
    }

    fn checked_mul_div_up(&self, num: Self, den: Self) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        let wide: U512 = self.widening_mul(num);
        let den = U512::from(den);
        let (quotient, remainder) = wide.div_rem(den);
        let quotient = if remainder.is_zero() {
            quotient
        } else {
            // Cannot overflow: the product of two 256-bit values leaves
            // ample headroom in 512 bits.
            quotient + U512::from(1u64)
        };
        U256::uint_try_from(quotient).ok()
    }
}

/// WAD-scaled multiplication, division and exponentiation.
pub trait WadExt: MulDiv {
    /// `self * rhs / WAD`, floored.
    fn checked_wad_mul_down(&self, rhs: Self) -> Option<Self>;

    /// `self * rhs / WAD`, ceiled.
    fn checked_wad_mul_up(&self, rhs: Self) -> Option<Self>;

    /// `self * WAD / rhs`, floored.
    fn checked_wad_div_down(&self, rhs: Self) -> Option<Self>;

    /// `self * WAD / rhs`, ceiled.
    fn checked_wad_div_up(&self, rhs: Self) -> Option<Self>;

    /// `self^exp` in WAD space by squaring, flooring each step.
    ///
    /// `self^0 == WAD`. `None` on overflow, which callers clamp to the bound
    /// on the move's side.
    fn checked_wad_pow(&self, exp: u64) -> Option<Self>;
}

impl WadExt for U256 {
    fn checked_wad_mul_down(&self, rhs: Self) -> Option<Self> {
        self.checked_mul_div_down(rhs, WAD)
    }

    fn checked_wad_mul_up(&self, rhs: Self) -> Option<Self> {
        self.checked_mul_div_up(rhs, WAD)
    }

    fn checked_wad_div_down(&self, rhs: Self) -> Option<Self> {
        self.checked_mul_div_down(WAD, rhs)
    }

    fn checked_wad_div_up(&self, rhs: Self) -> Option<Self> {
        self.checked_mul_div_up(WAD, rhs)
    }

    fn checked_wad_pow(&self, mut exp: u64) -> Option<Self> {
        let mut base = *self;
        let mut acc = WAD;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc.checked_wad_mul_down(base)?;
            }
            exp >>= 1;
            if exp > 0 {
                base = base.checked_wad_mul_down(base)?;
            }
        }
        Some(acc)
    }
}
