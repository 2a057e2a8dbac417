//! The basket seam.
//!
//! The engine only ever reads and mutates a basket through this trait. Share
//! accounting, position bookkeeping and actual token custody live on the
//! other side; the engine drives them and trusts reported balances over
//! nominal transfer amounts.

use crate::domain::eth::{Address, BasketId, I256, TokenAddress, U256};

/// A default position after reconciliation against the real token balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciledPosition {
    pub balance: U256,
    pub previous_unit: I256,
    pub new_unit: I256,
}

#[cfg_attr(test, mockall::automock)]
pub trait Basket {
    fn id(&self) -> BasketId;

    fn manager(&self) -> Address;

    fn total_supply(&self) -> U256;

    /// The inflation-adjusted multiplier applied to all position units, WAD
    /// scaled. Decays as streaming fees accrue.
    fn position_multiplier(&self) -> U256;

    fn components(&self) -> Vec<TokenAddress>;

    /// The recorded default (directly held) position unit for `token`, WAD
    /// scaled base units per share. Zero for tokens the basket never held.
    fn default_position_real_unit(&self, token: TokenAddress) -> I256;

    /// Whether `token` carries positions managed outside the basket's direct
    /// custody. Such assets cannot be auctioned.
    fn has_external_position(&self, token: TokenAddress) -> bool;

    fn balance_of(&self, token: TokenAddress) -> U256;

    fn transfer_in(&mut self, token: TokenAddress, from: Address, amount: U256)
    -> anyhow::Result<()>;

    fn transfer_out(&mut self, token: TokenAddress, to: Address, amount: U256)
    -> anyhow::Result<()>;

    /// Recomputes the default position unit for `token` from its current
    /// balance and `total_supply`, returning both the old and new units.
    fn reconcile_default_position(
        &mut self,
        token: TokenAddress,
        total_supply: U256,
        prior_balance: U256,
    ) -> anyhow::Result<ReconciledPosition>;
}
