//! Protocol fee lookups and payment.

use crate::domain::eth::{ModuleId, TokenAddress, U256};

/// Fee index under which the governance controller stores the engine's
/// settlement fee percentage.
pub const SETTLEMENT_FEE_INDEX: u64 = 0;

pub trait FeeRegistry: Send + Sync {
    /// The WAD-scaled fee rate registered for `module` at `fee_index`, zero
    /// when none is registered.
    fn fee_rate(&self, module: ModuleId, fee_index: u64) -> U256;

    /// Pays `amount` of `token` out of the basket to the protocol recipient.
    fn pay_fee(
        &self,
        basket: &mut dyn super::basket::Basket,
        token: TokenAddress,
        amount: U256,
    ) -> anyhow::Result<()>;
}
