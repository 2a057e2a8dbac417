pub use alloy_primitives::{Address, I256, U256};

/// An ERC-20 token address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAddress(pub Address);

impl From<Address> for TokenAddress {
    fn from(inner: Address) -> Self {
        Self(inner)
    }
}

/// The address identifying a basket token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BasketId(pub Address);

impl From<Address> for BasketId {
    fn from(inner: Address) -> Self {
        Self(inner)
    }
}

/// The address under which the engine itself is registered with the
/// governance controller, used to look up its fee percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub Address);

impl From<Address> for ModuleId {
    fn from(inner: Address) -> Self {
        Self(inner)
    }
}

/// A particular amount of a particular token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub token: TokenAddress,
    pub amount: U256,
}
