use crate::domain::{
    curve,
    eth::{TokenAddress, U256},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("caller is not the basket manager")]
    NotManager,
    #[error("caller is not an allowed bidder")]
    NotPermitted,
    #[error("caller is not the basket itself")]
    NotBasket,
    #[error("basket has not been initialized with this engine")]
    NotInitialized,
    #[error("basket is already initialized with this engine")]
    AlreadyInitialized,
    #[error("no rebalance is in progress")]
    RebalanceNotInProgress,
    #[error("asset {0:?} is already at its target")]
    TargetAlreadyMet(TokenAddress),
    #[error("not every auction target has been met")]
    TargetsNotMet,
    #[error("asset {0:?} is not part of the current rebalance")]
    AssetNotInRebalance(TokenAddress),
    #[error("asset {0:?} has an external position")]
    ExternalPosition(TokenAddress),
    #[error("asset {0:?} has a negative position unit")]
    NegativePositionUnit(TokenAddress),
    #[error("the settlement asset cannot itself be auctioned")]
    CannotBidSettlementAsset,
    #[error("bid quantity must be nonzero")]
    ZeroBidQuantity,
    #[error("bid quantity {quantity} exceeds the auction maximum {max}")]
    BidTooLarge { quantity: U256, max: U256 },
    #[error("settlement required {required} exceeds the bidder's maximum {limit}")]
    SettlementInputExceedsMaximum { required: U256, limit: U256 },
    #[error("settlement offered {offered} is below the bidder's minimum {limit}")]
    SettlementOutputBelowMinimum { offered: U256, limit: U256 },
    #[error("parameter lists have mismatched lengths")]
    LengthMismatch,
    #[error("missing auction parameters for an existing component")]
    MissingOldAssetParams,
    #[error("asset {0:?} appears more than once")]
    DuplicateAsset(TokenAddress),
    #[error("asset {0:?} was declared without a price curve")]
    MissingCurve(TokenAddress),
    #[error("settlement asset is not part of the rebalance")]
    InvalidSettlementAsset,
    #[error("reference position multiplier must be nonzero")]
    InvalidReferenceMultiplier,
    #[error("raise target percentage must be nonzero")]
    InvalidRaiseTargetPercentage,
    #[error("no price curve registered under {0:?}")]
    UnknownCurve(String),
    #[error(transparent)]
    Curve(#[from] curve::Error),
    #[error("arithmetic overflow")]
    Overflow,
    #[error("basket interaction failed: {0:?}")]
    Basket(#[from] anyhow::Error),
}
