//! Events returned by state-changing operations, mirroring what an on-chain
//! integration would log.

use crate::domain::{
    eth::{Address, Asset, BasketId, TokenAddress, U256},
    rebalance::sizing::Direction,
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceStarted {
    pub basket: BasketId,
    pub settlement_asset: TokenAddress,
    pub assets: Vec<TokenAddress>,
    pub duration: Duration,
    pub reference_multiplier: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidExecuted {
    pub basket: BasketId,
    /// The auctioned component, regardless of direction.
    pub asset: TokenAddress,
    pub bidder: Address,
    pub curve: String,
    pub direction: Direction,
    pub price: U256,
    pub sent_by_basket: Asset,
    /// What the basket kept, net of the protocol fee.
    pub received_by_basket: Asset,
    pub protocol_fee: U256,
    pub total_supply: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetsRaised {
    pub basket: BasketId,
    pub reference_multiplier: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidderStatusUpdated {
    pub basket: BasketId,
    pub bidder: Address,
    pub allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyoneBidUpdated {
    pub basket: BasketId,
    pub anyone_bid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaiseTargetPercentageUpdated {
    pub basket: BasketId,
    pub raise_target_percentage: U256,
}
