//! Bid settlement.
//!
//! A bid is settled in two phases. Staging performs every check and price
//! computation against a read-only view of the basket, so a failing bid
//! leaves no trace. Settlement then moves tokens, skims the protocol fee
//! from whatever the basket actually received and reconciles both recorded
//! positions against real balances, absorbing any distortion the transfers
//! introduced.
//!
//! Quantities round in the basket's favor at the settlement leg: the
//! settlement amount a bidder pays rounds up, the amount the basket pays out
//! rounds down.

use {
    super::{
        Error,
        RebalanceModule,
        Result,
        events::BidExecuted,
        sizing::{self, Direction},
    },
    crate::{
        domain::{
            eth::{Address, Asset, TokenAddress, U256},
            time::Timestamp,
        },
        infra::basket::Basket,
    },
    number::WadExt,
};

/// A fully staged bid, ready to settle.
struct BidDescriptor {
    bidder: Address,
    /// The auctioned component.
    asset: TokenAddress,
    curve: String,
    direction: Direction,
    price: U256,
    /// What the basket pays out.
    send: Asset,
    /// What the basket takes in.
    receive: Asset,
    send_balance_before: U256,
    receive_balance_before: U256,
    total_supply: U256,
    fee_rate: U256,
}

impl RebalanceModule {
    /// Settles a bid of `quantity` base units of `asset` against the live
    /// auction, honoring the bidder's `settlement_limit`: a maximum to pay
    /// when buying the asset from the basket, a minimum to receive when
    /// selling it in.
    pub fn bid(
        &mut self,
        basket: &mut dyn Basket,
        caller: Address,
        now: Timestamp,
        asset: TokenAddress,
        quantity: U256,
        settlement_limit: U256,
    ) -> Result<BidExecuted> {
        let descriptor = self.stage(basket, caller, now, asset, quantity, settlement_limit)?;
        self.settle(basket, descriptor)
    }

    /// Validates the bid and computes the settlement legs without mutating
    /// anything.
    fn stage(
        &self,
        basket: &dyn Basket,
        caller: Address,
        now: Timestamp,
        asset: TokenAddress,
        quantity: U256,
        settlement_limit: U256,
    ) -> Result<BidDescriptor> {
        let id = basket.id();
        let record = self.record_ref(id)?;
        if !record.permissions.is_permitted(caller) {
            return Err(Error::NotPermitted);
        }
        let auction = record.auction.as_ref().ok_or(Error::RebalanceNotInProgress)?;
        let settlement_asset = auction.settlement_asset;
        if asset == settlement_asset {
            return Err(Error::CannotBidSettlementAsset);
        }
        if !auction.assets.contains(&asset) {
            return Err(Error::AssetNotInRebalance(asset));
        }
        for token in [asset, settlement_asset] {
            if basket.has_external_position(token) {
                return Err(Error::ExternalPosition(token));
            }
        }
        if !auction.window.contains(now) {
            return Err(Error::RebalanceNotInProgress);
        }
        if quantity.is_zero() {
            return Err(Error::ZeroBidQuantity);
        }

        let params = self.params(id, asset)?;
        // Resolved on every bid so deregistering an adapter takes effect for
        // auctions already referencing it.
        let curve = self.curves.resolve(&params.curve)?;
        let inputs = self.sizing_inputs(basket, asset, record.reference_multiplier)?;
        let size = sizing::auction_size(&inputs)?;
        if quantity > size.max_quantity {
            return Err(Error::BidTooLarge {
                quantity,
                max: size.max_quantity,
            });
        }

        let elapsed = auction.window.elapsed(now);
        let price = curve.price(&params.curve_data, elapsed, auction.window.duration())?.0;

        let (send, receive) = match size.direction {
            Direction::LeavingBasket => {
                let settlement = quantity.checked_wad_mul_up(price).ok_or(Error::Overflow)?;
                if settlement > settlement_limit {
                    return Err(Error::SettlementInputExceedsMaximum {
                        required: settlement,
                        limit: settlement_limit,
                    });
                }
                let send = Asset {
                    token: asset,
                    amount: quantity,
                };
                let receive = Asset {
                    token: settlement_asset,
                    amount: settlement,
                };
                (send, receive)
            }
            Direction::EnteringBasket => {
                let settlement = quantity.checked_wad_mul_down(price).ok_or(Error::Overflow)?;
                if settlement < settlement_limit {
                    return Err(Error::SettlementOutputBelowMinimum {
                        offered: settlement,
                        limit: settlement_limit,
                    });
                }
                let send = Asset {
                    token: settlement_asset,
                    amount: settlement,
                };
                let receive = Asset {
                    token: asset,
                    amount: quantity,
                };
                (send, receive)
            }
        };

        Ok(BidDescriptor {
            bidder: caller,
            asset,
            curve: params.curve.clone(),
            direction: size.direction,
            price,
            send,
            receive,
            send_balance_before: basket.balance_of(send.token),
            receive_balance_before: basket.balance_of(receive.token),
            total_supply: basket.total_supply(),
            fee_rate: inputs.fee_rate,
        })
    }

    /// Moves tokens, skims the fee and reconciles recorded positions.
    ///
    /// The engine's own store is never touched here, so a collaborator
    /// failure mid-settlement leaves the engine consistent. Token balances
    /// already moved by an earlier leg are the collaborator's to roll back:
    /// the basket executes the whole call as one transactional unit, and a
    /// propagated error aborts that unit.
    fn settle(&self, basket: &mut dyn Basket, bid: BidDescriptor) -> Result<BidExecuted> {
        // Take receipt of the bidder's leg before paying out the basket's.
        basket.transfer_in(bid.receive.token, bid.bidder, bid.receive.amount)?;
        basket.transfer_out(bid.send.token, bid.bidder, bid.send.amount)?;

        // The fee applies to what actually arrived, which transfer mechanics
        // may have distorted from the nominal amount.
        let received = basket
            .balance_of(bid.receive.token)
            .checked_sub(bid.receive_balance_before)
            .ok_or(Error::Overflow)?;
        let fee = received
            .checked_wad_mul_down(bid.fee_rate)
            .ok_or(Error::Overflow)?;
        if !fee.is_zero() {
            self.fees.pay_fee(basket, bid.receive.token, fee)?;
        }

        let receive_position = basket.reconcile_default_position(
            bid.receive.token,
            bid.total_supply,
            bid.receive_balance_before,
        )?;
        basket.reconcile_default_position(
            bid.send.token,
            bid.total_supply,
            bid.send_balance_before,
        )?;

        let received_by_basket = Asset {
            token: bid.receive.token,
            amount: received.saturating_sub(fee),
        };
        tracing::info!(
            basket = ?basket.id(),
            asset = ?bid.asset,
            bidder = ?bid.bidder,
            direction = ?bid.direction,
            price = %bid.price,
            sent = %bid.send.amount,
            received = %received_by_basket.amount,
            fee = %fee,
            new_unit = %receive_position.new_unit,
            "bid settled"
        );
        Ok(BidExecuted {
            basket: basket.id(),
            asset: bid.asset,
            bidder: bid.bidder,
            curve: bid.curve,
            direction: bid.direction,
            price: bid.price,
            sent_by_basket: bid.send,
            received_by_basket,
            protocol_fee: fee,
            total_supply: bid.total_supply,
        })
    }
}
