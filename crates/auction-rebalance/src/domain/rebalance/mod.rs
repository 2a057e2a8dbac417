//! The rebalance engine.
//!
//! One engine instance serves many baskets. A basket's manager first
//! initializes the basket with the engine, seeding per-asset auction
//! parameters from its current holdings, then starts timed rebalances that
//! open one auction per listed asset against a settlement asset. Allowed
//! bidders settle those auctions through [`RebalanceModule::bid`] until every
//! target is met or the window expires.

pub mod bid;
pub mod error;
pub mod events;
pub mod permission;
pub mod sizing;

pub use self::error::{Error, Result};
use {
    self::{
        events::{
            AnyoneBidUpdated,
            BidderStatusUpdated,
            RaiseTargetPercentageUpdated,
            RebalanceStarted,
            TargetsRaised,
        },
        permission::BidderPermissions,
        sizing::{AuctionSize, SizingInputs},
    },
    crate::{
        domain::{
            curve::CurveData,
            eth::{Address, BasketId, ModuleId, TokenAddress, U256},
            time::{Duration, RebalanceWindow, Timestamp},
        },
        infra::{
            basket::Basket,
            curves::CurveRegistry,
            fee::{FeeRegistry, SETTLEMENT_FEE_INDEX},
        },
    },
    itertools::Itertools,
    number::{WAD, WadExt},
    std::{
        collections::HashMap,
        sync::Arc,
    },
};

/// Per-asset auction settings: the unit allocation to converge on and the
/// price curve quoting it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuctionParams {
    /// Target position unit, WAD scaled, recorded at the rebalance's
    /// reference position multiplier.
    pub target_unit: U256,
    /// Registry name of the price curve. Empty means "keep the stored
    /// settings" when passed for an existing component.
    pub curve: String,
    pub curve_data: CurveData,
}

impl AuctionParams {
    /// Marker value leaving an existing component's stored settings intact.
    pub fn unchanged() -> Self {
        Self::default()
    }

    fn is_noop(&self) -> bool {
        self.curve.is_empty()
    }
}

/// A live auction batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auction {
    pub settlement_asset: TokenAddress,
    pub window: RebalanceWindow,
    /// Every asset with an open auction, new assets first.
    pub assets: Vec<TokenAddress>,
}

/// Engine state for one initialized basket that survives across rebalances.
#[derive(Debug, Clone)]
pub struct RebalanceRecord {
    /// Position multiplier at which the current target units are recorded.
    pub reference_multiplier: U256,
    /// WAD-scaled increment applied to all targets by `raise_asset_targets`.
    pub raise_target_percentage: U256,
    pub permissions: BidderPermissions,
    pub auction: Option<Auction>,
}

#[derive(Debug, Clone, Default)]
struct BasketState {
    /// Auction parameters per asset. Entries persist across rebalances and
    /// even across removal so a re-added basket keeps its curve settings.
    params: HashMap<TokenAddress, AuctionParams>,
    record: Option<RebalanceRecord>,
}

pub struct RebalanceModule {
    module: ModuleId,
    fees: Arc<dyn FeeRegistry>,
    curves: Arc<dyn CurveRegistry>,
    baskets: HashMap<BasketId, BasketState>,
}

impl RebalanceModule {
    pub fn new(
        module: ModuleId,
        fees: Arc<dyn FeeRegistry>,
        curves: Arc<dyn CurveRegistry>,
    ) -> Self {
        Self {
            module,
            fees,
            curves,
            baskets: HashMap::new(),
        }
    }

    /// Registers a basket with the engine. Only the basket's manager may
    /// call, and only once per registration. Seeds each component's target
    /// unit from its current holding so that a rebalance started without
    /// touching an asset leaves it alone.
    pub fn initialize(&mut self, basket: &dyn Basket, caller: Address) -> Result<()> {
        ensure_manager(basket, caller)?;
        let state = self.baskets.entry(basket.id()).or_default();
        if state.record.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        let reference_multiplier = basket.position_multiplier();
        if reference_multiplier.is_zero() {
            return Err(Error::InvalidReferenceMultiplier);
        }
        let components = basket.components();
        let units = components
            .iter()
            .map(|&component| Ok((component, position_unit(basket, component)?)))
            .collect::<Result<Vec<_>>>()?;
        for (component, unit) in units {
            state.params.entry(component).or_default().target_unit = unit;
        }
        state.record = Some(RebalanceRecord {
            reference_multiplier,
            raise_target_percentage: U256::ZERO,
            permissions: BidderPermissions::default(),
            auction: None,
        });
        tracing::info!(basket = ?basket.id(), "basket initialized");
        Ok(())
    }

    /// Opens a timed auction batch moving the basket toward new targets.
    ///
    /// `new_assets` and `new_asset_params` describe assets entering the
    /// basket; `old_asset_params` must carry one entry per current component,
    /// in component order, where an entry with an empty curve name keeps that
    /// component's stored settings. The settlement asset must be among the
    /// combined assets. Starting a rebalance replaces any live one.
    #[allow(clippy::too_many_arguments)]
    pub fn start_rebalance(
        &mut self,
        basket: &dyn Basket,
        caller: Address,
        now: Timestamp,
        settlement_asset: TokenAddress,
        new_assets: &[TokenAddress],
        new_asset_params: &[AuctionParams],
        old_asset_params: &[AuctionParams],
        duration: Duration,
        reference_multiplier: U256,
    ) -> Result<RebalanceStarted> {
        ensure_manager(basket, caller)?;
        let id = basket.id();
        self.record_ref(id)?;
        if reference_multiplier.is_zero() {
            return Err(Error::InvalidReferenceMultiplier);
        }
        if new_assets.len() != new_asset_params.len() {
            return Err(Error::LengthMismatch);
        }
        // The "keep stored settings" marker only makes sense for existing
        // components; a brand-new asset has no settings to keep.
        for (&asset, params) in new_assets.iter().zip(new_asset_params) {
            if params.is_noop() {
                return Err(Error::MissingCurve(asset));
            }
        }
        let components = basket.components();
        if old_asset_params.len() != components.len() {
            return Err(Error::MissingOldAssetParams);
        }
        let assets: Vec<_> = new_assets.iter().chain(&components).copied().collect();
        if let Some(duplicate) = assets.iter().duplicates().next() {
            return Err(Error::DuplicateAsset(*duplicate));
        }
        for &asset in &assets {
            if basket.has_external_position(asset) {
                return Err(Error::ExternalPosition(asset));
            }
        }
        if !assets.contains(&settlement_asset) {
            return Err(Error::InvalidSettlementAsset);
        }

        // All inputs validated; commit.
        let state = self.baskets.entry(id).or_default();
        for (&asset, params) in new_assets.iter().zip(new_asset_params) {
            state.params.insert(asset, params.clone());
        }
        for (&component, params) in components.iter().zip(old_asset_params) {
            if !params.is_noop() {
                state.params.insert(component, params.clone());
            }
        }
        let record = state.record.as_mut().ok_or(Error::NotInitialized)?;
        record.reference_multiplier = reference_multiplier;
        record.auction = Some(Auction {
            settlement_asset,
            window: RebalanceWindow::new(now, duration),
            assets: assets.clone(),
        });
        tracing::info!(
            basket = ?id,
            ?settlement_asset,
            assets = assets.len(),
            duration = duration.as_secs(),
            "rebalance started"
        );
        Ok(RebalanceStarted {
            basket: id,
            settlement_asset,
            assets,
            duration,
            reference_multiplier,
        })
    }

    /// Uniformly raises every target by the configured percentage once all
    /// auction targets are met but unspent settlement remains.
    ///
    /// Raising is expressed by shrinking the reference multiplier: effective
    /// targets scale by `live / reference`, so dividing the reference by
    /// `1 + pct` lifts them all without rewriting stored units.
    pub fn raise_asset_targets(
        &mut self,
        basket: &dyn Basket,
        caller: Address,
    ) -> Result<TargetsRaised> {
        let id = basket.id();
        let record = self.record_ref(id)?;
        if !record.permissions.is_permitted(caller) {
            return Err(Error::NotPermitted);
        }
        let auction = record.auction.as_ref().ok_or(Error::RebalanceNotInProgress)?;
        let percentage = record.raise_target_percentage;
        if percentage.is_zero() {
            return Err(Error::InvalidRaiseTargetPercentage);
        }
        let settlement_asset = auction.settlement_asset;
        let assets = auction.assets.clone();
        let reference_multiplier = record.reference_multiplier;

        for asset in assets {
            let inputs = self.sizing_inputs(basket, asset, reference_multiplier)?;
            let satisfied = if asset == settlement_asset {
                // Raising only makes sense while surplus settlement remains.
                inputs.exceeds_target()?
            } else {
                inputs.target_met()?
            };
            if !satisfied {
                return Err(Error::TargetsNotMet);
            }
        }

        let raised = reference_multiplier
            .checked_wad_div_down(WAD.checked_add(percentage).ok_or(Error::Overflow)?)
            .filter(|multiplier| !multiplier.is_zero())
            .ok_or(Error::Overflow)?;
        let record = self.record_mut(id)?;
        record.reference_multiplier = raised;
        tracing::info!(basket = ?id, reference_multiplier = %raised, "targets raised");
        Ok(TargetsRaised {
            basket: id,
            reference_multiplier: raised,
        })
    }

    pub fn set_raise_target_percentage(
        &mut self,
        basket: &dyn Basket,
        caller: Address,
        percentage: U256,
    ) -> Result<RaiseTargetPercentageUpdated> {
        ensure_manager(basket, caller)?;
        if percentage.is_zero() {
            return Err(Error::InvalidRaiseTargetPercentage);
        }
        let id = basket.id();
        self.record_mut(id)?.raise_target_percentage = percentage;
        Ok(RaiseTargetPercentageUpdated {
            basket: id,
            raise_target_percentage: percentage,
        })
    }

    pub fn set_bidder_status(
        &mut self,
        basket: &dyn Basket,
        caller: Address,
        bidders: &[Address],
        statuses: &[bool],
    ) -> Result<Vec<BidderStatusUpdated>> {
        ensure_manager(basket, caller)?;
        if bidders.len() != statuses.len() {
            return Err(Error::LengthMismatch);
        }
        let id = basket.id();
        let record = self.record_mut(id)?;
        Ok(bidders
            .iter()
            .zip(statuses)
            .map(|(&bidder, &allowed)| {
                record.permissions.set_status(bidder, allowed);
                BidderStatusUpdated {
                    basket: id,
                    bidder,
                    allowed,
                }
            })
            .collect())
    }

    pub fn set_anyone_bid(
        &mut self,
        basket: &dyn Basket,
        caller: Address,
        anyone_bid: bool,
    ) -> Result<AnyoneBidUpdated> {
        ensure_manager(basket, caller)?;
        let id = basket.id();
        self.record_mut(id)?.permissions.set_anyone_bid(anyone_bid);
        Ok(AnyoneBidUpdated {
            basket: id,
            anyone_bid,
        })
    }

    /// Deregisters a basket. Only the basket itself may call, when the
    /// engine is removed from its module set. Auction parameters survive so
    /// a later re-initialization restores curve settings; permissions do
    /// not.
    pub fn remove(&mut self, basket: &dyn Basket, caller: Address) -> Result<Vec<Address>> {
        if caller != basket.id().0 {
            return Err(Error::NotBasket);
        }
        let id = basket.id();
        let state = self.baskets.get_mut(&id).ok_or(Error::NotInitialized)?;
        let mut record = state.record.take().ok_or(Error::NotInitialized)?;
        let revoked = record.permissions.revoke_all();
        tracing::info!(basket = ?id, revoked = revoked.len(), "basket removed");
        Ok(revoked)
    }

    pub fn is_allowed_bidder(&self, basket: BasketId, bidder: Address) -> Result<bool> {
        Ok(self.record_ref(basket)?.permissions.is_permitted(bidder))
    }

    pub fn allowed_bidders(&self, basket: BasketId) -> Result<&[Address]> {
        Ok(self.record_ref(basket)?.permissions.allowed_bidders())
    }

    /// The basket's engine record, if it is initialized.
    pub fn rebalance(&self, basket: BasketId) -> Option<&RebalanceRecord> {
        self.baskets.get(&basket)?.record.as_ref()
    }

    /// The stored auction parameters for one asset.
    pub fn execution_params(
        &self,
        basket: BasketId,
        asset: TokenAddress,
    ) -> Result<&AuctionParams> {
        self.baskets
            .get(&basket)
            .and_then(|state| state.params.get(&asset))
            .ok_or(Error::AssetNotInRebalance(asset))
    }

    /// Sizes the live auction for `asset`.
    pub fn auction_size(&self, basket: &dyn Basket, asset: TokenAddress) -> Result<AuctionSize> {
        let record = self.record_ref(basket.id())?;
        let auction = record.auction.as_ref().ok_or(Error::RebalanceNotInProgress)?;
        if !auction.assets.contains(&asset) {
            return Err(Error::AssetNotInRebalance(asset));
        }
        let inputs = self.sizing_inputs(basket, asset, record.reference_multiplier)?;
        sizing::auction_size(&inputs)
    }

    fn record_ref(&self, basket: BasketId) -> Result<&RebalanceRecord> {
        self.baskets
            .get(&basket)
            .and_then(|state| state.record.as_ref())
            .ok_or(Error::NotInitialized)
    }

    fn record_mut(&mut self, basket: BasketId) -> Result<&mut RebalanceRecord> {
        self.baskets
            .get_mut(&basket)
            .and_then(|state| state.record.as_mut())
            .ok_or(Error::NotInitialized)
    }

    fn params(&self, basket: BasketId, asset: TokenAddress) -> Result<&AuctionParams> {
        self.baskets
            .get(&basket)
            .and_then(|state| state.params.get(&asset))
            .ok_or(Error::AssetNotInRebalance(asset))
    }

    fn sizing_inputs(
        &self,
        basket: &dyn Basket,
        asset: TokenAddress,
        reference_multiplier: U256,
    ) -> Result<SizingInputs> {
        Ok(SizingInputs {
            asset,
            current_unit: position_unit(basket, asset)?,
            target_unit: self.params(basket.id(), asset)?.target_unit,
            live_multiplier: basket.position_multiplier(),
            reference_multiplier,
            total_supply: basket.total_supply(),
            fee_rate: self.fee_rate(),
        })
    }

    fn fee_rate(&self) -> U256 {
        self.fees.fee_rate(self.module, SETTLEMENT_FEE_INDEX)
    }
}

fn ensure_manager(basket: &dyn Basket, caller: Address) -> Result<()> {
    if caller == basket.manager() {
        Ok(())
    } else {
        Err(Error::NotManager)
    }
}

/// The basket's recorded default position unit for `token`, which auctions
/// require to be non-negative.
fn position_unit(basket: &dyn Basket, token: TokenAddress) -> Result<U256> {
    let unit = basket.default_position_real_unit(token);
    if unit.is_negative() {
        return Err(Error::NegativePositionUnit(token));
    }
    Ok(unit.unsigned_abs())
}
