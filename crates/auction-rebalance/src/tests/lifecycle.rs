//! Registration, rebalance lifecycle and permission management.

use {
    super::fixtures::{BASKET, BIDDER, FakeBasket, MANAGER, addr, engine, token},
    crate::{
        domain::{
            curve::constant::ConstantParams,
            eth::{BasketId, I256, U256},
            rebalance::{AuctionParams, Error, RebalanceModule, sizing::Direction},
            time::{Duration, Timestamp},
        },
        infra::{basket::MockBasket, curves},
    },
    number::{WAD, WadUnit},
};

const ASSET: u8 = 0xaa;
const SETTLEMENT: u8 = 0x55;

fn basket() -> FakeBasket {
    FakeBasket::new()
        .with_component(token(ASSET), 10_000_u64.wad())
        .with_component(token(SETTLEMENT), U256::ZERO)
        .fund(token(SETTLEMENT), addr(BIDDER), 10_u64.wad())
}

fn sell_params() -> Vec<AuctionParams> {
    vec![
        AuctionParams {
            target_unit: 8000_u64.wad(),
            curve: curves::CONSTANT.to_owned(),
            curve_data: ConstantParams {
                price: 0.0005.wad(),
            }
            .encode(),
        },
        AuctionParams::unchanged(),
    ]
}

fn start(engine: &mut RebalanceModule, basket: &FakeBasket, old_params: &[AuctionParams]) {
    engine.initialize(basket, addr(MANAGER)).unwrap();
    engine
        .set_bidder_status(basket, addr(MANAGER), &[addr(BIDDER)], &[true])
        .unwrap();
    engine
        .start_rebalance(
            basket,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[],
            &[],
            old_params,
            Duration::hours(24),
            WAD,
        )
        .unwrap();
}

#[test]
fn initialize_seeds_targets_from_current_holdings() {
    let basket = basket();
    let mut engine = engine(U256::ZERO);
    engine.initialize(&basket, addr(MANAGER)).unwrap();

    let params = engine
        .execution_params(BasketId(addr(BASKET)), token(ASSET))
        .unwrap();
    assert_eq!(params.target_unit, 10_000_u64.wad());
    assert!(params.curve.is_empty());

    assert!(matches!(
        engine.initialize(&basket, addr(MANAGER)),
        Err(Error::AlreadyInitialized),
    ));
}

#[test]
fn initialize_requires_the_manager() {
    let mut mock = MockBasket::new();
    mock.expect_manager().return_const(addr(MANAGER));
    let mut engine = engine(U256::ZERO);
    assert!(matches!(
        engine.initialize(&mock, addr(0x99)),
        Err(Error::NotManager),
    ));
}

#[test]
fn initialize_rejects_negative_position_units() {
    let basket = basket().with_unit(token(ASSET), I256::MINUS_ONE);
    let mut engine = engine(U256::ZERO);
    assert!(matches!(
        engine.initialize(&basket, addr(MANAGER)),
        Err(Error::NegativePositionUnit(asset)) if asset == token(ASSET),
    ));
}

#[test]
fn initialize_rejects_zero_multiplier() {
    let basket = basket().with_multiplier(U256::ZERO);
    let mut engine = engine(U256::ZERO);
    assert!(matches!(
        engine.initialize(&basket, addr(MANAGER)),
        Err(Error::InvalidReferenceMultiplier),
    ));
}

#[test]
fn start_rebalance_validates_its_inputs() {
    let basket = basket();
    let mut engine = engine(U256::ZERO);

    // Not initialized yet.
    assert!(matches!(
        engine.start_rebalance(
            &basket,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[],
            &[],
            &sell_params(),
            Duration::hours(24),
            WAD,
        ),
        Err(Error::NotInitialized),
    ));

    engine.initialize(&basket, addr(MANAGER)).unwrap();

    // New asset lists of different lengths.
    assert!(matches!(
        engine.start_rebalance(
            &basket,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[token(0xcc)],
            &[],
            &sell_params(),
            Duration::hours(24),
            WAD,
        ),
        Err(Error::LengthMismatch),
    ));

    // One old-asset entry per component, exactly.
    assert!(matches!(
        engine.start_rebalance(
            &basket,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[],
            &[],
            &sell_params()[..1],
            Duration::hours(24),
            WAD,
        ),
        Err(Error::MissingOldAssetParams),
    ));

    // A new asset declared with the keep-stored-settings marker.
    assert!(matches!(
        engine.start_rebalance(
            &basket,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[token(0xcc)],
            &[AuctionParams::unchanged()],
            &sell_params(),
            Duration::hours(24),
            WAD,
        ),
        Err(Error::MissingCurve(asset)) if asset == token(0xcc),
    ));

    // A new asset that is already a component.
    assert!(matches!(
        engine.start_rebalance(
            &basket,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[token(ASSET)],
            &sell_params()[..1],
            &sell_params(),
            Duration::hours(24),
            WAD,
        ),
        Err(Error::DuplicateAsset(asset)) if asset == token(ASSET),
    ));

    // Settlement asset outside the combined asset set.
    assert!(matches!(
        engine.start_rebalance(
            &basket,
            addr(MANAGER),
            Timestamp(0),
            token(0xdd),
            &[],
            &[],
            &sell_params(),
            Duration::hours(24),
            WAD,
        ),
        Err(Error::InvalidSettlementAsset),
    ));

    // Zero reference multiplier.
    assert!(matches!(
        engine.start_rebalance(
            &basket,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[],
            &[],
            &sell_params(),
            Duration::hours(24),
            U256::ZERO,
        ),
        Err(Error::InvalidReferenceMultiplier),
    ));

    // Assets with external positions cannot be auctioned.
    let tainted = basket.with_external_position(token(ASSET));
    assert!(matches!(
        engine.start_rebalance(
            &tainted,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[],
            &[],
            &sell_params(),
            Duration::hours(24),
            WAD,
        ),
        Err(Error::ExternalPosition(asset)) if asset == token(ASSET),
    ));
}

#[test]
fn noop_old_params_keep_stored_settings() {
    let basket = basket();
    let mut engine = engine(U256::ZERO);
    start(&mut engine, &basket, &sell_params());

    // A second rebalance passing unchanged params for the asset keeps its
    // stored curve and target.
    engine
        .start_rebalance(
            &basket,
            addr(MANAGER),
            Timestamp(0),
            token(SETTLEMENT),
            &[],
            &[],
            &[AuctionParams::unchanged(), AuctionParams::unchanged()],
            Duration::hours(24),
            WAD,
        )
        .unwrap();
    let params = engine
        .execution_params(BasketId(addr(BASKET)), token(ASSET))
        .unwrap();
    assert_eq!(params.curve, curves::CONSTANT);
    assert_eq!(params.target_unit, 8000_u64.wad());
}

#[test]
fn raising_targets_shrinks_the_reference_multiplier() {
    let mut basket = basket();
    let mut engine = engine(U256::ZERO);
    start(&mut engine, &basket, &sell_params());
    engine
        .set_raise_target_percentage(&basket, addr(MANAGER), 0.0025.wad())
        .unwrap();

    // Targets are not all met yet.
    assert!(matches!(
        engine.raise_asset_targets(&basket, addr(BIDDER)),
        Err(Error::TargetsNotMet),
    ));

    // Settle the full auction, leaving surplus settlement in the basket.
    engine
        .bid(
            &mut basket,
            addr(BIDDER),
            Timestamp(3600),
            token(ASSET),
            2000_u64.wad(),
            1_u64.wad(),
        )
        .unwrap();

    let raised = engine.raise_asset_targets(&basket, addr(BIDDER)).unwrap();
    assert_eq!(
        raised.reference_multiplier,
        U256::from(997_506_234_413_965_087_u64),
    );

    // The asset is below its lifted target again, so the auction reopens in
    // the buy direction.
    let size = engine.auction_size(&basket, token(ASSET)).unwrap();
    assert_eq!(size.direction, Direction::EnteringBasket);
}

#[test]
fn raising_targets_requires_configuration_and_permission() {
    let mut basket = basket();
    let mut engine = engine(U256::ZERO);
    start(&mut engine, &basket, &sell_params());

    // No raise percentage configured.
    engine
        .bid(
            &mut basket,
            addr(BIDDER),
            Timestamp(3600),
            token(ASSET),
            2000_u64.wad(),
            1_u64.wad(),
        )
        .unwrap();
    assert!(matches!(
        engine.raise_asset_targets(&basket, addr(BIDDER)),
        Err(Error::InvalidRaiseTargetPercentage),
    ));
    assert!(matches!(
        engine.set_raise_target_percentage(&basket, addr(MANAGER), U256::ZERO),
        Err(Error::InvalidRaiseTargetPercentage),
    ));

    engine
        .set_raise_target_percentage(&basket, addr(MANAGER), 0.0025.wad())
        .unwrap();
    assert!(matches!(
        engine.raise_asset_targets(&basket, addr(0x99)),
        Err(Error::NotPermitted),
    ));
}

#[test]
fn raising_targets_requires_a_live_rebalance() {
    let basket = basket();
    let mut engine = engine(U256::ZERO);
    engine.initialize(&basket, addr(MANAGER)).unwrap();
    engine
        .set_raise_target_percentage(&basket, addr(MANAGER), 0.0025.wad())
        .unwrap();
    engine
        .set_anyone_bid(&basket, addr(MANAGER), true)
        .unwrap();
    assert!(matches!(
        engine.raise_asset_targets(&basket, addr(BIDDER)),
        Err(Error::RebalanceNotInProgress),
    ));
}

#[test]
fn bidder_permissions_are_managed_per_basket() {
    let basket = basket();
    let mut engine = engine(U256::ZERO);
    engine.initialize(&basket, addr(MANAGER)).unwrap();
    let id = BasketId(addr(BASKET));

    assert!(matches!(
        engine.set_bidder_status(&basket, addr(MANAGER), &[addr(1), addr(2)], &[true]),
        Err(Error::LengthMismatch),
    ));

    let events = engine
        .set_bidder_status(
            &basket,
            addr(MANAGER),
            &[addr(1), addr(2), addr(1)],
            &[true, true, false],
        )
        .unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(engine.allowed_bidders(id).unwrap(), [addr(2)]);
    assert!(!engine.is_allowed_bidder(id, addr(1)).unwrap());
    assert!(engine.is_allowed_bidder(id, addr(2)).unwrap());

    engine.set_anyone_bid(&basket, addr(MANAGER), true).unwrap();
    assert!(engine.is_allowed_bidder(id, addr(1)).unwrap());
}

#[test]
fn remove_requires_the_basket_itself() {
    let mut mock = MockBasket::new();
    mock.expect_id().return_const(BasketId(addr(BASKET)));
    let mut engine = engine(U256::ZERO);
    assert!(matches!(
        engine.remove(&mock, addr(MANAGER)),
        Err(Error::NotBasket),
    ));
}

#[test]
fn remove_revokes_permissions_but_keeps_params() {
    let mut basket = basket();
    let mut engine = engine(U256::ZERO);
    start(&mut engine, &basket, &sell_params());
    let id = BasketId(addr(BASKET));

    let revoked = engine.remove(&basket, addr(BASKET)).unwrap();
    assert_eq!(revoked, vec![addr(BIDDER)]);
    assert!(engine.rebalance(id).is_none());

    // All operations now fail until re-initialization.
    assert!(matches!(
        engine.bid(
            &mut basket,
            addr(BIDDER),
            Timestamp(3600),
            token(ASSET),
            1_u64.wad(),
            1_u64.wad(),
        ),
        Err(Error::NotInitialized),
    ));

    // Re-initializing reseeds targets from holdings but keeps the stored
    // curve configuration.
    engine.initialize(&basket, addr(MANAGER)).unwrap();
    let params = engine.execution_params(id, token(ASSET)).unwrap();
    assert_eq!(params.curve, curves::CONSTANT);
    assert_eq!(params.target_unit, 10_000_u64.wad());
    assert!(!engine.is_allowed_bidder(id, addr(BIDDER)).unwrap());
}
