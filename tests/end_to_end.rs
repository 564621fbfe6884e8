//! End-to-end scenarios: indexer, selection and fills on the simulation host.

use rust_decimal::Decimal;

use intent_market::config::ExecutorConfig;
use intent_market::engine::{Clock, MatchExecutor};
use intent_market::error::{CallError, MatchError, RegistryError};
use intent_market::indexer::{Indexer, LocalIndexer};
use intent_market::sim::{RuleCounterparty, SimHost};
use intent_market::types::{Address, Locator, TRANSFER_KIND};

// ============================================================================
// FIXTURES
// ============================================================================

const INDEXER: u64 = 0x1d;
const OWNER: u64 = 0x0a;
const EXECUTOR: u64 = 0xe0;
const SETTLEMENT: u64 = 0x5e;
const TAKER: u64 = 0xca;

const ALICE: u64 = 0xa1;
const BOB: u64 = 0xb0;
const CAROL: u64 = 0xc0;

const WETH: u64 = 10;
const DAI: u64 = 11;

const NOW: u64 = 1_000;

fn addr(v: u64) -> Address {
    Address::from_low_u64(v)
}

fn loc(v: u64) -> Locator {
    Locator::from_address(addr(v))
}

struct World {
    indexer: LocalIndexer,
    host: SimHost,
}

impl World {
    fn new() -> Self {
        let mut indexer = LocalIndexer::new(addr(INDEXER), addr(OWNER));
        indexer.create_market(addr(WETH), addr(DAI)).unwrap();

        let mut host = SimHost::new(addr(SETTLEMENT));
        host.set_now(NOW);
        host.mint(addr(WETH), addr(TAKER), 1_000_000);
        host.set_allowance(addr(WETH), addr(TAKER), addr(EXECUTOR), u128::MAX);

        Self { indexer, host }
    }

    /// Stake an intent and register a maker quoting `price` WETH per DAI
    fn maker(&mut self, id: u64, stake: u128, price: Decimal, max_dai: u128) {
        self.indexer
            .set_intent(addr(id), addr(WETH), addr(DAI), stake, u64::MAX, loc(id))
            .unwrap();
        self.host.add_counterparty(
            loc(id),
            RuleCounterparty::new(addr(id), addr(id)).with_rule(addr(WETH), addr(DAI), max_dai, price),
        );
        self.host.mint(addr(DAI), addr(id), 100_000);
        self.host
            .set_allowance(addr(DAI), addr(id), addr(SETTLEMENT), u128::MAX);
    }

    fn balance(&self, token: u64, owner: u64) -> u128 {
        self.host.balance_of(addr(token), addr(owner))
    }
}

/// Borrows only the indexer so the host stays mutable
fn new_executor(indexer: &LocalIndexer) -> MatchExecutor<&LocalIndexer> {
    MatchExecutor::new(addr(EXECUTOR), addr(SETTLEMENT), indexer, ExecutorConfig::default())
}

/// Alice (2000) quotes 3, Bob (500) quotes 2, Carol (1500) quotes 4 WETH per DAI
fn three_makers() -> World {
    let mut world = World::new();
    world.maker(ALICE, 2_000, Decimal::from(3), 10_000);
    world.maker(BOB, 500, Decimal::from(2), 10_000);
    world.maker(CAROL, 1_500, Decimal::from(4), 10_000);
    world
}

// ============================================================================
// REGISTRY
// ============================================================================

#[test]
fn candidates_follow_stake_not_price() {
    let world = three_makers();

    let candidates = world.indexer.get_intents(addr(WETH), addr(DAI), 10);
    assert_eq!(candidates, vec![loc(ALICE), loc(CAROL), loc(BOB)]);

    let market = world.indexer.market(addr(WETH), addr(DAI)).unwrap();
    assert_eq!(market.events().len(), 3);
    assert!(market.is_consistent());
}

#[test]
fn restake_moves_maker_to_front() {
    let mut world = three_makers();
    world
        .indexer
        .set_intent(addr(BOB), addr(WETH), addr(DAI), 5_000, u64::MAX, loc(BOB))
        .unwrap();

    let candidates = world.indexer.get_intents(addr(WETH), addr(DAI), 10);
    assert_eq!(candidates, vec![loc(BOB), loc(ALICE), loc(CAROL)]);
}

#[test]
fn only_controller_mutates_market_directly() {
    let world = three_makers();
    let mut market = world.indexer.market(addr(WETH), addr(DAI)).unwrap().clone();

    let err = market.unset_intent(addr(ALICE), addr(ALICE)).unwrap_err();
    assert_eq!(err, RegistryError::Unauthorized { caller: addr(ALICE) });

    market.unset_intent(addr(INDEXER), addr(ALICE)).unwrap();
    assert_eq!(market.len(), 2);
}

// ============================================================================
// FILLS
// ============================================================================

#[test]
fn sender_side_fill_takes_cheapest_quote() {
    let mut world = three_makers();
    let executor = new_executor(&world.indexer);

    let fill = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap();

    assert_eq!(fill.locator, loc(BOB));
    assert_eq!(fill.trade_wallet, addr(BOB));
    assert_eq!(fill.signer_amount, 200);
    assert_eq!(fill.sender_amount, 100);

    assert_eq!(world.balance(WETH, TAKER), 1_000_000 - 200);
    assert_eq!(world.balance(DAI, TAKER), 100);
    assert_eq!(world.balance(WETH, BOB), 200);
    assert_eq!(world.balance(DAI, BOB), 100_000 - 100);
    assert_eq!(world.balance(WETH, EXECUTOR), 0);
    assert_eq!(world.balance(DAI, EXECUTOR), 0);
}

#[test]
fn signer_side_fill_takes_largest_quote() {
    let mut world = three_makers();
    let executor = new_executor(&world.indexer);

    let fill = executor
        .fill_best_signer_side_order(&mut world.host, addr(TAKER), 1_200, addr(WETH), addr(DAI), 10)
        .unwrap();

    // 1200 / 2 beats 1200 / 3 and 1200 / 4
    assert_eq!(fill.locator, loc(BOB));
    assert_eq!(fill.sender_amount, 600);
    assert_eq!(world.balance(DAI, TAKER), 600);
    assert_eq!(world.balance(WETH, TAKER), 1_000_000 - 1_200);
}

#[test]
fn max_intents_hides_low_staked_maker() {
    let mut world = three_makers();
    let executor = new_executor(&world.indexer);

    // Bob is cheapest but ranked third by stake
    let fill = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 2)
        .unwrap();

    assert_eq!(fill.locator, loc(ALICE));
    assert_eq!(fill.signer_amount, 300);
}

#[test]
fn settled_order_shape() {
    let mut world = three_makers();
    let executor = new_executor(&world.indexer);

    let fill = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap();

    let settled = world.host.settled();
    assert_eq!(settled.len(), 1);
    let order = &settled[0];

    assert_eq!(order.nonce, fill.nonce);
    assert_eq!(order.expiry, NOW + 1);
    assert_eq!(order.signer.wallet(), addr(EXECUTOR));
    assert_eq!(order.signer.token(), addr(WETH));
    assert_eq!(order.sender.wallet(), addr(BOB));
    assert_eq!(order.sender.token(), addr(DAI));
    assert_eq!(order.signer.kind, TRANSFER_KIND);
    assert_eq!(order.sender.kind, TRANSFER_KIND);
    assert!(order.signature.is_empty());
    assert!(order.affiliate.is_empty());

    assert!(world.host.is_nonce_used(addr(EXECUTOR), &fill.nonce));
    assert!(!world.host.is_authorized(addr(EXECUTOR), addr(BOB)));
}

#[test]
fn repeated_fills_drain_capacity_then_move_on() {
    let mut world = World::new();
    world.maker(ALICE, 2_000, Decimal::from(3), 10_000);
    world.maker(BOB, 500, Decimal::from(2), 150);
    let executor = new_executor(&world.indexer);

    let first = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap();
    assert_eq!(first.locator, loc(BOB));

    world.host.advance(1);
    let second = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap();
    // Bob has 50 DAI of capacity left
    assert_eq!(second.locator, loc(ALICE));
    assert_ne!(first.nonce, second.nonce);
}

#[test]
fn distinct_trade_wallet_pays_sender_leg() {
    let mut world = World::new();
    let wallet = addr(0xab);
    world
        .indexer
        .set_intent(addr(ALICE), addr(WETH), addr(DAI), 1, u64::MAX, loc(ALICE))
        .unwrap();
    world.host.add_counterparty(
        loc(ALICE),
        RuleCounterparty::new(addr(ALICE), wallet).with_rule(addr(WETH), addr(DAI), 1_000, Decimal::ONE),
    );
    world.host.mint(addr(DAI), wallet, 500);
    world
        .host
        .set_allowance(addr(DAI), wallet, addr(SETTLEMENT), u128::MAX);
    let executor = new_executor(&world.indexer);

    let fill = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap();

    assert_eq!(fill.counterparty, addr(ALICE));
    assert_eq!(fill.trade_wallet, wallet);
    assert_eq!(world.host.balance_of(addr(DAI), wallet), 400);
    assert_eq!(world.host.balance_of(addr(WETH), wallet), 100);
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn empty_market_is_no_match() {
    let mut world = World::new();
    let before = world.host.clone();
    let executor = new_executor(&world.indexer);

    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap_err();

    assert_eq!(err, MatchError::NoMatchFound);
    assert_eq!(world.host, before);
}

#[test]
fn all_zero_quotes_is_no_match() {
    let mut world = World::new();
    // Neither maker can cover 100 DAI
    world.maker(ALICE, 2_000, Decimal::from(3), 50);
    world.maker(BOB, 500, Decimal::from(2), 50);
    let before = world.host.clone();
    let executor = new_executor(&world.indexer);

    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap_err();
    assert_eq!(err, MatchError::NoMatchFound);

    let err = executor
        .fill_best_signer_side_order(&mut world.host, addr(TAKER), 1_000, addr(WETH), addr(DAI), 10)
        .unwrap_err();
    assert_eq!(err, MatchError::NoMatchFound);

    assert_eq!(world.host, before);
}

#[test]
fn zero_max_intents_is_no_match() {
    let mut world = three_makers();
    let before = world.host.clone();
    let executor = new_executor(&world.indexer);

    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 0)
        .unwrap_err();

    assert_eq!(err, MatchError::NoMatchFound);
    assert_eq!(world.host, before);
}

#[test]
fn blacklisted_pair_is_no_match() {
    let mut world = three_makers();
    world
        .indexer
        .add_token_to_blacklist(addr(OWNER), addr(DAI))
        .unwrap();
    let executor = new_executor(&world.indexer);

    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap_err();
    assert_eq!(err, MatchError::NoMatchFound);
}

#[test]
fn failing_candidate_aborts_fill() {
    let mut world = three_makers();
    world.host.counterparty_mut(loc(CAROL)).unwrap().halt();
    let before = world.host.clone();
    let executor = new_executor(&world.indexer);

    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap_err();

    assert_eq!(
        err,
        MatchError::CandidateFailure {
            locator: loc(CAROL),
            source: CallError::reverted("COUNTERPARTY_HALTED"),
        }
    );
    assert_eq!(world.host, before);
}

#[test]
fn unknown_locator_aborts_fill() {
    let mut world = three_makers();
    world
        .indexer
        .set_intent(addr(0xdd), addr(WETH), addr(DAI), 9_999, u64::MAX, loc(0xdd))
        .unwrap();
    let executor = new_executor(&world.indexer);

    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap_err();
    assert!(matches!(err, MatchError::CandidateFailure { locator, .. } if locator == loc(0xdd)));
}

#[test]
fn settlement_failure_rolls_back_pulled_funds() {
    let mut world = three_makers();
    // Bob wins the quote but cannot deliver
    world
        .host
        .set_allowance(addr(DAI), addr(BOB), addr(SETTLEMENT), 0);
    let before = world.host.clone();
    let executor = new_executor(&world.indexer);

    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap_err();

    assert_eq!(err, MatchError::Call(CallError::reverted("TRANSFER_FAILED")));
    assert_eq!(world.host, before);
    assert_eq!(world.balance(WETH, TAKER), 1_000_000);
    assert!(!world.host.is_authorized(addr(EXECUTOR), addr(BOB)));
}

#[test]
fn taker_without_allowance_is_rejected() {
    let mut world = three_makers();
    world
        .host
        .set_allowance(addr(WETH), addr(TAKER), addr(EXECUTOR), 0);
    let before = world.host.clone();
    let executor = new_executor(&world.indexer);

    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap_err();

    assert!(matches!(err, MatchError::TransferRejected { .. }));
    assert_eq!(world.host, before);
    assert_eq!(world.host.now(), NOW);
}

#[test]
fn second_fill_in_same_second_reverts_on_nonce() {
    const OTHER_TAKER: u64 = 0xcb;

    let mut world = three_makers();
    world.host.mint(addr(WETH), addr(OTHER_TAKER), 1_000_000);
    world
        .host
        .set_allowance(addr(WETH), addr(OTHER_TAKER), addr(EXECUTOR), u128::MAX);
    let executor = new_executor(&world.indexer);

    let first = executor
        .fill_best_sender_side_order(&mut world.host, addr(TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap();
    assert_eq!(first.counterparty, addr(BOB));

    // Different caller, same counterparty, pair and timestamp
    let before = world.host.clone();
    let err = executor
        .fill_best_sender_side_order(&mut world.host, addr(OTHER_TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap_err();
    assert_eq!(err, MatchError::Call(CallError::reverted("ORDER_TAKEN_OR_CANCELLED")));
    assert_eq!(world.host, before);
    assert_eq!(world.balance(WETH, OTHER_TAKER), 1_000_000);

    world.host.advance(1);
    let retry = executor
        .fill_best_sender_side_order(&mut world.host, addr(OTHER_TAKER), 100, addr(DAI), addr(WETH), 10)
        .unwrap();
    assert_eq!(retry.counterparty, addr(BOB));
    assert_ne!(retry.nonce, first.nonce);
    assert_eq!(world.balance(DAI, OTHER_TAKER), 100);
}
