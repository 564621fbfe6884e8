//! Matching engine.
//!
//! ## Components
//!
//! - [`host`]: collaborator traits (tokens, settlement, counterparties, clock)
//! - [`QuoteSelector`]: asks every indexed candidate for a live quote and
//!   keeps the best one
//! - [`MatchExecutor`]: turns the best quote into a settled fill
//! - [`DelegatedAuthority`]: scoped authority grant used during a fill
//!
//! ## Design Principles
//!
//! 1. **Determinism**: same host state and inputs, same fill
//! 2. **All-or-nothing**: a fill either completes every step or changes nothing
//! 3. **Synchronous Execution**: no async, no background work
//! 4. **Stake-then-price**: the registry ranks candidates, quotes decide
//!
//! ## Example
//!
//! ```
//! use intent_market::config::ExecutorConfig;
//! use intent_market::engine::MatchExecutor;
//! use intent_market::indexer::LocalIndexer;
//! use intent_market::sim::{RuleCounterparty, SimHost};
//! use intent_market::types::{Address, Locator};
//! use rust_decimal::Decimal;
//!
//! let (weth, dai) = (Address::from_low_u64(10), Address::from_low_u64(11));
//! let (executor, settlement) = (Address::from_low_u64(0xe0), Address::from_low_u64(0x5e));
//! let (maker, taker) = (Address::from_low_u64(0xaa), Address::from_low_u64(0xca));
//! let locator = Locator::from_address(maker);
//!
//! let mut indexer = LocalIndexer::new(Address::from_low_u64(0x1d), Address::ZERO);
//! indexer.create_market(weth, dai).unwrap();
//! indexer.set_intent(maker, weth, dai, 100, u64::MAX, locator).unwrap();
//!
//! let mut host = SimHost::new(settlement);
//! host.add_counterparty(
//!     locator,
//!     RuleCounterparty::new(maker, maker).with_rule(weth, dai, 1_000, Decimal::from(2)),
//! );
//! host.mint(weth, taker, 500);
//! host.mint(dai, maker, 500);
//! host.set_allowance(weth, taker, executor, u128::MAX);
//! host.set_allowance(dai, maker, settlement, u128::MAX);
//!
//! let engine = MatchExecutor::new(executor, settlement, &indexer, ExecutorConfig::default());
//! let fill = engine
//!     .fill_best_sender_side_order(&mut host, taker, 100, dai, weth, 10)
//!     .unwrap();
//!
//! assert_eq!(fill.signer_amount, 200);
//! assert_eq!(host.balance_of(dai, taker), 100);
//! ```

pub mod authority;
pub mod executor;
pub mod host;
pub mod selector;

pub use authority::DelegatedAuthority;
pub use executor::{Fill, MatchExecutor};
pub use host::{Clock, CounterpartyApi, Host, SettlementApi, TokenApi};
pub use selector::{BestQuote, QuoteSelector};
