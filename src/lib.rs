//! # Intent Market
//!
//! Staked-intent registry and best-quote matching for two-token swaps.
//!
//! ## Architecture
//!
//! - **Types**: Identities, intents, orders and registry events
//! - **Registry**: Per-pair markets of intents ordered by stake
//! - **Indexer**: Facade that owns markets and hands out candidates
//! - **Engine**: Quote selection and the atomic fill choreography
//! - **Sim**: In-memory collaborators for demos and tests
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical inputs give identical lists, fills and roots
//! 2. **No Floating Point**: amounts are `u128` base units, prices `Decimal`
//! 3. **Arena Storage**: slab-backed list nodes, O(1) lookup by staker
//! 4. **Synchronous Execution**: no async anywhere
//!
//! ## Flow
//!
//! Stakers register intents (stake + locator) in a market. A taker asks the
//! executor for a fill; the selector walks the top candidates by stake,
//! queries each for a live quote and keeps the best. The executor then pulls
//! the taker's tokens, lets the winning counterparty settle an unsigned
//! order under a short-lived authority grant, and forwards the proceeds.

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Address, Locator, Intent, Order
pub mod types;

/// Error enums shared across modules
pub mod error;

/// TOML-backed engine configuration
pub mod config;

/// Intent registry: slab-backed sorted markets
pub mod registry;

/// Indexer facade over markets
pub mod indexer;

/// Matching engine: selection, execution, collaborator traits
pub mod engine;

/// In-memory simulation host
pub mod sim;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::EngineConfig;
pub use engine::{Fill, MatchExecutor, QuoteSelector};
pub use error::{CallError, MatchError, RegistryError};
pub use indexer::{Indexer, LocalIndexer};
pub use registry::Market;
pub use types::{Address, Intent, Locator, MarketEvent, Order};
