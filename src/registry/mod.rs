//! Staked-intent registry.
//!
//! ## Architecture
//!
//! One [`Market`] per trading pair, each a circular doubly-linked list of
//! intents stored in a slab arena:
//!
//! - [`IntentNode`]: Wrapper around `Intent` with `prev`/`next` slab keys
//! - [`Market`]: Sentinel-headed list ordered by descending stake
//!
//! ## Performance
//!
//! | Operation              | Complexity |
//! |------------------------|------------|
//! | Set intent             | O(n)       |
//! | Unset intent           | O(1)       |
//! | Lookup by staker       | O(1)       |
//! | Read top k locators    | O(k)       |
//! | Length                 | O(1)       |

pub mod node;
pub mod market;

pub use node::IntentNode;
pub use market::{IntentPage, Iter, Market, MAX_INITIAL_CAPACITY};
