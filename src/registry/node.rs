//! Intent node for slab-based storage.
//!
//! ## Design
//!
//! `IntentNode` wraps an `Intent` with doubly-linked list pointers. The
//! pointers are slab keys (`usize`), not references, so the whole list
//! lives in one arena and any node can be unlinked in O(1) given its key.
//!
//! ## Circular List
//!
//! Unlike an open list with `Option` ends, the market's list is circular
//! through a sentinel node stored at a reserved key. Every real node
//! therefore always has both neighbours, and an empty list is the sentinel
//! pointing at itself.
//!
//! ```text
//! HEAD -> alice -> carol -> bob -> HEAD
//! ```

use crate::types::{Address, Intent, Locator};

/// Intent node stored in the slab.
#[derive(Debug, Clone)]
pub struct IntentNode {
    /// The intent data (zeroed for the sentinel, keyed as `Address::HEAD`)
    pub intent: Intent,

    /// Next node toward the tail (lower stake)
    pub next: usize,

    /// Previous node toward the head (higher stake)
    pub prev: usize,
}

impl IntentNode {
    /// Create a node linked to itself at `key`.
    ///
    /// A self-linked node is how the sentinel represents an empty list;
    /// real nodes are relinked immediately on insertion.
    #[inline]
    pub fn new(intent: Intent, key: usize) -> Self {
        Self {
            intent,
            next: key,
            prev: key,
        }
    }

    /// The sentinel node stored at `key`
    pub fn sentinel(key: usize) -> Self {
        let intent = Intent::new(Address::HEAD, 0, 0, Locator::ZERO);
        Self::new(intent, key)
    }

    /// Check whether both links point back at `key`
    #[inline]
    pub fn is_self_linked(&self, key: usize) -> bool {
        self.next == key && self.prev == key
    }

    #[inline]
    pub fn staker(&self) -> Address {
        self.intent.staker()
    }

    #[inline]
    pub fn stake_amount(&self) -> u128 {
        self.intent.stake_amount
    }

    #[inline]
    pub fn locator(&self) -> Locator {
        self.intent.locator()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
