//! Per-pair market of staked intents.
//!
//! ## Architecture
//!
//! - **Slab**: Arena holding every list node, sentinel included
//! - **HashMap**: Staker to slab key mapping for O(1) lookup and removal
//! - **Sentinel**: Reserved slab key 0, both start and end of the list
//!
//! ## Ordering
//!
//! Intents are kept in descending stake order. Insertion scans from the
//! head while the new stake is strictly lower than the scanned node and
//! links the new node in front of where the scan stopped. An intent with
//! the same stake as existing ones therefore lands *before* them: among
//! equal stakes the most recently set intent comes first.
//!
//! ## Access Control
//!
//! Every mutation takes the caller identity and fails with
//! `RegistryError::Unauthorized` unless it is the market's controller.
//! Reads are open.
//!
//! ## Example
//!
//! ```
//! use intent_market::registry::Market;
//! use intent_market::types::{Address, Locator};
//!
//! let controller = Address::from_low_u64(1);
//! let (weth, dai) = (Address::from_low_u64(10), Address::from_low_u64(11));
//! let mut market = Market::new(controller, weth, dai);
//!
//! let alice = Address::from_low_u64(0xa);
//! let bob = Address::from_low_u64(0xb);
//! market.set_intent(controller, alice, 2_000, 0, Locator::from_address(alice)).unwrap();
//! market.set_intent(controller, bob, 500, 0, Locator::from_address(bob)).unwrap();
//!
//! assert_eq!(market.len(), 2);
//! assert_eq!(market.get_intents(1), vec![Locator::from_address(alice)]);
//! ```

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use slab::Slab;
use tracing::debug;

use crate::error::RegistryError;
use crate::registry::IntentNode;
use crate::types::{Address, Intent, IntentSet, IntentUnset, Locator, MarketEvent};

/// Slab key reserved for the sentinel
const HEAD: usize = 0;

/// Upper bound on intents pre-allocated by [`Market::with_capacity`]
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// A page of intents returned by cursor-based reads
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntentPage {
    /// Locators in descending stake order
    pub locators: Vec<Locator>,

    /// Stake amounts, aligned with `locators`
    pub stakes: Vec<u128>,

    /// Staker to resume from, or None if the list was exhausted
    pub next_cursor: Option<Address>,
}

/// Ordered registry of staked intents for one trading pair.
#[derive(Debug, Clone)]
pub struct Market {
    /// Only identity allowed to mutate the market
    controller: Address,

    /// Token the quoting parties receive (signer leg of their orders)
    signer_token: Address,

    /// Token the quoting parties send (sender leg of their orders)
    sender_token: Address,

    /// Arena of list nodes; key `HEAD` is the sentinel
    nodes: Slab<IntentNode>,

    /// Staker to slab key mapping
    index: HashMap<Address, usize>,

    /// Number of real intents (sentinel excluded)
    length: usize,

    /// Append-only notification log
    events: Vec<MarketEvent>,
}

impl Market {
    /// Create an empty market controlled by `controller`
    pub fn new(controller: Address, signer_token: Address, sender_token: Address) -> Self {
        Self::with_capacity(controller, signer_token, sender_token, 0)
    }

    /// Create an empty market with room for `capacity` intents.
    ///
    /// `capacity` is a hint, clamped to [`MAX_INITIAL_CAPACITY`].
    pub fn with_capacity(
        controller: Address,
        signer_token: Address,
        sender_token: Address,
        capacity: usize,
    ) -> Self {
        let capacity = capacity.min(MAX_INITIAL_CAPACITY);
        let mut nodes = Slab::with_capacity(capacity.saturating_add(1));
        let head = nodes.insert(IntentNode::sentinel(HEAD));
        debug_assert_eq!(head, HEAD);

        Self {
            controller,
            signer_token,
            sender_token,
            nodes,
            index: HashMap::with_capacity(capacity),
            length: 0,
            events: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn controller(&self) -> Address {
        self.controller
    }

    #[inline]
    pub fn signer_token(&self) -> Address {
        self.signer_token
    }

    #[inline]
    pub fn sender_token(&self) -> Address {
        self.sender_token
    }

    /// Number of intents, O(1)
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Check whether the staker has an intent in this market
    #[inline]
    pub fn has_intent(&self, staker: Address) -> bool {
        self.index.contains_key(&staker)
    }

    /// Get the staker's intent, if any
    pub fn get_intent(&self, staker: Address) -> Option<&Intent> {
        let key = *self.index.get(&staker)?;
        self.nodes.get(key).map(|node| &node.intent)
    }

    /// Highest-staked intent
    pub fn first(&self) -> Option<&Intent> {
        self.real(self.nodes[HEAD].next)
    }

    /// Lowest-staked intent
    pub fn last(&self) -> Option<&Intent> {
        self.real(self.nodes[HEAD].prev)
    }

    /// Iterate intents head to tail (descending stake)
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            cursor: self.nodes[HEAD].next,
            remaining: self.length,
        }
    }

    /// Events recorded so far
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Drain the event log
    pub fn take_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert or reposition the staker's intent.
    ///
    /// An existing intent is unlinked first and the new one inserted at its
    /// sorted position, so an update behaves exactly like unset + set.
    ///
    /// # Errors
    ///
    /// * `Unauthorized` - `caller` is not the controller
    /// * `ReservedStaker` - `staker` is the sentinel identity
    pub fn set_intent(
        &mut self,
        caller: Address,
        staker: Address,
        stake_amount: u128,
        expiry: u64,
        locator: Locator,
    ) -> Result<IntentSet, RegistryError> {
        self.ensure_controller(caller)?;
        if staker == Address::HEAD {
            return Err(RegistryError::ReservedStaker(staker));
        }

        if let Some(key) = self.index.get(&staker).copied() {
            self.unlink(key);
        }

        let next = self.find_position(stake_amount);
        let entry = self.nodes.vacant_entry();
        let key = entry.key();
        entry.insert(IntentNode::new(
            Intent::new(staker, stake_amount, expiry, locator),
            key,
        ));
        self.link_before(key, next);
        self.index.insert(staker, key);
        self.length += 1;

        let event = IntentSet {
            staker,
            stake_amount,
            expiry,
            locator,
            signer_token: self.signer_token,
            sender_token: self.sender_token,
        };
        self.events.push(MarketEvent::IntentSet(event.clone()));

        debug!(
            staker = %staker,
            stake = stake_amount,
            expiry,
            length = self.length,
            "intent set"
        );
        Ok(event)
    }

    /// Remove the staker's intent and return it.
    ///
    /// # Errors
    ///
    /// * `Unauthorized` - `caller` is not the controller
    /// * `NotFound` - the staker has no intent
    pub fn unset_intent(&mut self, caller: Address, staker: Address) -> Result<Intent, RegistryError> {
        self.ensure_controller(caller)?;
        let key = *self
            .index
            .get(&staker)
            .ok_or(RegistryError::NotFound { staker })?;

        let intent = self.unlink(key);
        self.events.push(MarketEvent::IntentUnset(IntentUnset {
            staker,
            signer_token: self.signer_token,
            sender_token: self.sender_token,
        }));

        debug!(staker = %staker, length = self.length, "intent unset");
        Ok(intent)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Up to `max_intents` locators, highest stake first.
    ///
    /// Expired intents are included; filtering is up to the consumer.
    pub fn get_intents(&self, max_intents: usize) -> Vec<Locator> {
        self.iter().take(max_intents).map(Intent::locator).collect()
    }

    /// Cursor-based read starting at `cursor` (or the head when `None`).
    ///
    /// # Errors
    ///
    /// * `NotFound` - `cursor` names a staker with no intent
    pub fn get_intents_from(
        &self,
        cursor: Option<Address>,
        max_intents: usize,
    ) -> Result<IntentPage, RegistryError> {
        let mut key = match cursor {
            None => self.nodes[HEAD].next,
            Some(staker) => *self
                .index
                .get(&staker)
                .ok_or(RegistryError::NotFound { staker })?,
        };

        let mut page = IntentPage::default();
        while key != HEAD && page.locators.len() < max_intents {
            let node = &self.nodes[key];
            page.locators.push(node.locator());
            page.stakes.push(node.stake_amount());
            key = node.next;
        }
        if key != HEAD {
            page.next_cursor = Some(self.nodes[key].staker());
        }
        Ok(page)
    }

    /// SHA-256 over the SSZ encodings of all intents in list order.
    ///
    /// Two markets holding the same intents in the same order produce the
    /// same root regardless of slab layout.
    pub fn compute_state_root(&self) -> Result<[u8; 32], RegistryError> {
        let mut hasher = Sha256::new();
        hasher.update(self.signer_token.0);
        hasher.update(self.sender_token.0);
        for intent in self.iter() {
            let bytes = ssz_rs::serialize(intent)
                .map_err(|e| RegistryError::Encoding(format!("{:?}", e)))?;
            hasher.update(&bytes);
        }

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }

    /// Verify every structural invariant of the list.
    ///
    /// Checks forward/backward link symmetry, descending stake order, the
    /// staker index and the stored length. Intended for tests and for
    /// indexers auditing a replayed market.
    pub fn is_consistent(&self) -> bool {
        if self.nodes[HEAD].staker() != Address::HEAD {
            return false;
        }

        let mut count = 0usize;
        let mut key = self.nodes[HEAD].next;
        let mut prev = HEAD;
        let mut last_stake = u128::MAX;
        while key != HEAD {
            let Some(node) = self.nodes.get(key) else {
                return false;
            };
            if node.prev != prev
                || node.stake_amount() > last_stake
                || self.index.get(&node.staker()) != Some(&key)
            {
                return false;
            }
            count += 1;
            if count > self.length {
                return false;
            }
            last_stake = node.stake_amount();
            prev = key;
            key = node.next;
        }

        self.nodes[HEAD].prev == prev
            && count == self.length
            && self.index.len() == self.length
            && self.nodes.len() == self.length + 1
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_controller(&self, caller: Address) -> Result<(), RegistryError> {
        if caller != self.controller {
            return Err(RegistryError::Unauthorized { caller });
        }
        Ok(())
    }

    /// Key of the first node whose stake is not strictly greater than
    /// `stake_amount`, or `HEAD` if every node outranks it.
    fn find_position(&self, stake_amount: u128) -> usize {
        let mut key = self.nodes[HEAD].next;
        while key != HEAD && stake_amount < self.nodes[key].stake_amount() {
            key = self.nodes[key].next;
        }
        key
    }

    /// Link the (self-linked) node at `key` immediately before `next`
    fn link_before(&mut self, key: usize, next: usize) {
        let prev = self.nodes[next].prev;

        let node = &mut self.nodes[key];
        node.prev = prev;
        node.next = next;

        self.nodes[prev].next = key;
        self.nodes[next].prev = key;
    }

    /// Unlink and free the node at `key`
    fn unlink(&mut self, key: usize) -> Intent {
        let (prev, next) = {
            let node = &self.nodes[key];
            (node.prev, node.next)
        };
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;

        let node = self.nodes.remove(key);
        self.index.remove(&node.staker());
        self.length -= 1;
        node.intent
    }

    fn real(&self, key: usize) -> Option<&Intent> {
        if key == HEAD {
            None
        } else {
            self.nodes.get(key).map(|node| &node.intent)
        }
    }

    #[cfg(test)]
    fn head_node(&self) -> &IntentNode {
        &self.nodes[HEAD]
    }
}

/// Head-to-tail iterator over a market's intents
pub struct Iter<'a> {
    nodes: &'a Slab<IntentNode>,
    cursor: usize,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Intent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == HEAD || self.remaining == 0 {
            return None;
        }
        let node = self.nodes.get(self.cursor)?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.intent)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a> IntoIterator for &'a Market {
    type Item = &'a Intent;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
