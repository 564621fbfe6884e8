//! Indexer facade over per-pair markets.
//!
//! ## Contract
//!
//! [`Indexer::get_intents`] returns at most `max_intents` locators for a
//! trading pair, best stake first. Consumers may rely on the bound and the
//! order, but stake rank says nothing about price: the quote selector still
//! asks every candidate for a live quote.
//!
//! ## LocalIndexer
//!
//! [`LocalIndexer`] is the in-process facade. It owns one [`Market`] per
//! `(signer_token, sender_token)` pair and acts as the controller of every
//! market it creates, so stakers can only ever touch their own intent.
//! The indexer's owner can blacklist tokens; a pair involving a
//! blacklisted token yields no candidates and accepts no new intents.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::registry::Market;
use crate::types::{Address, Intent, IntentSet, Locator, MarketEvent};

/// Source of ordered candidate locators for a trading pair.
pub trait Indexer {
    /// Up to `max_intents` locators for the pair, highest stake first.
    fn get_intents(
        &self,
        signer_token: Address,
        sender_token: Address,
        max_intents: usize,
    ) -> Vec<Locator>;
}

impl<T: Indexer + ?Sized> Indexer for &T {
    fn get_intents(
        &self,
        signer_token: Address,
        sender_token: Address,
        max_intents: usize,
    ) -> Vec<Locator> {
        (**self).get_intents(signer_token, sender_token, max_intents)
    }
}

/// In-process indexer holding one market per trading pair.
#[derive(Debug, Clone)]
pub struct LocalIndexer {
    /// Identity of the indexer itself; controller of every market
    address: Address,

    /// May blacklist tokens
    owner: Address,

    markets: HashMap<(Address, Address), Market>,
    blacklist: HashSet<Address>,
    config: RegistryConfig,
}

impl LocalIndexer {
    pub fn new(address: Address, owner: Address) -> Self {
        Self::with_config(address, owner, RegistryConfig::default())
    }

    pub fn with_config(address: Address, owner: Address, config: RegistryConfig) -> Self {
        Self {
            address,
            owner,
            markets: HashMap::new(),
            blacklist: HashSet::new(),
            config,
        }
    }

    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Number of markets created
    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    pub fn market(&self, signer_token: Address, sender_token: Address) -> Option<&Market> {
        self.markets.get(&(signer_token, sender_token))
    }

    pub fn is_blacklisted(&self, token: Address) -> bool {
        self.blacklist.contains(&token)
    }

    // ========================================================================
    // Markets
    // ========================================================================

    /// Create the market for a pair. Open to anyone.
    pub fn create_market(
        &mut self,
        signer_token: Address,
        sender_token: Address,
    ) -> Result<&Market, RegistryError> {
        let key = (signer_token, sender_token);
        if self.markets.contains_key(&key) {
            return Err(RegistryError::MarketExists {
                signer_token,
                sender_token,
            });
        }

        info!(%signer_token, %sender_token, "market created");
        let market = Market::with_capacity(
            self.address,
            signer_token,
            sender_token,
            self.config.initial_capacity,
        );
        Ok(self.markets.entry(key).or_insert(market))
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Set `staker`'s own intent on a pair.
    ///
    /// # Errors
    ///
    /// * `TokenBlacklisted` - either token is blacklisted
    /// * `MarketNotFound` - no market exists for the pair
    pub fn set_intent(
        &mut self,
        staker: Address,
        signer_token: Address,
        sender_token: Address,
        stake_amount: u128,
        expiry: u64,
        locator: Locator,
    ) -> Result<IntentSet, RegistryError> {
        self.ensure_allowed(signer_token, sender_token)?;
        let controller = self.address;
        self.market_mut(signer_token, sender_token)?
            .set_intent(controller, staker, stake_amount, expiry, locator)
    }

    /// Remove `staker`'s own intent from a pair.
    ///
    /// Allowed on blacklisted pairs so stakers can always withdraw.
    pub fn unset_intent(
        &mut self,
        staker: Address,
        signer_token: Address,
        sender_token: Address,
    ) -> Result<Intent, RegistryError> {
        let controller = self.address;
        self.market_mut(signer_token, sender_token)?
            .unset_intent(controller, staker)
    }

    /// Drain a pair's event log, leaving its intents untouched.
    ///
    /// Consumers mirroring the list call this after replaying the events
    /// so the log does not grow without bound.
    pub fn take_events(
        &mut self,
        signer_token: Address,
        sender_token: Address,
    ) -> Result<Vec<MarketEvent>, RegistryError> {
        Ok(self.market_mut(signer_token, sender_token)?.take_events())
    }

    // ========================================================================
    // Blacklist
    // ========================================================================

    /// Owner-only. Returns false if the token was already listed.
    pub fn add_token_to_blacklist(
        &mut self,
        caller: Address,
        token: Address,
    ) -> Result<bool, RegistryError> {
        self.ensure_owner(caller)?;
        let added = self.blacklist.insert(token);
        if added {
            info!(%token, "token blacklisted");
        }
        Ok(added)
    }

    /// Owner-only. Returns false if the token was not listed.
    pub fn remove_token_from_blacklist(
        &mut self,
        caller: Address,
        token: Address,
    ) -> Result<bool, RegistryError> {
        self.ensure_owner(caller)?;
        let removed = self.blacklist.remove(&token);
        if removed {
            info!(%token, "token removed from blacklist");
        }
        Ok(removed)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_owner(&self, caller: Address) -> Result<(), RegistryError> {
        if caller != self.owner {
            return Err(RegistryError::Unauthorized { caller });
        }
        Ok(())
    }

    fn ensure_allowed(&self, signer_token: Address, sender_token: Address) -> Result<(), RegistryError> {
        for token in [signer_token, sender_token] {
            if self.is_blacklisted(token) {
                return Err(RegistryError::TokenBlacklisted { token });
            }
        }
        Ok(())
    }

    fn market_mut(
        &mut self,
        signer_token: Address,
        sender_token: Address,
    ) -> Result<&mut Market, RegistryError> {
        self.markets
            .get_mut(&(signer_token, sender_token))
            .ok_or(RegistryError::MarketNotFound {
                signer_token,
                sender_token,
            })
    }
}

impl Indexer for LocalIndexer {
    fn get_intents(
        &self,
        signer_token: Address,
        sender_token: Address,
        max_intents: usize,
    ) -> Vec<Locator> {
        if self.ensure_allowed(signer_token, sender_token).is_err() {
            debug!(%signer_token, %sender_token, "pair blacklisted, no candidates");
            return Vec::new();
        }
        self.market(signer_token, sender_token)
            .map(|market| market.get_intents(max_intents))
            .unwrap_or_default()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
