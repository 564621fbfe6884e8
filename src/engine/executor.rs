//! Atomic fill choreography.
//!
//! ## Flow
//!
//! ```text
//! select best quote ──► NoMatchFound if nobody quoted
//!        │
//!        ▼  (on a staged copy of the host)
//! pull caller's signer tokens ─► approve settlement ─► grant authority
//!        │
//!        ▼
//! counterparty executes the unsigned order ─► revoke authority
//!        │
//!        ▼
//! forward sender tokens to caller ─► commit staged host
//! ```
//!
//! Any failure after selection discards the staged copy, so the caller's
//! host is either fully updated or untouched. Every token call's boolean
//! result is checked.

use tracing::{debug, info};

use crate::config::ExecutorConfig;
use crate::engine::{DelegatedAuthority, Host, QuoteSelector};
use crate::error::{MatchError, TokenOp};
use crate::indexer::Indexer;
use crate::types::{Address, Locator, Order};

/// Receipt of a completed fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub locator: Locator,

    /// Identity granted delegated authority (`locator.as_address()`)
    pub counterparty: Address,

    /// Wallet the sender leg came from
    pub trade_wallet: Address,

    pub signer_amount: u128,
    pub sender_amount: u128,
    pub nonce: [u8; 32],
}

/// Fills a caller's request against the best-quoting counterparty.
#[derive(Debug, Clone)]
pub struct MatchExecutor<I> {
    selector: QuoteSelector<I>,

    /// Own identity: order signer, temporary token holder
    address: Address,

    /// Settlement identity, spender of the executor's approvals
    settlement: Address,

    config: ExecutorConfig,
}

impl<I: Indexer> MatchExecutor<I> {
    pub fn new(address: Address, settlement: Address, indexer: I, config: ExecutorConfig) -> Self {
        Self {
            selector: QuoteSelector::new(indexer),
            address,
            settlement,
            config,
        }
    }

    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline]
    pub fn settlement(&self) -> Address {
        self.settlement
    }

    pub fn selector(&self) -> &QuoteSelector<I> {
        &self.selector
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Receive exactly `sender_amount` of `sender_token`, paying the least
    /// `signer_token`.
    ///
    /// # Arguments
    ///
    /// * `host` - Collaborators; only modified if the fill succeeds
    /// * `caller` - Pays signer tokens (must have approved this executor)
    /// * `sender_amount` - Exact amount of `sender_token` to receive
    /// * `max_intents` - Candidates to consider
    ///
    /// # Nonce reuse
    ///
    /// The order nonce covers only the timestamp, this executor, the trade
    /// wallet and the two tokens, not the caller. A second fill against the
    /// same counterparty and pair within one timestamp reproduces the nonce
    /// and the settlement rejects it; that fill fails as a `Call` error and
    /// is rolled back like any other.
    ///
    /// # Errors
    ///
    /// * `NoMatchFound` - no candidate quoted; nothing moved
    /// * `CandidateFailure` - a quote call failed
    /// * `TransferRejected` / `Call` - the choreography failed; rolled back
    pub fn fill_best_sender_side_order<H: Host + Clone>(
        &self,
        host: &mut H,
        caller: Address,
        sender_amount: u128,
        sender_token: Address,
        signer_token: Address,
        max_intents: usize,
    ) -> Result<Fill, MatchError> {
        let best = self.selector.best_sender_side_quote(
            &*host,
            sender_amount,
            sender_token,
            signer_token,
            max_intents,
        )?;
        if !best.is_match() {
            debug!(%sender_token, %signer_token, sender_amount, "no signer-side quote");
            return Err(MatchError::NoMatchFound);
        }

        self.commit(host, |staged| {
            self.settle(
                staged,
                caller,
                best.locator,
                signer_token,
                best.amount,
                sender_token,
                sender_amount,
            )
        })
    }

    /// Spend exactly `signer_amount` of `signer_token`, receiving the most
    /// `sender_token`.
    ///
    /// Same errors, atomicity and nonce-reuse caveat as
    /// [`fill_best_sender_side_order`](Self::fill_best_sender_side_order).
    pub fn fill_best_signer_side_order<H: Host + Clone>(
        &self,
        host: &mut H,
        caller: Address,
        signer_amount: u128,
        signer_token: Address,
        sender_token: Address,
        max_intents: usize,
    ) -> Result<Fill, MatchError> {
        let best = self.selector.best_signer_side_quote(
            &*host,
            signer_amount,
            signer_token,
            sender_token,
            max_intents,
        )?;
        if !best.is_match() {
            debug!(%signer_token, %sender_token, signer_amount, "no sender-side quote");
            return Err(MatchError::NoMatchFound);
        }

        self.commit(host, |staged| {
            self.settle(
                staged,
                caller,
                best.locator,
                signer_token,
                signer_amount,
                sender_token,
                best.amount,
            )
        })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Run `step` on a copy of `host`; write the copy back only on success.
    fn commit<H, F>(&self, host: &mut H, step: F) -> Result<Fill, MatchError>
    where
        H: Host + Clone,
        F: FnOnce(&mut H) -> Result<Fill, MatchError>,
    {
        let mut staged = host.clone();
        let fill = step(&mut staged)?;
        *host = staged;
        Ok(fill)
    }

    #[allow(clippy::too_many_arguments)]
    fn settle<H: Host>(
        &self,
        host: &mut H,
        caller: Address,
        locator: Locator,
        signer_token: Address,
        signer_amount: u128,
        sender_token: Address,
        sender_amount: u128,
    ) -> Result<Fill, MatchError> {
        let now = host.now();

        let pulled = host.transfer_from(signer_token, self.address, caller, self.address, signer_amount)?;
        check(pulled, TokenOp::TransferFrom, signer_token, signer_amount)?;

        let allowance = if self.config.exact_approvals {
            signer_amount
        } else {
            u128::MAX
        };
        let approved = host.approve(signer_token, self.address, self.settlement, allowance)?;
        check(approved, TokenOp::Approve, signer_token, allowance)?;

        let counterparty = locator.as_address();
        let trade_wallet = host.trade_wallet(locator)?;
        let order = Order::unsigned(
            now,
            now.saturating_add(self.config.order_ttl),
            self.address,
            signer_token,
            signer_amount,
            trade_wallet,
            sender_token,
            sender_amount,
        );
        let digest = order.digest()?;

        let mut authority = DelegatedAuthority::grant(
            &mut *host,
            self.address,
            counterparty,
            now.saturating_add(self.config.authority_window),
        )?;
        authority.provide_order(self.address, locator, &order)?;
        authority.revoke()?;

        let forwarded = host.transfer(sender_token, self.address, caller, sender_amount)?;
        check(forwarded, TokenOp::Transfer, sender_token, sender_amount)?;

        info!(
            %caller,
            %locator,
            signer_amount,
            sender_amount,
            order = %hex::encode(digest),
            "order filled"
        );

        Ok(Fill {
            locator,
            counterparty,
            trade_wallet,
            signer_amount,
            sender_amount,
            nonce: order.nonce,
        })
    }
}

#[inline]
fn check(ok: bool, op: TokenOp, token: Address, amount: u128) -> Result<(), MatchError> {
    if ok {
        Ok(())
    } else {
        Err(MatchError::TransferRejected { op, token, amount })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
