//! Rule-priced quoting counterparty.
//!
//! A [`RuleCounterparty`] quotes from a fixed table of per-pair rules. Each
//! rule caps the sender amount it will give and prices it in signer units
//! per sender unit. Quotes are zero when no rule matches or the request
//! exceeds the cap; rounding always favours the counterparty.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::CallError;
use crate::types::amount::{apply_rate, divide_by_rate, Rounding};
use crate::types::{Address, Order, TRANSFER_KIND};

/// Pricing for one `(signer_token, sender_token)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Remaining sender-token capacity; consumed by fills
    pub max_sender_amount: u128,

    /// Signer units required per sender unit
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCounterparty {
    address: Address,
    trade_wallet: Address,
    rules: HashMap<(Address, Address), Rule>,
    halted: bool,
}

impl RuleCounterparty {
    pub fn new(address: Address, trade_wallet: Address) -> Self {
        Self {
            address,
            trade_wallet,
            rules: HashMap::new(),
            halted: false,
        }
    }

    /// Builder form of [`set_rule`](Self::set_rule).
    pub fn with_rule(
        mut self,
        signer_token: Address,
        sender_token: Address,
        max_sender_amount: u128,
        price: Decimal,
    ) -> Self {
        self.set_rule(signer_token, sender_token, max_sender_amount, price);
        self
    }

    pub fn set_rule(
        &mut self,
        signer_token: Address,
        sender_token: Address,
        max_sender_amount: u128,
        price: Decimal,
    ) {
        self.rules.insert(
            (signer_token, sender_token),
            Rule {
                max_sender_amount,
                price,
            },
        );
    }

    pub fn unset_rule(&mut self, signer_token: Address, sender_token: Address) -> Option<Rule> {
        self.rules.remove(&(signer_token, sender_token))
    }

    pub fn rule(&self, signer_token: Address, sender_token: Address) -> Option<&Rule> {
        self.rules.get(&(signer_token, sender_token))
    }

    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline]
    pub fn trade_wallet(&self) -> Address {
        self.trade_wallet
    }

    /// Make every subsequent call fail.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn resume(&mut self) {
        self.halted = false;
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn ensure_live(&self) -> Result<(), CallError> {
        if self.halted {
            return Err(CallError::reverted("COUNTERPARTY_HALTED"));
        }
        Ok(())
    }

    /// Signer amount required for `sender_amount`, rounded up
    pub fn signer_side_quote(
        &self,
        sender_amount: u128,
        sender_token: Address,
        signer_token: Address,
    ) -> Result<u128, CallError> {
        self.ensure_live()?;
        let Some(rule) = self.rule(signer_token, sender_token) else {
            return Ok(0);
        };
        if sender_amount > rule.max_sender_amount {
            return Ok(0);
        }
        Ok(apply_rate(sender_amount, rule.price, Rounding::Up).unwrap_or(0))
    }

    /// Sender amount paid for `signer_amount`, rounded down
    pub fn sender_side_quote(
        &self,
        signer_amount: u128,
        signer_token: Address,
        sender_token: Address,
    ) -> Result<u128, CallError> {
        self.ensure_live()?;
        let Some(rule) = self.rule(signer_token, sender_token) else {
            return Ok(0);
        };
        let amount = divide_by_rate(signer_amount, rule.price, Rounding::Down).unwrap_or(0);
        if amount > rule.max_sender_amount {
            return Ok(0);
        }
        Ok(amount)
    }

    /// Accept `order` if it matches a rule, returning the rule key to charge.
    pub(crate) fn validate_order(&self, order: &Order) -> Result<(Address, Address), CallError> {
        self.ensure_live()?;

        if order.sender.wallet() != self.trade_wallet {
            return Err(CallError::reverted("SENDER_MUST_BE_TRADE_WALLET"));
        }
        if order.signer.kind != TRANSFER_KIND || order.sender.kind != TRANSFER_KIND {
            return Err(CallError::reverted("KIND_UNSUPPORTED"));
        }

        let key = (order.signer.token(), order.sender.token());
        let rule = self
            .rules
            .get(&key)
            .ok_or_else(|| CallError::reverted("TOKEN_PAIR_INACTIVE"))?;
        if order.sender.amount > rule.max_sender_amount {
            return Err(CallError::reverted("AMOUNT_EXCEEDS_MAX"));
        }

        let required = apply_rate(order.sender.amount, rule.price, Rounding::Up)
            .ok_or_else(|| CallError::reverted("PRICE_OVERFLOW"))?;
        if order.signer.amount < required {
            return Err(CallError::reverted("PRICE_INVALID"));
        }
        Ok(key)
    }

    /// Reduce the rule's capacity after a settled order.
    pub(crate) fn consume(&mut self, key: (Address, Address), sender_amount: u128) {
        if let Some(rule) = self.rules.get_mut(&key) {
            rule.max_sender_amount = rule.max_sender_amount.saturating_sub(sender_amount);
        }
    }
}
