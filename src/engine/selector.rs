//! Best-quote selection across indexed candidates.
//!
//! ## Objectives
//!
//! - **Sender side** (`best_sender_side_quote`): the caller wants a fixed
//!   amount of the sender token; pick the candidate requiring the *least*
//!   signer token.
//! - **Signer side** (`best_signer_side_quote`): the caller spends a fixed
//!   amount of the signer token; pick the candidate paying the *most*
//!   sender token.
//!
//! ## Rules
//!
//! - Candidates come from the indexer in stake order, capped at `max_intents`
//! - A quote of zero means "cannot quote" and is skipped
//! - Only a strictly better quote replaces the current best, so ties keep
//!   the earliest candidate
//! - A candidate whose quote call fails aborts the whole selection
//! - No usable quote yields a zero locator, never an error

use tracing::debug;

use crate::engine::CounterpartyApi;
use crate::error::MatchError;
use crate::indexer::Indexer;
use crate::types::{Address, Locator};

/// Winning candidate and its quoted amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestQuote {
    /// Zero when nobody could quote
    pub locator: Locator,

    /// Signer amount (sender side) or sender amount (signer side)
    pub amount: u128,
}

impl BestQuote {
    /// Did any candidate quote?
    #[inline]
    pub fn is_match(&self) -> bool {
        !self.locator.is_zero()
    }
}

/// Picks the best counter-quote among an indexer's candidates.
#[derive(Debug, Clone)]
pub struct QuoteSelector<I> {
    indexer: I,
}

impl<I: Indexer> QuoteSelector<I> {
    pub fn new(indexer: I) -> Self {
        Self { indexer }
    }

    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    /// Cheapest signer-side amount for receiving `sender_amount`.
    ///
    /// Returns `(Locator::ZERO, u128::MAX)` if no candidate could quote.
    ///
    /// # Errors
    ///
    /// * `CandidateFailure` - a candidate's quote call failed
    pub fn best_sender_side_quote<C>(
        &self,
        counterparties: &C,
        sender_amount: u128,
        sender_token: Address,
        signer_token: Address,
        max_intents: usize,
    ) -> Result<BestQuote, MatchError>
    where
        C: CounterpartyApi + ?Sized,
    {
        let candidates = self.indexer.get_intents(signer_token, sender_token, max_intents);

        let mut best = BestQuote {
            locator: Locator::ZERO,
            amount: u128::MAX,
        };
        for locator in candidates.into_iter().take(max_intents) {
            let amount = counterparties
                .signer_side_quote(locator, sender_amount, sender_token, signer_token)
                .map_err(|source| MatchError::CandidateFailure { locator, source })?;
            debug!(%locator, amount, "signer-side quote");

            if amount != 0 && amount < best.amount {
                best = BestQuote { locator, amount };
            }
        }
        Ok(best)
    }

    /// Largest sender-side amount for spending `signer_amount`.
    ///
    /// Returns `(Locator::ZERO, 0)` if no candidate could quote.
    ///
    /// # Errors
    ///
    /// * `CandidateFailure` - a candidate's quote call failed
    pub fn best_signer_side_quote<C>(
        &self,
        counterparties: &C,
        signer_amount: u128,
        signer_token: Address,
        sender_token: Address,
        max_intents: usize,
    ) -> Result<BestQuote, MatchError>
    where
        C: CounterpartyApi + ?Sized,
    {
        let candidates = self.indexer.get_intents(signer_token, sender_token, max_intents);

        let mut best = BestQuote {
            locator: Locator::ZERO,
            amount: 0,
        };
        for locator in candidates.into_iter().take(max_intents) {
            let amount = counterparties
                .sender_side_quote(locator, signer_amount, signer_token, sender_token)
                .map_err(|source| MatchError::CandidateFailure { locator, source })?;
            debug!(%locator, amount, "sender-side quote");

            if amount > best.amount {
                best = BestQuote { locator, amount };
            }
        }
        Ok(best)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::CallError;
    use crate::types::Order;

    const SIGNER_TOKEN: u64 = 10;
    const SENDER_TOKEN: u64 = 11;

    fn loc(v: u64) -> Locator {
        Locator::from_address(Address::from_low_u64(v))
    }

    /// Fixed candidate list, already in "stake order"
    struct Candidates(Vec<Locator>);

    impl Indexer for Candidates {
        fn get_intents(&self, _: Address, _: Address, max_intents: usize) -> Vec<Locator> {
            self.0.iter().copied().take(max_intents).collect()
        }
    }

    /// Answers every quote with a fixed amount per locator
    #[derive(Default)]
    struct FixedQuotes {
        quotes: HashMap<Locator, Result<u128, CallError>>,
        asked: std::cell::RefCell<Vec<Locator>>,
    }

    impl FixedQuotes {
        fn new(entries: &[(Locator, u128)]) -> Self {
            Self {
                quotes: entries.iter().map(|(l, a)| (*l, Ok(*a))).collect(),
                asked: Default::default(),
            }
        }

        fn quote(&self, locator: Locator) -> Result<u128, CallError> {
            self.asked.borrow_mut().push(locator);
            self.quotes
                .get(&locator)
                .cloned()
                .unwrap_or(Err(CallError::UnknownCounterparty(locator)))
        }
    }

    impl CounterpartyApi for FixedQuotes {
        fn signer_side_quote(&self, locator: Locator, _: u128, _: Address, _: Address) -> Result<u128, CallError> {
            self.quote(locator)
        }

        fn sender_side_quote(&self, locator: Locator, _: u128, _: Address, _: Address) -> Result<u128, CallError> {
            self.quote(locator)
        }

        fn trade_wallet(&self, locator: Locator) -> Result<Address, CallError> {
            Ok(locator.as_address())
        }

        fn provide_order(&mut self, _: Address, _: Locator, _: &Order) -> Result<(), CallError> {
            Ok(())
        }
    }

    fn tokens() -> (Address, Address) {
        (Address::from_low_u64(SIGNER_TOKEN), Address::from_low_u64(SENDER_TOKEN))
    }

    #[test]
    fn test_sender_side_picks_lowest_nonzero() {
        let (signer_token, sender_token) = tokens();
        let candidates = vec![loc(1), loc(2), loc(3), loc(4)];
        let quotes = FixedQuotes::new(&[(loc(1), 50), (loc(2), 30), (loc(3), 0), (loc(4), 40)]);
        let selector = QuoteSelector::new(Candidates(candidates));

        let best = selector
            .best_sender_side_quote(&quotes, 100, sender_token, signer_token, 4)
            .unwrap();

        assert_eq!(best, BestQuote { locator: loc(2), amount: 30 });
        assert!(best.is_match());
    }

    #[test]
    fn test_sender_side_tie_keeps_first() {
        let (signer_token, sender_token) = tokens();
        let quotes = FixedQuotes::new(&[(loc(1), 40), (loc(2), 30), (loc(3), 30)]);
        let selector = QuoteSelector::new(Candidates(vec![loc(1), loc(2), loc(3)]));

        let best = selector
            .best_sender_side_quote(&quotes, 100, sender_token, signer_token, 3)
            .unwrap();
        assert_eq!(best.locator, loc(2));
    }

    #[test]
    fn test_signer_side_picks_first_highest() {
        let (signer_token, sender_token) = tokens();
        let candidates = vec![loc(1), loc(2), loc(3), loc(4)];
        let quotes = FixedQuotes::new(&[(loc(1), 10), (loc(2), 25), (loc(3), 0), (loc(4), 25)]);
        let selector = QuoteSelector::new(Candidates(candidates));

        let best = selector
            .best_signer_side_quote(&quotes, 100, signer_token, sender_token, 4)
            .unwrap();

        assert_eq!(best, BestQuote { locator: loc(2), amount: 25 });
    }

    #[test]
    fn test_no_quotes_returns_sentinels() {
        let (signer_token, sender_token) = tokens();
        let quotes = FixedQuotes::new(&[(loc(1), 0), (loc(2), 0)]);
        let selector = QuoteSelector::new(Candidates(vec![loc(1), loc(2)]));

        let best = selector
            .best_sender_side_quote(&quotes, 100, sender_token, signer_token, 2)
            .unwrap();
        assert_eq!(best, BestQuote { locator: Locator::ZERO, amount: u128::MAX });
        assert!(!best.is_match());

        let best = selector
            .best_signer_side_quote(&quotes, 100, signer_token, sender_token, 2)
            .unwrap();
        assert_eq!(best, BestQuote { locator: Locator::ZERO, amount: 0 });
        assert!(!best.is_match());
    }

    #[test]
    fn test_max_intents_bounds_candidates() {
        let (signer_token, sender_token) = tokens();
        // The cheapest quote sits beyond the cap
        let quotes = FixedQuotes::new(&[(loc(1), 50), (loc(2), 40), (loc(3), 1)]);
        let selector = QuoteSelector::new(Candidates(vec![loc(1), loc(2), loc(3)]));

        let best = selector
            .best_sender_side_quote(&quotes, 100, sender_token, signer_token, 2)
            .unwrap();
        assert_eq!(best.locator, loc(2));
        assert_eq!(*quotes.asked.borrow(), vec![loc(1), loc(2)]);

        let best = selector
            .best_sender_side_quote(&quotes, 100, sender_token, signer_token, 0)
            .unwrap();
        assert!(!best.is_match());
    }

    #[test]
    fn test_candidate_failure_aborts_selection() {
        let (signer_token, sender_token) = tokens();
        let mut quotes = FixedQuotes::new(&[(loc(1), 10), (loc(3), 5)]);
        quotes
            .quotes
            .insert(loc(2), Err(CallError::reverted("halted")));
        let selector = QuoteSelector::new(Candidates(vec![loc(1), loc(2), loc(3)]));

        let err = selector
            .best_sender_side_quote(&quotes, 100, sender_token, signer_token, 3)
            .unwrap_err();

        assert_eq!(
            err,
            MatchError::CandidateFailure {
                locator: loc(2),
                source: CallError::reverted("halted"),
            }
        );
        // Later candidates are never asked
        assert_eq!(*quotes.asked.borrow(), vec![loc(1), loc(2)]);
    }
}
