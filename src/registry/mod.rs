//! In-memory card registry populated by the input form.
//!
//! The registry owns the session's set of cards and enforces the input
//! invariants (unique nicknames, non-negative balances and APRs) so the
//! simulator can assume clean data.

use serde::{Deserialize, Serialize};

use crate::errors::{PayoffError, Result};
use crate::simulation::BALANCE_EPSILON;

/// A single credit card as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub nickname: String,
    pub balance: f64,
    pub apr: f64,
}

impl Card {
    pub fn new(nickname: impl Into<String>, balance: f64, apr: f64) -> Result<Self> {
        let nickname = nickname.into().trim().to_string();
        if nickname.is_empty() {
            return Err(PayoffError::InvalidInput("nickname cannot be empty".into()));
        }
        if !balance.is_finite() || balance < 0.0 {
            return Err(PayoffError::InvalidInput(format!(
                "balance for `{}` must be zero or positive",
                nickname
            )));
        }
        if !apr.is_finite() || apr < 0.0 {
            return Err(PayoffError::InvalidInput(format!(
                "APR for `{}` must be zero or positive",
                nickname
            )));
        }
        Ok(Self {
            nickname,
            balance,
            apr,
        })
    }

    /// A card with no remaining balance contributes nothing to a simulation.
    pub fn is_active(&self) -> bool {
        self.balance > BALANCE_EPSILON
    }
}

fn normalize(nickname: &str) -> String {
    nickname.trim().to_ascii_lowercase()
}

/// Ordered collection of cards keyed by nickname.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRegistry {
    cards: Vec<Card>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Result<Self> {
        let mut registry = Self::new();
        for card in cards {
            registry.add(card)?;
        }
        Ok(registry)
    }

    pub fn add(&mut self, card: Card) -> Result<()> {
        if self.get(&card.nickname).is_some() {
            return Err(PayoffError::DuplicateCard(card.nickname));
        }
        self.cards.push(card);
        Ok(())
    }

    pub fn get(&self, nickname: &str) -> Option<&Card> {
        let key = normalize(nickname);
        self.cards.iter().find(|c| normalize(&c.nickname) == key)
    }

    fn get_mut(&mut self, nickname: &str) -> Result<&mut Card> {
        let key = normalize(nickname);
        self.cards
            .iter_mut()
            .find(|c| normalize(&c.nickname) == key)
            .ok_or_else(|| PayoffError::CardNotFound(nickname.trim().to_string()))
    }

    pub fn update_balance(&mut self, nickname: &str, balance: f64) -> Result<()> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(PayoffError::InvalidInput(
                "balance must be zero or positive".into(),
            ));
        }
        self.get_mut(nickname)?.balance = balance;
        Ok(())
    }

    pub fn update_apr(&mut self, nickname: &str, apr: f64) -> Result<()> {
        if !apr.is_finite() || apr < 0.0 {
            return Err(PayoffError::InvalidInput(
                "APR must be zero or positive".into(),
            ));
        }
        self.get_mut(nickname)?.apr = apr;
        Ok(())
    }

    /// Applies a one-time payment to a specific card. The balance never
    /// goes below zero; overpayment is simply discarded.
    pub fn apply_payment(&mut self, nickname: &str, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(PayoffError::InvalidInput(
                "payment amount must be zero or positive".into(),
            ));
        }
        let card = self.get_mut(nickname)?;
        card.balance = (card.balance - amount).max(0.0);
        Ok(())
    }

    pub fn remove(&mut self, nickname: &str) -> Result<Card> {
        let key = normalize(nickname);
        let index = self
            .cards
            .iter()
            .position(|c| normalize(&c.nickname) == key)
            .ok_or_else(|| PayoffError::CardNotFound(nickname.trim().to_string()))?;
        Ok(self.cards.remove(index))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total_balance(&self) -> f64 {
        self.cards.iter().map(|c| c.balance).sum()
    }

    /// Cards that still carry a balance, i.e. the simulation input.
    pub fn active_cards(&self) -> Vec<Card> {
        self.cards.iter().filter(|c| c.is_active()).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(nickname: &str, balance: f64, apr: f64) -> Card {
        Card::new(nickname, balance, apr).expect("valid card")
    }

    #[test]
    fn rejects_duplicate_nicknames_case_insensitively() {
        let mut registry = CardRegistry::new();
        registry.add(card("Chase", 1000.0, 24.49)).unwrap();
        let err = registry.add(card("chase", 50.0, 10.0)).unwrap_err();
        assert!(matches!(err, PayoffError::DuplicateCard(_)));
    }

    #[test]
    fn rejects_negative_inputs() {
        assert!(Card::new("A", -1.0, 10.0).is_err());
        assert!(Card::new("A", 10.0, -1.0).is_err());
        assert!(Card::new("  ", 10.0, 10.0).is_err());
    }

    #[test]
    fn payment_clamps_balance_at_zero() {
        let mut registry = CardRegistry::new();
        registry.add(card("Discover", 120.0, 19.99)).unwrap();
        registry.apply_payment("discover", 500.0).unwrap();
        assert_eq!(registry.get("Discover").unwrap().balance, 0.0);
    }

    #[test]
    fn payment_to_unknown_card_fails() {
        let mut registry = CardRegistry::new();
        let err = registry.apply_payment("Ghost", 10.0).unwrap_err();
        assert!(matches!(err, PayoffError::CardNotFound(_)));
    }

    #[test]
    fn active_cards_excludes_paid_off() {
        let mut registry = CardRegistry::new();
        registry.add(card("A", 0.0, 20.0)).unwrap();
        registry.add(card("B", 250.0, 15.0)).unwrap();
        let active = registry.active_cards();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].nickname, "B");
    }
}
