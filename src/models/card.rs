use serde::{Deserialize, Serialize};

use crate::scrapers::CardIdentity;

/// Catalog card as read from the `cards` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub series_code: String,
    pub card_number: String,
    pub rarity: String,
}

impl Card {
    pub fn identity(&self) -> CardIdentity {
        let identity = CardIdentity::new(&self.series_code, &self.card_number);
        if self.rarity.trim().is_empty() {
            identity
        } else {
            identity.with_rarity(&self.rarity)
        }
    }
}

/// Filters accepted by catalog reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub rarity: Option<String>,
}

impl CardFilter {
    pub fn rarity(rarity: impl Into<String>) -> Self {
        Self {
            rarity: Some(rarity.into()),
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        match &self.rarity {
            Some(rarity) => card.rarity == *rarity,
            None => true,
        }
    }
}
