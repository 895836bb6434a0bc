use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Row of `card_prices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: i64,
    pub card_id: String,
    pub price: i32,
    pub condition: String,
    pub source: String,
    pub fetched_at: NaiveDateTime,
    pub fetched_date: NaiveDate,
}

/// Insert shape for `card_prices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPriceRecord {
    pub card_id: String,
    pub price: i32,
    pub condition: String,
    pub source: String,
    pub fetched_at: NaiveDateTime,
    pub fetched_date: NaiveDate,
}

impl NewPriceRecord {
    pub fn new(
        card_id: impl Into<String>,
        price: i32,
        condition: impl Into<String>,
        source: impl Into<String>,
        fetched_at: NaiveDateTime,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            price,
            condition: condition.into(),
            source: source.into(),
            fetched_at,
            fetched_date: fetched_at.date(),
        }
    }
}

/// Response for the cron trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchPricesResponse {
    pub success: bool,
    pub message: String,
    pub mode: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub not_found: usize,
    pub no_listings: usize,
    pub fetch_failed: usize,
    pub inserted: usize,
    pub timestamp: String,
}
