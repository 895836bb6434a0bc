//! Storage seams for the card catalog and price history.
//!
//! `DbStore` (see `db_store`) backs these with PostgreSQL; `MemoryStore` keeps
//! everything in process for local runs and tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;

use crate::models::card::{Card, CardFilter};
use crate::models::price::{NewPriceRecord, PriceRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("Latest price view unavailable: {0}")]
    ViewUnavailable(String),

    #[error("Insert rejected: {0}")]
    Rejected(String),
}

/// Read access to the card catalog
#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Cards matching `filter`, oldest first
    async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError>;
}

/// Price history. The fetch job is the only writer.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Insert one batch as a unit and return the number of rows written
    async fn insert_batch(&self, batch: &[NewPriceRecord]) -> Result<usize, StoreError>;

    /// Remove the rows fetched on `date` for the given cards
    async fn delete_for_date(&self, date: NaiveDate, card_ids: &[String])
        -> Result<u64, StoreError>;

    /// Full history, newest first
    async fn all_records(&self) -> Result<Vec<PriceRecord>, StoreError>;

    /// History of one card, newest first
    async fn records_for_card(&self, card_id: &str) -> Result<Vec<PriceRecord>, StoreError>;

    /// Materialized latest row per (card, condition), ordered by card and condition
    async fn latest_view(&self, card_id: Option<&str>) -> Result<Vec<PriceRecord>, StoreError>;
}

fn newest_first(records: &mut [PriceRecord]) {
    records.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at).then(b.id.cmp(&a.id)));
}

#[derive(Default)]
struct MemoryPrices {
    next_id: i64,
    records: Vec<PriceRecord>,
}

/// In-process catalog and price history
#[derive(Default)]
pub struct MemoryStore {
    cards: RwLock<Vec<Card>>,
    prices: RwLock<MemoryPrices>,
    latest_view: RwLock<Option<Vec<PriceRecord>>>,
    insert_calls: Mutex<usize>,
    failing_inserts: Mutex<HashSet<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let store = Self::new();
        *store.cards.write() = cards;
        store
    }

    /// Publish a materialized latest-price view; without one `latest_view` errors
    pub fn set_latest_view(&self, rows: Option<Vec<PriceRecord>>) {
        *self.latest_view.write() = rows;
    }

    /// Make the `call_index`-th (0-based) insert_batch call fail
    pub fn fail_insert_call(&self, call_index: usize) {
        self.failing_inserts.lock().insert(call_index);
    }

    pub fn insert_calls(&self) -> usize {
        *self.insert_calls.lock()
    }

    pub fn len(&self) -> usize {
        self.prices.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CardCatalog for MemoryStore {
    async fn list_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .cards
            .read()
            .iter()
            .filter(|card| filter.matches(card))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn insert_batch(&self, batch: &[NewPriceRecord]) -> Result<usize, StoreError> {
        let call = {
            let mut calls = self.insert_calls.lock();
            let call = *calls;
            *calls += 1;
            call
        };

        if self.failing_inserts.lock().contains(&call) {
            return Err(StoreError::Rejected(format!("insert call {} rejected", call)));
        }

        let mut prices = self.prices.write();
        for record in batch {
            prices.next_id += 1;
            let id = prices.next_id;
            prices.records.push(PriceRecord {
                id,
                card_id: record.card_id.clone(),
                price: record.price,
                condition: record.condition.clone(),
                source: record.source.clone(),
                fetched_at: record.fetched_at,
                fetched_date: record.fetched_date,
            });
        }

        Ok(batch.len())
    }

    async fn delete_for_date(
        &self,
        date: NaiveDate,
        card_ids: &[String],
    ) -> Result<u64, StoreError> {
        let ids: HashSet<&str> = card_ids.iter().map(String::as_str).collect();
        let mut prices = self.prices.write();
        let before = prices.records.len();
        prices
            .records
            .retain(|r| !(r.fetched_date == date && ids.contains(r.card_id.as_str())));
        Ok((before - prices.records.len()) as u64)
    }

    async fn all_records(&self) -> Result<Vec<PriceRecord>, StoreError> {
        let mut records = self.prices.read().records.clone();
        newest_first(&mut records);
        Ok(records)
    }

    async fn records_for_card(&self, card_id: &str) -> Result<Vec<PriceRecord>, StoreError> {
        let mut records: Vec<PriceRecord> = self
            .prices
            .read()
            .records
            .iter()
            .filter(|r| r.card_id == card_id)
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn latest_view(&self, card_id: Option<&str>) -> Result<Vec<PriceRecord>, StoreError> {
        let view = self.latest_view.read();
        let rows = view
            .as_ref()
            .ok_or_else(|| StoreError::ViewUnavailable("no materialized view".to_string()))?;

        let mut rows: Vec<PriceRecord> = rows
            .iter()
            .filter(|r| card_id.is_none_or(|id| r.card_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.card_id
                .cmp(&b.card_id)
                .then_with(|| a.condition.cmp(&b.condition))
        });
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn card(id: &str, rarity: &str) -> Card {
        Card {
            id: id.to_string(),
            name: format!("Card {}", id),
            series_code: "sv1s".to_string(),
            card_number: "1".to_string(),
            rarity: rarity.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_cards_filters_by_rarity() {
        let store = MemoryStore::with_cards(vec![card("a", "AR"), card("b", "SR"), card("c", "AR")]);

        let ars = store.list_cards(&CardFilter::rarity("AR")).await.unwrap();
        assert_eq!(ars.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);

        let all = store.list_cards(&CardFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_for_date_only_touches_listed_cards() {
        let store = MemoryStore::new();
        store
            .insert_batch(&[
                NewPriceRecord::new("a", 100, "normal", "cardrush", at("2026-10-17 06:00:00")),
                NewPriceRecord::new("a", 110, "normal", "cardrush", at("2026-10-18 06:00:00")),
                NewPriceRecord::new("b", 200, "normal", "cardrush", at("2026-10-18 06:00:00")),
            ])
            .await
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let removed = store.delete_for_date(date, &["a".to_string()]).await.unwrap();

        assert_eq!(removed, 1);
        let left = store.all_records().await.unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|r| !(r.card_id == "a" && r.fetched_date == date)));
    }

    #[tokio::test]
    async fn test_records_newest_first() {
        let store = MemoryStore::new();
        store
            .insert_batch(&[
                NewPriceRecord::new("a", 100, "normal", "cardrush", at("2026-10-16 06:00:00")),
                NewPriceRecord::new("a", 120, "normal", "cardrush", at("2026-10-18 06:00:00")),
                NewPriceRecord::new("b", 999, "normal", "cardrush", at("2026-10-17 06:00:00")),
            ])
            .await
            .unwrap();

        let records = store.records_for_card("a").await.unwrap();
        assert_eq!(records.iter().map(|r| r.price).collect::<Vec<_>>(), vec![120, 100]);
    }

    #[tokio::test]
    async fn test_failing_insert_call() {
        let store = MemoryStore::new();
        store.fail_insert_call(0);

        let batch = [NewPriceRecord::new("a", 100, "normal", "mock", at("2026-10-18 06:00:00"))];
        assert!(store.insert_batch(&batch).await.is_err());
        assert_eq!(store.insert_batch(&batch).await.unwrap(), 1);
        assert_eq!(store.insert_calls(), 2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_latest_view_unavailable_by_default() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.latest_view(None).await,
            Err(StoreError::ViewUnavailable(_))
        ));
    }
}
