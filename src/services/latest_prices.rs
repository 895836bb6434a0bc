//! Latest price per card / per (card, condition).
//!
//! The reducers work on raw history so reads stay correct when the
//! `latest_card_prices` view is stale or missing. `LatestPriceReader` prefers
//! the view and falls back to reducing history.

use moka::future::Cache;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::models::price::PriceRecord;
use crate::services::price_store::{PriceStore, StoreError};

/// Keep the most recent record per key; ties keep the record seen first
pub fn latest_by<K, F>(records: &[PriceRecord], key: F) -> BTreeMap<K, PriceRecord>
where
    K: Ord,
    F: Fn(&PriceRecord) -> K,
{
    let mut ordered: Vec<&PriceRecord> = records.iter().collect();
    // Stable: equal timestamps keep their incoming order
    ordered.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));

    let mut latest = BTreeMap::new();
    for record in ordered {
        latest.entry(key(record)).or_insert_with(|| record.clone());
    }
    latest
}

pub fn latest_by_card_condition(records: &[PriceRecord]) -> BTreeMap<(String, String), PriceRecord> {
    latest_by(records, |r| (r.card_id.clone(), r.condition.clone()))
}

pub fn latest_by_card(records: &[PriceRecord]) -> BTreeMap<String, PriceRecord> {
    latest_by(records, |r| r.card_id.clone())
}

/// For the history of a single card
pub fn latest_by_condition(records: &[PriceRecord]) -> BTreeMap<String, PriceRecord> {
    latest_by(records, |r| r.condition.clone())
}

const ALL_KEY: &str = "all";
const PER_CARD_KEY: &str = "per_card";

#[derive(Clone)]
pub struct LatestPriceReader {
    store: Arc<dyn PriceStore>,
    cache: Cache<String, Arc<Vec<PriceRecord>>>,
}

impl LatestPriceReader {
    pub fn new(store: Arc<dyn PriceStore>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();

        Self { store, cache }
    }

    /// One price per card, the most recent across conditions
    pub async fn latest_per_card(&self) -> Result<Arc<Vec<PriceRecord>>, StoreError> {
        if let Some(cached) = self.cache.get(PER_CARD_KEY).await {
            return Ok(cached);
        }

        let rows = match self.store.latest_view(None).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!("Falling back to price history: {}", e);
                self.store.all_records().await?
            }
        };

        let latest = Arc::new(latest_by_card(&rows).into_values().collect::<Vec<_>>());
        self.cache.insert(PER_CARD_KEY.to_string(), latest.clone()).await;
        Ok(latest)
    }

    /// Every (card, condition) pair, ordered by card then condition
    pub async fn latest_per_card_condition(&self) -> Result<Arc<Vec<PriceRecord>>, StoreError> {
        if let Some(cached) = self.cache.get(ALL_KEY).await {
            return Ok(cached);
        }

        let latest = match self.store.latest_view(None).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!("Falling back to price history: {}", e);
                let history = self.store.all_records().await?;
                latest_by_card_condition(&history).into_values().collect()
            }
        };

        let latest = Arc::new(latest);
        self.cache.insert(ALL_KEY.to_string(), latest.clone()).await;
        Ok(latest)
    }

    /// Every condition of one card, ordered by condition
    pub async fn latest_for_card(&self, card_id: &str) -> Result<Arc<Vec<PriceRecord>>, StoreError> {
        let key = format!("card:{}", card_id);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let latest = match self.store.latest_view(Some(card_id)).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::debug!("Falling back to price history for {}: {}", card_id, e);
                let history = self.store.records_for_card(card_id).await?;
                latest_by_condition(&history).into_values().collect()
            }
        };

        let latest = Arc::new(latest);
        self.cache.insert(key, latest.clone()).await;
        Ok(latest)
    }

    /// Drop cached reads after new prices land
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
