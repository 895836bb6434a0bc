//! Price fetch job: walks the card catalog, resolves a price set per card and
//! stores the day's records.
//!
//! Cards are handled one at a time with a pause after every scrape; no two
//! requests to CardRush are ever in flight together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};
use tracing::Instrument;
use uuid::Uuid;

use crate::models::card::{Card, CardFilter};
use crate::models::price::{FetchPricesResponse, NewPriceRecord};
use crate::scrapers::parser::DEFAULT_CONDITION;
use crate::scrapers::{extract_prices, Extraction, ListingSource, ScrapedPriceEntry, SeriesTotals};
use crate::services::latest_prices::LatestPriceReader;
use crate::services::mock_price::{mock_price, MOCK_SOURCE};
use crate::services::notifier::Notifier;
use crate::services::price_store::{CardCatalog, PriceStore, StoreError};

pub const BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    Scrape,
    Mock,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Scrape => write!(f, "scrape"),
            FetchMode::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scrape" => Ok(FetchMode::Scrape),
            "mock" => Ok(FetchMode::Mock),
            other => Err(format!("unknown fetch mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceFetchConfig {
    pub mode: FetchMode,
    /// Pause after each scraped card
    pub delay: Duration,
    /// Cards attempted per run; the rest wait for the next run
    pub max_items: Option<usize>,
    pub batch_size: usize,
    pub rarity: Option<String>,
}

impl Default for PriceFetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Mock,
            delay: Duration::from_millis(1000),
            max_items: None,
            batch_size: BATCH_SIZE,
            rarity: None,
        }
    }
}

/// What happened to one card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Number of prices collected
    Priced(usize),
    /// The card never appeared in the results
    NotFound,
    /// The card appeared but no listing carried a usable price
    NoListings,
    /// Network error, non-2xx response or an unusable card pattern
    FetchFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchSummary {
    pub mode: FetchMode,
    pub attempted: usize,
    pub succeeded: usize,
    pub not_found: usize,
    pub no_listings: usize,
    pub fetch_failed: usize,
    /// Records produced by the run
    pub records: usize,
    /// Records that made it into the store
    pub inserted: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl FetchSummary {
    fn new(mode: FetchMode) -> Self {
        let now = Utc::now();
        Self {
            mode,
            attempted: 0,
            succeeded: 0,
            not_found: 0,
            no_listings: 0,
            fetch_failed: 0,
            records: 0,
            inserted: 0,
            started_at: now,
            finished_at: now,
        }
    }

    fn record(&mut self, outcome: ItemOutcome) {
        self.attempted += 1;
        match outcome {
            ItemOutcome::Priced(count) => {
                self.succeeded += 1;
                self.records += count;
            }
            ItemOutcome::NotFound => self.not_found += 1,
            ItemOutcome::NoListings => self.no_listings += 1,
            ItemOutcome::FetchFailed => self.fetch_failed += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.not_found + self.no_listings + self.fetch_failed
    }

    pub fn message(&self) -> String {
        format!(
            "Price fetch ({}): {} cards attempted, {} succeeded, {} failed, {} prices saved",
            self.mode,
            self.attempted,
            self.succeeded,
            self.failed(),
            self.inserted
        )
    }
}

impl From<&FetchSummary> for FetchPricesResponse {
    fn from(summary: &FetchSummary) -> Self {
        Self {
            success: true,
            message: summary.message(),
            mode: summary.mode.to_string(),
            attempted: summary.attempted,
            succeeded: summary.succeeded,
            failed: summary.failed(),
            not_found: summary.not_found,
            no_listings: summary.no_listings,
            fetch_failed: summary.fetch_failed,
            inserted: summary.inserted,
            timestamp: summary.finished_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to load cards: {0}")]
    Catalog(#[source] StoreError),

    #[error("A price fetch run is already in progress")]
    AlreadyRunning,
}

pub struct PriceFetchJob {
    catalog: Arc<dyn CardCatalog>,
    store: Arc<dyn PriceStore>,
    source: Arc<dyn ListingSource>,
    notifier: Arc<dyn Notifier>,
    totals: SeriesTotals,
    config: PriceFetchConfig,
    reader: Option<LatestPriceReader>,
    run_lock: Mutex<()>,
}

impl PriceFetchJob {
    pub fn new(
        catalog: Arc<dyn CardCatalog>,
        store: Arc<dyn PriceStore>,
        source: Arc<dyn ListingSource>,
        notifier: Arc<dyn Notifier>,
        config: PriceFetchConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            source,
            notifier,
            totals: SeriesTotals::default(),
            config,
            reader: None,
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_series_totals(mut self, totals: SeriesTotals) -> Self {
        self.totals = totals;
        self
    }

    /// Reader whose cache is dropped after each run
    pub fn with_reader(mut self, reader: LatestPriceReader) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn config(&self) -> &PriceFetchConfig {
        &self.config
    }

    /// Run once over the configured catalog slice.
    ///
    /// Per-card failures only show up in the counts. Errors returned here are
    /// run-level and have already been logged and notified.
    pub async fn run(&self) -> Result<FetchSummary, PipelineError> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            tracing::warn!("Price fetch requested while another run is in progress");
            return Err(PipelineError::AlreadyRunning);
        };

        let span = tracing::info_span!(
            "price_fetch",
            run_id = %Uuid::new_v4(),
            mode = %self.config.mode
        );

        async {
            match self.run_inner().await {
                Ok(summary) => {
                    tracing::info!("{}", summary.message());
                    if let Some(reader) = &self.reader {
                        reader.invalidate();
                    }
                    self.notifier.notify(&summary.message(), true).await;
                    Ok(summary)
                }
                Err(e) => {
                    tracing::error!("Price fetch failed: {}", e);
                    self.notifier
                        .notify(
                            &format!("Price fetch ({}) failed: {}", self.config.mode, e),
                            false,
                        )
                        .await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_inner(&self) -> Result<FetchSummary, PipelineError> {
        let filter = CardFilter {
            rarity: self.config.rarity.clone(),
        };
        let cards = self
            .catalog
            .list_cards(&filter)
            .await
            .map_err(PipelineError::Catalog)?;

        let limit = self
            .config
            .max_items
            .map_or(cards.len(), |cap| cap.min(cards.len()));
        let cards = &cards[..limit];

        tracing::info!("Fetching prices for {} cards", cards.len());

        let mut summary = FetchSummary::new(self.config.mode);
        let today = summary.started_at.date_naive();
        let mut records = Vec::new();

        for (index, card) in cards.iter().enumerate() {
            let outcome = match self.config.mode {
                FetchMode::Mock => {
                    records.push(record_for(
                        card,
                        mock_price(&card.id),
                        DEFAULT_CONDITION,
                        MOCK_SOURCE,
                        today,
                    ));
                    ItemOutcome::Priced(1)
                }
                FetchMode::Scrape => {
                    let outcome = self.scrape_card(card, today, &mut records).await;
                    if !self.config.delay.is_zero() {
                        tokio::time::sleep(self.config.delay).await;
                    }
                    outcome
                }
            };

            let progress = format!("[{}/{}]", index + 1, cards.len());
            match outcome {
                ItemOutcome::Priced(count) => {
                    tracing::debug!("{} {} - {} prices", progress, card.name, count)
                }
                ItemOutcome::NotFound => {
                    tracing::info!("{} {} - not listed", progress, card.name)
                }
                ItemOutcome::NoListings => {
                    tracing::info!("{} {} - no priced listings", progress, card.name)
                }
                ItemOutcome::FetchFailed => {
                    tracing::warn!("{} {} - fetch failed", progress, card.name)
                }
            }

            summary.record(outcome);
        }

        tracing::info!(
            "Fetched {} cards: {} succeeded, {} not found, {} without listings, {} fetch errors, {} records",
            summary.attempted,
            summary.succeeded,
            summary.not_found,
            summary.no_listings,
            summary.fetch_failed,
            summary.records
        );

        summary.inserted = self.persist(&records, today).await;
        summary.finished_at = Utc::now();

        Ok(summary)
    }

    async fn scrape_card(
        &self,
        card: &Card,
        today: NaiveDate,
        records: &mut Vec<NewPriceRecord>,
    ) -> ItemOutcome {
        let identity = card.identity();
        let query = identity.search_query(Some(&self.totals));

        let html = match self.source.search(&query).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(card_id = %card.id, query = %query, "Search failed: {}", e);
                return ItemOutcome::FetchFailed;
            }
        };

        let extraction = match extract_prices(&html, &identity, Some(&self.totals)) {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::error!(card_id = %card.id, "Invalid card pattern: {}", e);
                return ItemOutcome::FetchFailed;
            }
        };

        match extraction {
            Extraction::NotFound => ItemOutcome::NotFound,
            Extraction::Listings(listings) if listings.is_empty() => ItemOutcome::NoListings,
            Extraction::Listings(listings) => {
                let count = listings.len();
                for listing in listings {
                    let entry = ScrapedPriceEntry::from_listing(&identity, listing);
                    records.push(record_for(
                        card,
                        entry.price,
                        &entry.condition,
                        &entry.source,
                        today,
                    ));
                }
                ItemOutcome::Priced(count)
            }
        }
    }

    /// Replace today's rows for the fetched cards and insert in batches.
    /// Returns the number of rows inserted.
    async fn persist(&self, records: &[NewPriceRecord], today: NaiveDate) -> usize {
        if records.is_empty() {
            tracing::info!("No price records to save");
            return 0;
        }

        let mut card_ids: Vec<String> = records.iter().map(|r| r.card_id.clone()).collect();
        card_ids.sort();
        card_ids.dedup();

        match self.store.delete_for_date(today, &card_ids).await {
            Ok(deleted) => {
                tracing::debug!("Removed {} existing price rows for {}", deleted, today)
            }
            Err(e) => tracing::error!("Failed to clear prices for {}: {}", today, e),
        }

        let batch_size = self.config.batch_size.max(1);
        let mut inserted = 0;

        for (index, batch) in records.chunks(batch_size).enumerate() {
            match self.store.insert_batch(batch).await {
                Ok(count) => inserted += count,
                Err(e) => {
                    tracing::error!("Batch insert error at {}: {}", index * batch_size, e);
                    continue;
                }
            }
        }

        tracing::info!("Saved {} of {} price records", inserted, records.len());
        inserted
    }
}

fn record_for(
    card: &Card,
    price: i32,
    condition: &str,
    source: &str,
    today: NaiveDate,
) -> NewPriceRecord {
    NewPriceRecord {
        card_id: card.id.clone(),
        price,
        condition: condition.to_string(),
        source: source.to_string(),
        fetched_at: Utc::now().naive_utc(),
        fetched_date: today,
    }
}

/// Run the job on a fixed interval, first run immediately
pub async fn start_price_fetch_job(job: Arc<PriceFetchJob>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = interval(every);

        loop {
            interval.tick().await;
            tracing::info!("Starting scheduled price fetch");

            if let Err(e) = job.run().await {
                tracing::error!("Scheduled price fetch failed: {}", e);
            }
        }
    });
}
