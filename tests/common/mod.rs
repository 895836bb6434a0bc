#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use card_price_backend::jobs::price_fetch::{FetchMode, PriceFetchConfig, PriceFetchJob};
use card_price_backend::models::card::Card;
use card_price_backend::scrapers::{ListingSource, ScrapeError};
use card_price_backend::services::latest_prices::LatestPriceReader;
use card_price_backend::services::notifier::Notifier;
use card_price_backend::services::price_store::MemoryStore;
use card_price_backend::AppState;

pub const CRON_SECRET: &str = "test-secret";

pub fn card(id: &str, series_code: &str, card_number: &str, rarity: &str) -> Card {
    Card {
        id: id.to_string(),
        name: format!("Card {}", id),
        series_code: series_code.to_string(),
        card_number: card_number.to_string(),
        rarity: rarity.to_string(),
    }
}

/// A small catalog: two regular cards and one promo
pub fn sample_cards() -> Vec<Card> {
    vec![
        card("sv1s-079", "sv1s", "079", "AR"),
        card("sv2a-201", "sv2a", "201", "SAR"),
        card("promo-232", "promo", "232", "PR"),
    ]
}

/// Results page in the CardRush product-list layout
pub fn listing_page(items: &[(&str, Option<&str>)]) -> String {
    let mut html = String::from("<html><body><ul class=\"item_list\">");
    for (title, price) in items {
        html.push_str("<li class=\"list_item_cell\"><div class=\"item_data\">");
        html.push_str(&format!("<span class=\"goods_name\">{}</span>", title));
        if let Some(price) = price {
            html.push_str(&format!(
                "<p class=\"selling_price\"><span class=\"figure\">{}</span></p>",
                price
            ));
        }
        html.push_str("</div></li>");
    }
    html.push_str("</ul></body></html>");
    html
}

/// Canned pages keyed by search query; unknown queries get an empty page
#[derive(Default)]
pub struct CannedSource {
    pages: HashMap<String, String>,
    pub queries: Mutex<Vec<String>>,
}

impl CannedSource {
    pub fn with_page(mut self, query: &str, html: String) -> Self {
        self.pages.insert(query.to_string(), html);
        self
    }
}

#[async_trait]
impl ListingSource for CannedSource {
    async fn search(&self, query: &str) -> Result<String, ScrapeError> {
        self.queries.lock().push(query.to_string());
        Ok(self
            .pages
            .get(query)
            .cloned()
            .unwrap_or_else(|| listing_page(&[])))
    }
}

/// Holds the first search until released, so a run can be kept open
#[derive(Default)]
pub struct GatedSource {
    pub started: Notify,
    pub release: Notify,
    gated: AtomicBool,
}

#[async_trait]
impl ListingSource for GatedSource {
    async fn search(&self, _query: &str) -> Result<String, ScrapeError> {
        if !self.gated.swap(true, Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        Ok(listing_page(&[]))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, bool)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str, success: bool) {
        self.messages.lock().push((message.to_string(), success));
    }
}

pub fn fetch_config(mode: FetchMode) -> PriceFetchConfig {
    PriceFetchConfig {
        mode,
        delay: Duration::ZERO,
        ..PriceFetchConfig::default()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

/// AppState over an in-memory store; the cron route requires `CRON_SECRET`
pub fn test_app(
    store: Arc<MemoryStore>,
    source: Arc<dyn ListingSource>,
    config: PriceFetchConfig,
) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let reader = LatestPriceReader::new(store.clone(), Duration::from_secs(60));
    let job = PriceFetchJob::new(store.clone(), store.clone(), source, notifier.clone(), config)
        .with_reader(reader.clone());

    TestApp {
        state: AppState {
            prices: reader,
            fetch_job: Arc::new(job),
            cron_secret: Some(CRON_SECRET.to_string()),
        },
        store,
        notifier,
    }
}
