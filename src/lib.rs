// src/lib.rs

use std::sync::Arc;

use config::AppConfig;
use jobs::price_fetch::PriceFetchJob;
use scrapers::{CardRushClient, ScrapeError};
use services::latest_prices::LatestPriceReader;
use services::notifier::{LogNotifier, Notifier, WebhookNotifier};
use services::price_store::{CardCatalog, PriceStore};

#[derive(Clone)]
pub struct AppState {
    pub prices: LatestPriceReader,
    pub fetch_job: Arc<PriceFetchJob>,
    pub cron_secret: Option<String>,
}

pub mod entities {
    pub mod prelude;
    pub mod card_prices;
    pub mod cards;
    pub mod latest_card_prices;
}

pub mod services {
    pub mod db_store;
    pub mod latest_prices;
    pub mod mock_price;
    pub mod notifier;
    pub mod price_store;
}

pub mod config;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod scrapers;

/// Wire the fetch job from configuration: CardRush client, notifier, stores
pub fn fetch_job_from_config<S>(
    config: &AppConfig,
    store: Arc<S>,
    reader: Option<LatestPriceReader>,
) -> Result<PriceFetchJob, ScrapeError>
where
    S: CardCatalog + PriceStore + 'static,
{
    let client = CardRushClient::new(&config.scraper)?;
    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    };

    let job = PriceFetchJob::new(
        store.clone(),
        store,
        Arc::new(client),
        notifier,
        config.fetch.clone(),
    )
    .with_series_totals(config.series_totals.clone());

    Ok(match reader {
        Some(reader) => job.with_reader(reader),
        None => job,
    })
}
