//! Runtime configuration, read from the environment (and `.env` via dotenvy).

use std::env;
use std::time::Duration;

use crate::jobs::price_fetch::{FetchMode, PriceFetchConfig, BATCH_SIZE};
use crate::scrapers::{ScraperConfig, SeriesTotals, CARDRUSH_BASE_URL};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Bearer token for the cron trigger; the trigger is open when unset
    pub cron_secret: Option<String>,
    pub fetch: PriceFetchConfig,
    /// Enables the in-process scheduler
    pub fetch_interval: Option<Duration>,
    pub scraper: ScraperConfig,
    /// Built-in series totals plus `SERIES_TOTALS` overrides
    pub series_totals: SeriesTotals,
    pub notify_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mode = match get("PRICE_FETCH_MODE") {
            Some(value) => value.parse::<FetchMode>().map_err(|_| ConfigError::Invalid {
                name: "PRICE_FETCH_MODE",
                value,
            })?,
            None => FetchMode::Mock,
        };

        let delay_ms = parse_number(&get, "PRICE_FETCH_DELAY_MS")?.unwrap_or(1000);
        let max_items = parse_number(&get, "PRICE_FETCH_MAX_ITEMS")?.map(|n| n as usize);
        let interval_secs = parse_number(&get, "PRICE_FETCH_INTERVAL_SECS")?;
        let timeout_secs = parse_number(&get, "SCRAPE_TIMEOUT_SECS")?.unwrap_or(30);

        let mut series_totals = SeriesTotals::default();
        if let Some(value) = get("SERIES_TOTALS") {
            series_totals
                .apply_overrides(&value)
                .map_err(|_| ConfigError::Invalid {
                    name: "SERIES_TOTALS",
                    value,
                })?;
        }

        Ok(Self {
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            cron_secret: get("CRON_SECRET"),
            fetch: PriceFetchConfig {
                mode,
                delay: Duration::from_millis(delay_ms),
                max_items,
                batch_size: BATCH_SIZE,
                rarity: get("PRICE_FETCH_RARITY"),
            },
            fetch_interval: interval_secs.filter(|s| *s > 0).map(Duration::from_secs),
            scraper: ScraperConfig {
                base_url: get("CARDRUSH_BASE_URL").unwrap_or_else(|| CARDRUSH_BASE_URL.to_string()),
                timeout_secs,
            },
            series_totals,
            notify_webhook_url: get("NOTIFY_WEBHOOK_URL"),
        })
    }
}

fn parse_number<G>(get: &G, name: &'static str) -> Result<Option<u64>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(None),
    }
}
