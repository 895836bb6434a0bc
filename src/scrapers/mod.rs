pub mod cardrush;
pub mod identifier;
pub mod parser;

use serde::{Deserialize, Serialize};

pub use cardrush::{CardRushClient, ListingSource};
pub use identifier::{format_search_query, CardIdentity, SeriesTotal, SeriesTotals};
pub use parser::{extract_prices, Extraction, PriceListing};

pub const CARDRUSH_SOURCE: &str = "cardrush";
pub const CARDRUSH_BASE_URL: &str = "https://www.cardrush-pokemon.jp";

/// One price scraped for one card at one condition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapedPriceEntry {
    pub card_number: String,
    pub series_code: String,
    pub price: i32,
    pub condition: String,
    pub source: String,
}

impl ScrapedPriceEntry {
    pub fn from_listing(identity: &CardIdentity, listing: PriceListing) -> Self {
        Self {
            card_number: identity.card_number.clone(),
            series_code: identity.series_code.clone(),
            price: listing.price,
            condition: listing.condition,
            source: CARDRUSH_SOURCE.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScraperConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: CARDRUSH_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CardRush returned status {status} for {url}")]
    Status { status: u16, url: String },
}
