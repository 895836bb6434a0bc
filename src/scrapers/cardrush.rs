use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{ScrapeError, ScraperConfig};

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "ja,en;q=0.9";

/// Something that answers a keyword search with a results page
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, ScrapeError>;
}

#[derive(Clone)]
pub struct CardRushClient {
    client: Client,
    base_url: String,
}

impl CardRushClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/product-list?keyword={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl ListingSource for CardRushClient {
    /// Single GET against the product list; no retries
    async fn search(&self, query: &str) -> Result<String, ScrapeError> {
        let url = self.search_url(query);
        tracing::debug!("[Scrape] Query: \"{}\" URL: {}", query, url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScrapeError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let html = response.text().await?;
        tracing::debug!("[Scrape] HTML length: {} chars", html.len());

        Ok(html)
    }
}
