//! Run summaries for whoever watches the fetch job.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a run summary. Delivery problems are logged, never returned.
    async fn notify(&self, message: &str, success: bool);
}

/// Writes summaries to the log only
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str, success: bool) {
        if success {
            tracing::info!("[Notify] {}", message);
        } else {
            tracing::error!("[Notify] {}", message);
        }
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    success: bool,
}

/// Posts `{"text", "success"}` JSON to a chat webhook
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, url }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str, success: bool) {
        let payload = WebhookPayload {
            text: message,
            success,
        };

        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Notification delivered");
            }
            Ok(response) => {
                tracing::warn!("Notification webhook returned {}", response.status());
            }
            Err(e) => {
                tracing::warn!("Failed to deliver notification: {}", e);
            }
        }
    }
}
