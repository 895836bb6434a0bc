mod common;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;

use card_price_backend::jobs::price_fetch::{FetchMode, PriceFetchJob};
use card_price_backend::scrapers::{CardRushClient, ListingSource, ScrapeError, ScraperConfig};
use card_price_backend::services::price_store::{MemoryStore, PriceStore};

use crate::common::{card, fetch_config, listing_page, RecordingNotifier};

/// Stand-in for the CardRush product list
async fn product_list(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, StatusCode> {
    if !headers.contains_key("user-agent") || !headers.contains_key("accept-language") {
        return Err(StatusCode::FORBIDDEN);
    }

    match params.get("keyword").map(String::as_str) {
        Some("【AR】{079/078} [SV1S]") => Ok(listing_page(&[
            ("ピカチュウ【AR】{079/078} [SV1S]", Some("1,480円")),
            ("〔状態B〕ピカチュウ【AR】{079/078} [SV1S]", Some("980円")),
        ])),
        Some("broken") => Err(StatusCode::SERVICE_UNAVAILABLE),
        _ => Ok(listing_page(&[])),
    }
}

async fn spawn_server() -> String {
    let app = Router::new().route("/product-list", get(product_list));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(base_url: &str) -> CardRushClient {
    CardRushClient::new(&ScraperConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_search_returns_page() {
    let base_url = spawn_server().await;

    let html = client(&base_url)
        .search("【AR】{079/078} [SV1S]")
        .await
        .unwrap();

    assert!(html.contains("{079/078}"));
    assert!(html.contains("1,480円"));
}

#[tokio::test]
async fn test_search_non_success_status() {
    let base_url = spawn_server().await;

    let err = client(&base_url).search("broken").await.unwrap_err();
    match err {
        ScrapeError::Status { status, url } => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/product-list?keyword=broken"));
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_unreachable_host() {
    // Nothing listens on the discard port
    let err = client("http://127.0.0.1:9").search("anything").await.unwrap_err();
    assert!(matches!(err, ScrapeError::Http(_)));
}

/// Full scrape run against the local product list
#[tokio::test]
async fn test_scrape_run_end_to_end() {
    let base_url = spawn_server().await;

    let store = Arc::new(MemoryStore::with_cards(vec![
        card("sv1s-079", "sv1s", "79", "AR"),
        card("sv1s-080", "sv1s", "80", "AR"),
    ]));
    let notifier = Arc::new(RecordingNotifier::default());
    let job = PriceFetchJob::new(
        store.clone(),
        store.clone(),
        Arc::new(client(&base_url)),
        notifier.clone(),
        fetch_config(FetchMode::Scrape),
    );

    let summary = job.run().await.unwrap();
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.inserted, 2);

    let records = store.records_for_card("sv1s-079").await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.source == "cardrush"));
    assert!(records.iter().any(|r| r.condition == "B" && r.price == 980));

    assert_eq!(notifier.messages.lock().len(), 1);
}
