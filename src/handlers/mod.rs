pub mod cron;
pub mod prices;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route(
            "/api/cron/fetch-prices",
            get(cron::fetch_prices).post(cron::fetch_prices),
        )
        .route("/api/prices", get(prices::get_latest_prices))
        .route("/api/prices/all", get(prices::get_all_latest_prices))
        .route("/api/prices/{card_id}", get(prices::get_card_prices))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "Card price backend is running"
}
