use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::models::price::PriceRecord;
use crate::models::ErrorResponse;
use crate::services::price_store::StoreError;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn store_error(e: StoreError) -> ApiError {
    tracing::error!("Failed to read prices: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Handler for GET /api/prices
/// Latest price per card
pub async fn get_latest_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceRecord>>, ApiError> {
    let prices = state.prices.latest_per_card().await.map_err(store_error)?;
    Ok(Json(prices.as_ref().clone()))
}

/// Handler for GET /api/prices/all
/// Latest price per card and condition
pub async fn get_all_latest_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceRecord>>, ApiError> {
    let prices = state
        .prices
        .latest_per_card_condition()
        .await
        .map_err(store_error)?;
    Ok(Json(prices.as_ref().clone()))
}

/// Handler for GET /api/prices/{card_id}
/// Latest price of each condition for one card
pub async fn get_card_prices(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<Vec<PriceRecord>>, ApiError> {
    let prices = state
        .prices
        .latest_for_card(&card_id)
        .await
        .map_err(store_error)?;
    Ok(Json(prices.as_ref().clone()))
}
