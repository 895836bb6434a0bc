//! Cron trigger for the price fetch job
//!
//! GET|POST /api/cron/fetch-prices, guarded by `Authorization: Bearer <CRON_SECRET>`.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use tracing::{error, warn};

use crate::jobs::price_fetch::PipelineError;
use crate::models::price::FetchPricesResponse;
use crate::models::ErrorResponse;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Bearer check against the configured secret; no secret means no gate
pub fn check_cron_auth(headers: &HeaderMap, secret: Option<&str>) -> Result<(), ApiError> {
    let Some(secret) = secret else {
        return Ok(());
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided != format!("Bearer {}", secret) {
        warn!("Rejected cron request with invalid or missing bearer token");
        return Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    Ok(())
}

/// Run the price fetch job once and report its summary
pub async fn fetch_prices(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FetchPricesResponse>, ApiError> {
    check_cron_auth(&headers, state.cron_secret.as_deref())?;

    match state.fetch_job.run().await {
        Ok(summary) => Ok(Json(FetchPricesResponse::from(&summary))),
        Err(PipelineError::AlreadyRunning) => Err(api_error(
            StatusCode::CONFLICT,
            "A price fetch run is already in progress",
        )),
        Err(e) => {
            error!("Cron job error: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ))
        }
    }
}
