//! Insight generation endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use lens_core::InsightResponse;
use serde::Deserialize;

use crate::{validate_ticker, AppError, AppState, ErrorBody};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InsightRequest {
    #[schema(example = "AAPL")]
    pub ticker: String,
    /// Optional OCR text to provide additional context
    #[serde(default)]
    pub ocr_text: Option<String>,
}

pub fn insight_routes() -> Router<AppState> {
    Router::new().route("/insights/generate", post(generate_trading_insight))
}

/// Produce a quick insight combining OCR context and market data.
#[utoipa::path(
    post,
    path = "/insights/generate",
    request_body = InsightRequest,
    responses(
        (status = 200, description = "Generated insight", body = InsightResponse),
        (status = 400, description = "Malformed request body or ticker", body = ErrorBody),
        (status = 503, description = "Upstream data temporarily unavailable", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody)
    ),
    tag = "Insights"
)]
pub async fn generate_trading_insight(
    State(state): State<AppState>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<InsightResponse>, AppError> {
    let Json(payload) = payload?;
    let ticker = validate_ticker(Some(&payload.ticker))?;

    let summary = state.market.fetch_summary(&ticker).await?;
    let insight = insight_engine::generate_insight(summary, payload.ocr_text.as_deref());
    tracing::info!("{}: {} insight", insight.ticker, insight.sentiment);

    Ok(Json(insight))
}
