//! Market summary endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use lens_core::MarketSummary;
use serde::Deserialize;

use crate::{validate_ticker, AppError, AppState, ErrorBody};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct SummaryQuery {
    /// Ticker symbol, e.g. AAPL
    #[serde(default)]
    pub ticker: Option<String>,
}

pub fn market_routes() -> Router<AppState> {
    Router::new().route("/market/summary", get(market_summary))
}

/// Return latest price movement details for a ticker symbol.
#[utoipa::path(
    get,
    path = "/market/summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Latest market snapshot", body = MarketSummary),
        (status = 400, description = "Missing or malformed ticker", body = ErrorBody),
        (status = 503, description = "Market data temporarily unavailable", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody)
    ),
    tag = "Market"
)]
pub async fn market_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<MarketSummary>, AppError> {
    let ticker = validate_ticker(query.ticker.as_deref())?;
    let summary = state.market.fetch_summary(&ticker).await?;
    Ok(Json(summary))
}
