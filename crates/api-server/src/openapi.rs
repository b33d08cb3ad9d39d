use axum::{routing::get, Json, Router};
use lens_core::{InsightResponse, MarketSummary, OcrResult, Sentiment};
use utoipa::OpenApi;

use crate::health_routes::{self, HealthResponse};
use crate::insight_routes::{self, InsightRequest};
use crate::market_routes;
use crate::ocr_routes::{self, OcrUpload};
use crate::{AppState, ErrorBody};

#[derive(OpenApi)]
#[openapi(
    info(title = "InvestLens Backend", version = "0.2.0"),
    paths(
        health_routes::healthcheck,
        market_routes::market_summary,
        ocr_routes::ocr_extract,
        insight_routes::generate_trading_insight
    ),
    components(schemas(
        HealthResponse,
        MarketSummary,
        OcrResult,
        OcrUpload,
        InsightRequest,
        InsightResponse,
        Sentiment,
        ErrorBody
    )),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Market", description = "Market snapshots"),
        (name = "OCR", description = "Screenshot text extraction"),
        (name = "Insights", description = "Heuristic insights")
    )
)]
pub struct ApiDoc;

pub fn openapi_routes() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
