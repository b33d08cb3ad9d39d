//! InvestLens HTTP backend.
//!
//! Three endpoints for the desktop overlay: a market summary for a ticker,
//! OCR over an uploaded screenshot, and a heuristic insight combining both.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, multipart::MultipartRejection, rejection::JsonRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use lens_core::LensError;
use market_snapshot::MarketSnapshotService;
use ocr_service::{OcrExtractor, TesseractCli};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use yahoo_client::{YahooConfig, YahooFinanceClient};

pub mod config;
mod health_routes;
mod insight_routes;
mod market_routes;
mod ocr_routes;
mod openapi;

pub use config::ServerConfig;


/// Shared, immutable per-process collaborators.
#[derive(Clone)]
pub struct AppState {
    pub market: MarketSnapshotService,
    pub ocr: OcrExtractor,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}

/// Handler error: a [`LensError`] rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct AppError(pub LensError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LensError::NoData(_) | LensError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            LensError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LensError::InvalidImage(_) | LensError::InvalidInput(_) | LensError::Extraction(_) => {
                StatusCode::BAD_REQUEST
            }
            LensError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LensError> for AppError {
    fn from(err: LensError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self(LensError::InvalidInput(rejection.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self(LensError::InvalidInput(rejection.body_text()))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self(LensError::InvalidInput(err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && !self.0.is_market_data() {
            tracing::error!("{}: {}", status, self.0);
        } else {
            tracing::warn!("{}: {}", status, self.0);
        }
        (status, Json(ErrorBody { detail: self.0.to_string() })).into_response()
    }
}

/// Uppercased ticker, or `InvalidInput` when the symbol cannot be one.
pub(crate) fn validate_ticker(raw: Option<&str>) -> Result<String, AppError> {
    let ticker = raw.map(str::trim).unwrap_or_default();
    if ticker.is_empty() {
        return Err(LensError::InvalidInput("`ticker` is required".to_string()).into());
    }
    let valid = ticker.len() <= 16
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if !valid {
        return Err(LensError::InvalidInput(format!("Invalid ticker symbol: {:?}", ticker)).into());
    }
    Ok(ticker.to_uppercase())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(health_routes::health_routes())
        .merge(market_routes::market_routes())
        .merge(ocr_routes::ocr_routes(config.max_upload_bytes))
        .merge(insight_routes::insight_routes())
        .merge(openapi::openapi_routes())
        .with_state(state)
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Log panics through tracing, then hand them to the previously installed hook.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("PANIC: {info}");
        previous(info);
    }));
}

/// Wire the real collaborators from `config`.
///
/// A missing OCR engine is not fatal: the server starts and the OCR endpoint
/// answers 503 until Tesseract is installed.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let yahoo = YahooFinanceClient::new(YahooConfig {
        chart_url: config.chart_url.clone(),
        timeout: config.market_timeout,
    })
    .context("Failed to create market data client")?;
    let market = MarketSnapshotService::new(Arc::new(yahoo));

    let ocr = match TesseractCli::detect(config.tesseract_cmd.clone(), config.tesseract_lang.clone()).await {
        Ok(engine) => OcrExtractor::new(Arc::new(engine)),
        Err(e) => {
            tracing::warn!("OCR disabled: {}", e);
            OcrExtractor::unavailable()
        }
    };

    Ok(AppState { market, ocr })
}

pub async fn run_server() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let state = build_state(&config).await?;
    tracing::info!(
        "Market data: {}, OCR: {}",
        state.market.provider_name(),
        state.ocr.engine_name().unwrap_or("unavailable")
    );

    let app = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    tracing::info!("InvestLens backend listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
