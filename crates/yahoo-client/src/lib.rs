//! Yahoo Finance chart API client.
//!
//! Serves the intraday and daily OHLCV windows behind
//! [`lens_core::MarketDataProvider`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use lens_core::{HistoryWindow, LensError, LensResult, MarketDataProvider, PriceBar};
use serde::Deserialize;

pub const DEFAULT_CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub chart_url: String,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            chart_url: DEFAULT_CHART_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
    chart_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl YahooFinanceClient {
    pub fn new(config: YahooConfig) -> LensResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| LensError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            chart_url: config.chart_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get chart bars for a symbol, oldest first
    pub async fn get_chart(&self, symbol: &str, range: &str, interval: &str) -> LensResult<Vec<PriceBar>> {
        let url = format!("{}/{}", self.chart_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", interval), ("includePrePost", "false")])
            .send()
            .await
            .map_err(|e| LensError::Upstream(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LensError::Upstream(e.to_string()))?;

        if status == reqwest::StatusCode::NOT_FOUND {
            // unknown symbols come back as 404 with a chart-level error
            return match parse_chart(&body) {
                Err(err @ LensError::NoData(_)) => Err(err),
                _ => Err(LensError::NoData(format!("No data found for {}", symbol))),
            };
        }
        if !status.is_success() {
            tracing::warn!("Yahoo chart {} ({}/{}) returned HTTP {}", symbol, range, interval, status);
            return Err(LensError::Upstream(format!("HTTP {}", status)));
        }

        parse_chart(&body)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn history(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<PriceBar>, LensError> {
        self.get_chart(symbol, window.range(), window.interval()).await
    }

    fn provider_name(&self) -> &'static str {
        "yahoo"
    }
}

/// Turn a chart API payload into bars, skipping rows without a close.
pub fn parse_chart(body: &str) -> LensResult<Vec<PriceBar>> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| LensError::Upstream(format!("Unexpected chart payload: {}", e)))?;

    if let Some(error) = envelope.chart.error {
        let message = error
            .description
            .or(error.code)
            .unwrap_or_else(|| "No data found".to_string());
        return Err(LensError::NoData(message));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| LensError::NoData("No chart data found".to_string()))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let column = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(close) = column(&quote.close, i) else {
            continue;
        };
        let timestamp = DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| LensError::Upstream(format!("Invalid timestamp {}", ts)))?;

        bars.push(PriceBar {
            timestamp,
            open: column(&quote.open, i),
            high: column(&quote.high, i),
            low: column(&quote.low, i),
            close,
            volume: column(&quote.volume, i)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u64),
        });
    }

    Ok(bars)
}
