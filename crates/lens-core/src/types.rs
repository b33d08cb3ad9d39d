use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar as delivered by a market-data provider.
///
/// Providers drop rows without a close; every other column may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<u64>,
}

/// Which slice of history to request from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    /// Current session at one-minute granularity.
    Intraday,
    /// Last five sessions, one bar per day.
    Daily,
}

impl HistoryWindow {
    pub fn range(&self) -> &'static str {
        match self {
            HistoryWindow::Intraday => "1d",
            HistoryWindow::Daily => "5d",
        }
    }

    pub fn interval(&self) -> &'static str {
        match self {
            HistoryWindow::Intraday => "1m",
            HistoryWindow::Daily => "1d",
        }
    }
}

/// Normalized latest-price snapshot for a ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MarketSummary {
    #[cfg_attr(feature = "openapi", schema(example = "AAPL"))]
    pub symbol: String,
    #[cfg_attr(feature = "openapi", schema(example = 175.42))]
    pub price: f64,
    /// Absolute price change since previous close
    pub change: f64,
    /// Percent change since previous close
    pub change_percent: f64,
    #[cfg_attr(feature = "openapi", schema(example = 178.1))]
    pub day_high: f64,
    #[cfg_attr(feature = "openapi", schema(example = 172.3))]
    pub day_low: f64,
    /// Latest volume figure when available
    #[serde(default)]
    pub volume: Option<u64>,
    /// Timestamp of the latest price quote
    pub timestamp: DateTime<Utc>,
}

/// Text recognized in an uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OcrResult {
    /// Extracted text from the supplied image
    pub text: String,
    /// Average OCR confidence (0-100) when available
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Coarse directional label derived from the percent price change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heuristic insight combining a market snapshot with optional screen context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct InsightResponse {
    pub ticker: String,
    pub headline: String,
    pub rationale: String,
    pub sentiment: Sentiment,
    /// When the insight was generated (not the quote time)
    pub timestamp: DateTime<Utc>,
    pub market: MarketSummary,
}
