//! Market snapshot normalization.
//!
//! Turns the raw intraday and daily series of a provider into a single
//! [`MarketSummary`]: latest price, change against the previous session's
//! close, session range and volume.

use std::sync::Arc;

use lens_core::{
    round_dp, HistoryWindow, LensError, LensResult, MarketDataProvider, MarketSummary, PriceBar,
};

const PRICE_DECIMALS: u32 = 4;
const PERCENT_DECIMALS: u32 = 2;

const NO_INTRADAY: &str = "No intraday quotes available for the requested symbol.";
const NO_BASELINE: &str = "Unable to compute previous close for ticker.";

/// Build a [`MarketSummary`] from an intraday series and a daily series.
///
/// Both slices are expected oldest first. The previous close is taken from the
/// second-to-last daily bar, falling back to the only bar when the symbol has
/// a single session of history.
pub fn normalize(symbol: &str, intraday: &[PriceBar], daily: &[PriceBar]) -> LensResult<MarketSummary> {
    let latest = intraday
        .last()
        .ok_or_else(|| LensError::NoData(NO_INTRADAY.to_string()))?;

    let previous_close = match daily {
        [.., previous, _] => previous.close,
        [only] => only.close,
        [] => return Err(LensError::NoData(NO_BASELINE.to_string())),
    };

    let price = latest.close;
    let change = price - previous_close;
    let change_percent = if previous_close != 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    };

    let day_high = intraday
        .iter()
        .filter_map(|bar| bar.high)
        .reduce(f64::max)
        .unwrap_or(price);
    let day_low = intraday
        .iter()
        .filter_map(|bar| bar.low)
        .reduce(f64::min)
        .unwrap_or(price);

    Ok(MarketSummary {
        symbol: symbol.trim().to_uppercase(),
        price: round_dp(price, PRICE_DECIMALS),
        change: round_dp(change, PRICE_DECIMALS),
        change_percent: round_dp(change_percent, PERCENT_DECIMALS),
        day_high: round_dp(day_high, PRICE_DECIMALS),
        day_low: round_dp(day_low, PRICE_DECIMALS),
        // zero volume means the provider has no figure, not that nothing traded
        volume: latest.volume.filter(|v| *v > 0),
        timestamp: latest.timestamp,
    })
}

/// Fetches both history windows from an injected provider and normalizes them.
#[derive(Clone)]
pub struct MarketSnapshotService {
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketSnapshotService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Latest summary for `symbol`.
    ///
    /// An empty intraday series is reported as [`LensError::NoData`] even if
    /// the daily request failed.
    pub async fn fetch_summary(&self, symbol: &str) -> LensResult<MarketSummary> {
        let symbol = symbol.trim().to_uppercase();

        let (intraday, daily) = tokio::join!(
            self.provider.history(&symbol, HistoryWindow::Intraday),
            self.provider.history(&symbol, HistoryWindow::Daily),
        );

        let intraday = intraday?;
        if intraday.is_empty() {
            tracing::warn!("{}: {} returned no intraday bars", symbol, self.provider_name());
            return Err(LensError::NoData(NO_INTRADAY.to_string()));
        }
        let daily = daily?;

        let summary = normalize(&symbol, &intraday, &daily)?;
        tracing::debug!(
            "{}: price {} ({:+.2}%) from {} intraday / {} daily bars",
            summary.symbol,
            summary.price,
            summary.change_percent,
            intraday.len(),
            daily.len()
        );
        Ok(summary)
    }
}
