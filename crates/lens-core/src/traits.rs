use async_trait::async_trait;

use crate::{HistoryWindow, LensError, PriceBar};

/// Source of OHLCV history keyed by ticker symbol.
///
/// Implementations are constructed once at startup and injected wherever
/// market data is needed, so tests can swap in a canned series.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Bars for `symbol` over `window`, oldest first.
    ///
    /// An empty vector is a valid answer; deciding whether that is an error
    /// belongs to the caller.
    async fn history(&self, symbol: &str, window: HistoryWindow)
        -> Result<Vec<PriceBar>, LensError>;

    fn provider_name(&self) -> &'static str;
}
