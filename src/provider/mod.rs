// =============================================================================
// Market Data Providers
// =============================================================================
//
// A provider answers one question: "give me the bars for (ticker, period,
// interval)".  It returns a `RawFrame` untouched by normalization; retrying,
// shape fixes and the empty-result check all belong to the Fetcher.

pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;

use crate::market_data::RawFrame;
use crate::types::MarketQuery;

pub use yahoo::YahooChartClient;

/// Parameters of a single history download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub ticker: String,
    pub period: String,
    pub interval: String,
    /// Request split/dividend-adjusted prices.
    pub auto_adjust: bool,
}

impl HistoryRequest {
    pub fn from_query(query: &MarketQuery, auto_adjust: bool) -> Self {
        Self {
            ticker: query.ticker.clone(),
            period: query.period.clone(),
            interval: query.interval.clone(),
            auto_adjust,
        }
    }
}

/// Remote source of historical price bars.
///
/// Any error (network, HTTP status, provider error payload, malformed body)
/// is reported through `anyhow::Error`; the caller treats all of them as
/// transient.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    async fn download(&self, request: &HistoryRequest) -> Result<RawFrame>;
}
