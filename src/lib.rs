// =============================================================================
// indicator-feed — price history fetcher + technical indicator calculator
// =============================================================================
//
// Two components used in sequence:
//   fetcher::Fetcher               — bounded-retry download + normalization
//   indicators::compute_indicators — RSI / MACD / SMA columns, incomplete
//                                    rows dropped
//
// Both report failure through empty (or unchanged) tables rather than errors.
// =============================================================================

pub mod fetcher;
pub mod indicators;
pub mod market_data;
pub mod provider;
pub mod runtime_config;
pub mod types;

pub use fetcher::{FetchError, Fetched, Fetcher, NoDelay, RetryDelay, TokioDelay};
pub use indicators::compute_indicators;
pub use market_data::{CloseSeries, PriceTable};
pub use provider::{HistoryRequest, MarketDataProvider, YahooChartClient};
pub use runtime_config::{FetchConfig, IndicatorConfig, RuntimeConfig};
pub use types::MarketQuery;
