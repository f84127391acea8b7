// =============================================================================
// Shared types used across the indicator feed
// =============================================================================

use serde::{Deserialize, Serialize};

fn default_ticker() -> String {
    "BTC-USD".to_string()
}

fn default_period() -> String {
    "1d".to_string()
}

fn default_interval() -> String {
    "1m".to_string()
}

/// What to download: one ticker over one lookback period at one sampling
/// interval.
///
/// `period` and `interval` use the provider's own grammar (`"1d"`, `"5d"`,
/// `"1m"`, `"1h"`, ...) and are passed through without validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketQuery {
    #[serde(default = "default_ticker")]
    pub ticker: String,

    #[serde(default = "default_period")]
    pub period: String,

    #[serde(default = "default_interval")]
    pub interval: String,
}

impl MarketQuery {
    pub fn new(
        ticker: impl Into<String>,
        period: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            period: period.into(),
            interval: interval.into(),
        }
    }
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            ticker: default_ticker(),
            period: default_period(),
            interval: default_interval(),
        }
    }
}

impl std::fmt::Display for MarketQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} @ {})", self.ticker, self.period, self.interval)
    }
}
