// =============================================================================
// Runtime Configuration — fetch and indicator settings
// =============================================================================
//
// Every tunable lives here and is passed explicitly into the Fetcher and the
// Indicator Calculator; nothing reads module-level constants.  All fields
// carry `#[serde(default)]` so a partial JSON file still loads.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::MarketQuery;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) indicator-feed/1.0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_sma_short() -> usize {
    20
}

fn default_sma_long() -> usize {
    50
}

fn default_min_rows() -> usize {
    20
}

// =============================================================================
// FetchConfig
// =============================================================================

/// Retry budget and provider connection settings for the Fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total download attempts (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between failed attempts.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Ask the provider for split/dividend-adjusted prices.
    #[serde(default = "default_true")]
    pub auto_adjust: bool,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            auto_adjust: true,
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// =============================================================================
// IndicatorConfig
// =============================================================================

/// Look-back windows for the Indicator Calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    /// Short simple moving average window (column `SMA_<n>`).
    #[serde(default = "default_sma_short")]
    pub sma_short: usize,

    /// Long simple moving average window (column `SMA_<n>`).
    #[serde(default = "default_sma_long")]
    pub sma_long: usize,

    /// Tables with fewer rows are returned without indicators.
    ///
    /// NOTE: the default (20) only covers the short SMA window.  A table with
    /// 20..sma_long rows is still processed and comes back empty, because the
    /// long SMA never fills.
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
}

impl IndicatorConfig {
    pub fn sma_short_column(&self) -> String {
        format!("SMA_{}", self.sma_short)
    }

    pub fn sma_long_column(&self) -> String {
        format!("SMA_{}", self.sma_long)
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            sma_short: default_sma_short(),
            sma_long: default_sma_long(),
            min_rows: default_min_rows(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for one feed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Default ticker / period / interval.
    #[serde(default)]
    pub query: MarketQuery,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub indicators: IndicatorConfig,
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read feed config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse feed config from {}", path.display()))?;

        info!(
            path = %path.display(),
            query = %config.query,
            max_attempts = config.fetch.max_attempts,
            "feed config loaded"
        );

        Ok(config)
    }
}
