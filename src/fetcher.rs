// =============================================================================
// Fetcher — bounded-retry download + normalization of one ticker's history
// =============================================================================
//
// Each attempt: provider download -> normalize -> extract close series.  Any
// failure along that path (network, HTTP status, malformed body, missing
// columns, zero rows) counts as a failed attempt.  Between failed attempts
// the Fetcher waits a fixed delay; after the last one it gives up.
//
// `fetch` keeps the "empty pair on exhaustion" contract; `try_fetch` returns
// an explicit `FetchError` instead.
// =============================================================================

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::market_data::{normalize, CloseSeries, PriceTable};
use crate::provider::{HistoryRequest, MarketDataProvider};
use crate::runtime_config::FetchConfig;
use crate::types::MarketQuery;

// ---------------------------------------------------------------------------
// Retry delay
// ---------------------------------------------------------------------------

/// How the Fetcher waits between failed attempts.
#[async_trait]
pub trait RetryDelay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Real wall-clock wait on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl RetryDelay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RetryDelay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A successful download: the normalized table and its close series.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub table: PriceTable,
    pub close: CloseSeries,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no usable data for {ticker} after {attempts} attempt(s): {last_error}")]
    Exhausted {
        ticker: String,
        attempts: u32,
        last_error: String,
    },
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Downloads and normalizes price history with a fixed retry budget.
pub struct Fetcher<P, D = TokioDelay> {
    provider: P,
    delay: D,
    config: FetchConfig,
}

impl<P: MarketDataProvider> Fetcher<P, TokioDelay> {
    pub fn new(provider: P, config: FetchConfig) -> Self {
        Self::with_delay(provider, TokioDelay, config)
    }
}

impl<P: MarketDataProvider, D: RetryDelay> Fetcher<P, D> {
    /// Create a Fetcher with a custom delay (e.g. [`NoDelay`] in tests).
    pub fn with_delay(provider: P, delay: D, config: FetchConfig) -> Self {
        Self {
            provider,
            delay,
            config,
        }
    }

    /// Download `query`, returning `(table, close_series)`.
    ///
    /// When every attempt fails both are empty; callers check
    /// [`PriceTable::is_empty`] instead of handling an error.
    pub async fn fetch(&self, query: &MarketQuery) -> (PriceTable, CloseSeries) {
        match self.try_fetch(query).await {
            Ok(Fetched { table, close }) => (table, close),
            Err(e) => {
                error!(error = %e, "could not download price history after several attempts");
                (PriceTable::default(), CloseSeries::default())
            }
        }
    }

    /// Like [`Self::fetch`] but reports exhaustion as [`FetchError`].
    pub async fn try_fetch(&self, query: &MarketQuery) -> Result<Fetched, FetchError> {
        let request = HistoryRequest::from_query(query, self.config.auto_adjust);
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            info!(
                ticker = %request.ticker,
                period = %request.period,
                interval = %request.interval,
                provider = self.provider.name(),
                attempt,
                max_attempts = attempts,
                "downloading price history"
            );

            match self.attempt(&request).await {
                Ok(fetched) => {
                    info!(
                        ticker = %request.ticker,
                        rows = fetched.table.len(),
                        attempt,
                        "price history downloaded"
                    );
                    return Ok(fetched);
                }
                Err(e) => {
                    last_error = format!("{e:#}");
                    warn!(ticker = %request.ticker, attempt, error = %last_error, "download attempt failed");

                    if attempt < attempts {
                        let delay = self.config.retry_delay();
                        info!(delay_secs = delay.as_secs_f64(), "retrying after delay");
                        self.delay.wait(delay).await;
                    }
                }
            }
        }

        Err(FetchError::Exhausted {
            ticker: request.ticker,
            attempts,
            last_error,
        })
    }

    async fn attempt(&self, request: &HistoryRequest) -> anyhow::Result<Fetched> {
        let frame = self.provider.download(request).await?;
        let table = normalize(frame).context("failed to normalize provider response")?;
        let close = table
            .close_series()
            .context("normalized table has no usable close column")?;
        Ok(Fetched { table, close })
    }
}
