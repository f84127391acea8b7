// =============================================================================
// Yahoo Finance chart client — /v8/finance/chart/{ticker}
// =============================================================================
//
// Public endpoint, no signing.  Yahoo rejects requests without a browser-like
// User-Agent, so one is always sent.
//
// Response shape (abridged):
//   { "chart": { "result": [ { "timestamp": [..],
//                              "indicators": { "quote":    [ { open, high, low, close, volume } ],
//                                              "adjclose": [ { adjclose } ] } } ],
//                "error": null } }
//
// Cells may be `null` (no trade in that bucket).  `adjclose` is only present
// for daily-or-coarser intervals.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{HistoryRequest, MarketDataProvider};
use crate::market_data::{ColumnLabel, RawFrame, Timestamp};
use crate::runtime_config::FetchConfig;

/// Yahoo Finance chart API client.
#[derive(Clone)]
pub struct YahooChartClient {
    base_url: Url,
    client: reqwest::Client,
}

impl YahooChartClient {
    /// Build a client from the fetch settings (base URL, user agent, request
    /// timeout).
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()
            .context("failed to build HTTP client")?;

        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid base URL '{}'", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("base URL '{}' cannot carry a path", config.base_url);
        }
        debug!(base_url = %base_url, "YahooChartClient initialised");

        Ok(Self { base_url, client })
    }

    /// `{base_url}/v8/finance/chart/{ticker}`, with the ticker percent-encoded
    /// as a single path segment.
    pub fn chart_url(&self, ticker: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so the segments are writable.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart"])
                .push(ticker);
        }
        url
    }

    /// GET /v8/finance/chart/{ticker}?range=..&interval=..
    #[instrument(skip(self), name = "yahoo::get_chart")]
    pub async fn get_chart(&self, request: &HistoryRequest) -> Result<RawFrame> {
        let url = self.chart_url(&request.ticker);

        let resp = self
            .client
            .get(url)
            .query(&[
                ("range", request.period.as_str()),
                ("interval", request.interval.as_str()),
                ("includePrePost", "false"),
                ("events", "div,splits"),
            ])
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read chart response body")?;

        if !status.is_success() {
            // Yahoo usually explains itself in `chart.error`; fall back to the
            // raw body when it doesn't.
            if let Ok(envelope) = serde_json::from_str::<ChartEnvelope>(&body) {
                if let Some(err) = envelope.chart.error {
                    anyhow::bail!("Yahoo chart returned {}: {}: {}", status, err.code, err.description);
                }
            }
            anyhow::bail!("Yahoo chart returned {}: {}", status, body);
        }

        let frame = parse_chart(&body, &request.ticker, request.auto_adjust)?;
        debug!(
            ticker = %request.ticker,
            interval = %request.interval,
            rows = frame.len(),
            "chart fetched"
        );
        Ok(frame)
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn download(&self, request: &HistoryRequest) -> Result<RawFrame> {
        self.get_chart(request).await
    }
}

impl std::fmt::Debug for YahooChartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooChartClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
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

#[derive(Debug, Default, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

// -----------------------------------------------------------------------------
// Parsing
// -----------------------------------------------------------------------------

/// Turn a chart response body into a [`RawFrame`] labelled `(Field, TICKER)`.
///
/// With `auto_adjust`, and when an `adjclose` series is present, open/high/low
/// are scaled by `adjclose / close` and close is replaced by `adjclose`.
/// Without it, an extra `Adj Close` column is emitted instead.
pub fn parse_chart(body: &str, ticker: &str, auto_adjust: bool) -> Result<RawFrame> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).context("failed to parse chart response")?;

    if let Some(err) = envelope.chart.error {
        anyhow::bail!("Yahoo chart error for {ticker}: {}: {}", err.code, err.description);
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .context("chart response has no result")?;

    let rows = result.timestamp.len();
    let index = result
        .timestamp
        .iter()
        .map(|&secs| {
            DateTime::from_timestamp(secs, 0)
                .with_context(|| format!("timestamp {secs} out of range"))
        })
        .collect::<Result<Vec<Timestamp>>>()?;

    let mut indicators = result.indicators;
    let quote = if indicators.quote.is_empty() {
        QuoteBlock::default()
    } else {
        indicators.quote.swap_remove(0)
    };
    let adjclose = indicators
        .adjclose
        .into_iter()
        .next()
        .map(|b| b.adjclose)
        .filter(|v| !v.is_empty());

    // Missing arrays (Yahoo omits them on empty ranges) become all-null.
    let pad = |mut v: Vec<Option<f64>>, field: &str| -> Result<Vec<Option<f64>>> {
        if v.is_empty() {
            v = vec![None; rows];
        }
        if v.len() != rows {
            anyhow::bail!("chart field '{field}' has {} values for {rows} timestamps", v.len());
        }
        Ok(v)
    };

    let mut open = pad(quote.open, "open")?;
    let mut high = pad(quote.high, "high")?;
    let mut low = pad(quote.low, "low")?;
    let mut close = pad(quote.close, "close")?;
    let volume = pad(quote.volume, "volume")?;
    let adjclose = adjclose.map(|v| pad(v, "adjclose")).transpose()?;

    let label = |field: &str| ColumnLabel::Multi(vec![field.to_string(), ticker.to_string()]);
    let mut columns = Vec::with_capacity(6);

    match adjclose {
        Some(adj) if auto_adjust => {
            for row in 0..rows {
                let (Some(a), Some(c)) = (adj[row], close[row]) else {
                    continue;
                };
                if c == 0.0 {
                    warn!(row, "zero close, skipping price adjustment for bar");
                    continue;
                }
                let ratio = a / c;
                for col in [&mut open, &mut high, &mut low] {
                    if let Some(v) = col[row].as_mut() {
                        *v *= ratio;
                    }
                }
                close[row] = Some(a);
            }
        }
        Some(adj) => columns.push((label("Adj Close"), adj)),
        None => {}
    }

    columns.push((label("Close"), close));
    columns.push((label("High"), high));
    columns.push((label("Low"), low));
    columns.push((label("Open"), open));
    columns.push((label("Volume"), volume));

    Ok(RawFrame { index, columns })
}
