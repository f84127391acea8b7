use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::DateTime;
use indicator_feed::market_data::{ColumnLabel, RawFrame, Timestamp};
use indicator_feed::{
    compute_indicators, FetchConfig, Fetcher, HistoryRequest, IndicatorConfig, MarketDataProvider,
    MarketQuery, NoDelay,
};

/// Serves a synthetic minute-bar history, failing the first `failures` calls.
struct SyntheticProvider {
    closes: Vec<f64>,
    failures: usize,
    calls: AtomicUsize,
}

impl SyntheticProvider {
    fn new(closes: Vec<f64>, failures: usize) -> Self {
        Self {
            closes,
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn download(&self, request: &HistoryRequest) -> anyhow::Result<RawFrame> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            anyhow::bail!("HTTP 429 Too Many Requests");
        }

        let index: Vec<Timestamp> = (0..self.closes.len() as i64)
            .map(|i| DateTime::from_timestamp(1_700_000_000 + i * 60, 0).unwrap())
            .collect();
        let cells: Vec<Option<f64>> = self.closes.iter().copied().map(Some).collect();
        let columns = ["Close", "High", "Low", "Open", "Volume"]
            .into_iter()
            .map(|field| {
                let label = ColumnLabel::Multi(vec![field.to_string(), request.ticker.clone()]);
                (label, cells.clone())
            })
            .collect();
        Ok(RawFrame { index, columns })
    }
}

fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

#[tokio::test]
async fn fetch_then_compute_sixty_rows() {
    let fetcher = Fetcher::with_delay(
        SyntheticProvider::new(rising(60), 1),
        NoDelay,
        FetchConfig::default(),
    );

    let (table, close) = fetcher.fetch(&MarketQuery::default()).await;
    assert_eq!(table.len(), 60);
    assert_eq!(table.column_names(), vec!["open", "high", "low", "close", "volume"]);
    assert_eq!(close.len(), table.len());

    let out = compute_indicators(table, &close, &IndicatorConfig::default());
    assert_eq!(out.len(), 11);
    assert_eq!(out.column("SMA_20").unwrap().last().copied().flatten(), Some(149.5));
    assert_eq!(out.column("SMA_50").unwrap().last().copied().flatten(), Some(134.5));
    assert!(out.index().windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn short_history_passes_guard_but_drops_everything() {
    let fetcher = Fetcher::with_delay(
        SyntheticProvider::new(rising(25), 0),
        NoDelay,
        FetchConfig::default(),
    );

    let (table, close) = fetcher.fetch(&MarketQuery::default()).await;
    assert_eq!(table.len(), 25);

    let out = compute_indicators(table, &close, &IndicatorConfig::default());
    assert!(out.is_empty());
}

#[tokio::test]
async fn exhausted_fetch_flows_through_as_empty() {
    let provider = SyntheticProvider::new(rising(60), usize::MAX);
    let fetcher = Fetcher::with_delay(provider, NoDelay, FetchConfig::default());

    let (table, close) = fetcher.fetch(&MarketQuery::default()).await;
    assert!(table.is_empty());
    assert!(close.is_empty());

    let out = compute_indicators(table, &close, &IndicatorConfig::default());
    assert!(out.is_empty());
}

#[tokio::test]
async fn augmented_table_serializes_to_json_rows() {
    let fetcher = Fetcher::with_delay(
        SyntheticProvider::new(rising(55), 0),
        NoDelay,
        FetchConfig::default(),
    );
    let (table, close) = fetcher.fetch(&MarketQuery::new("ETH-USD", "1d", "1m")).await;
    let out = compute_indicators(table, &close, &IndicatorConfig::default());

    let json = serde_json::to_value(&out).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 6);
    for key in ["timestamp", "open", "close", "volume", "RSI", "MACD", "SMA_20", "SMA_50"] {
        assert!(rows[0].get(key).is_some(), "missing {key}");
    }
}
