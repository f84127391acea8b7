// =============================================================================
// indicator-feed — Main Entry Point
// =============================================================================
//
// fetch -> compute indicators -> print.  Exits non-zero when the final table
// is empty (download exhausted, or too little history for the indicators).
// =============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use indicator_feed::indicators::macd::calculate_macd;
use indicator_feed::indicators::rsi::rsi_label;
use indicator_feed::indicators::RSI_COLUMN;
use indicator_feed::{
    compute_indicators, CloseSeries, Fetcher, IndicatorConfig, PriceTable, RuntimeConfig,
    YahooChartClient,
};

#[derive(Debug, Parser)]
#[command(name = "indicator-feed", version, about = "Download price history and append RSI / MACD / SMA columns")]
struct Cli {
    /// Asset symbol, e.g. BTC-USD.
    #[arg(long, env = "FEED_TICKER")]
    ticker: Option<String>,

    /// Look-back window in provider grammar, e.g. 1d, 5d, 1mo.
    #[arg(long, env = "FEED_PERIOD")]
    period: Option<String>,

    /// Bar size in provider grammar, e.g. 1m, 15m, 1h, 1d.
    #[arg(long, env = "FEED_INTERVAL")]
    interval: Option<String>,

    /// JSON config file; defaults are used when omitted.
    #[arg(long, env = "FEED_CONFIG")]
    config: Option<PathBuf>,

    /// Number of trailing rows to print.
    #[arg(long, default_value_t = 10)]
    tail: usize,

    /// Print the whole augmented table as JSON instead.
    #[arg(long)]
    json: bool,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    // ── 2. Fetch ─────────────────────────────────────────────────────────
    let client = YahooChartClient::new(&config.fetch)?;
    let fetcher = Fetcher::new(client, config.fetch.clone());
    let (table, close) = fetcher.fetch(&config.query).await;

    // ── 3. Indicators ────────────────────────────────────────────────────
    let table = compute_indicators(table, &close, &config.indicators);
    log_summary(&table, &close, &config.indicators);

    // ── 4. Output ────────────────────────────────────────────────────────
    let mut stdout = std::io::stdout().lock();
    report(&table, close.len(), &cli, &mut stdout)
}

/// Config file (or defaults), then flag / env overrides.  Values are passed
/// through as given; the provider decides what it accepts.
fn resolve_config(cli: &Cli) -> RuntimeConfig {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            RuntimeConfig::default()
        }),
        None => RuntimeConfig::default(),
    };

    if let Some(ticker) = &cli.ticker {
        config.query.ticker = ticker.clone();
    }
    if let Some(period) = &cli.period {
        config.query.period = period.clone();
    }
    if let Some(interval) = &cli.interval {
        config.query.interval = interval.clone();
    }
    config
}

fn log_summary(table: &PriceTable, close: &CloseSeries, config: &IndicatorConfig) {
    let Some(rsi) = table.column(RSI_COLUMN).and_then(|c| c.last().copied().flatten()) else {
        return;
    };
    let macd = calculate_macd(
        close.values(),
        config.macd_fast,
        config.macd_slow,
        config.macd_signal,
    );
    info!(
        rows = table.len(),
        last_close = ?close.last(),
        rsi = %format!("{rsi:.2}"),
        rsi_state = rsi_label(rsi),
        macd_histogram = ?macd.histogram.last().copied().flatten(),
        "indicators ready"
    );
}

/// Write the final table to `out` as JSON or as its last `--tail` rows.
/// An empty table writes nothing and maps to a failing exit code.
fn report(
    table: &PriceTable,
    fetched_rows: usize,
    cli: &Cli,
    out: &mut impl Write,
) -> anyhow::Result<ExitCode> {
    if table.is_empty() {
        if fetched_rows == 0 {
            error!("no price data available");
        } else {
            error!(fetched_rows, "no complete rows after indicator look-back; widen the period");
        }
        return Ok(ExitCode::FAILURE);
    }

    if cli.json {
        serde_json::to_writer_pretty(&mut *out, table)?;
        writeln!(out)?;
    } else {
        write_tail(table, cli.tail, out)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// The last `count` rows as an aligned text table.
fn write_tail(table: &PriceTable, count: usize, out: &mut impl Write) -> std::io::Result<()> {
    let names = table.column_names();
    let header: Vec<String> = names.iter().map(|n| format!("{n:>12}")).collect();
    writeln!(out, "{:<25} {}", "timestamp", header.join(" "))?;

    let skip = table.len().saturating_sub(count);
    for (ts, cells) in table.rows().skip(skip) {
        let cells: Vec<String> = cells
            .iter()
            .map(|c| match c {
                Some(v) => format!("{v:>12.4}"),
                None => format!("{:>12}", "-"),
            })
            .collect();
        writeln!(
            out,
            "{:<25} {}",
            ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            cells.join(" ")
        )?;
    }
    Ok(())
}
