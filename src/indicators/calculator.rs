// =============================================================================
// Indicator Calculator — appends RSI / MACD / SMA columns to a price table
// =============================================================================
//
// Pure, single-pass transformation:
//   1. Guard: empty table or fewer than `min_rows` rows => returned unchanged.
//   2. RSI, MACD line, short SMA and long SMA computed over the close series.
//   3. Columns inserted aligned by timestamp (same-name columns replaced).
//   4. Rows with any missing cell dropped.
//
// Known sharp edge: `min_rows` (20) is below the long SMA window (50).  A
// table with 20..=49 rows passes the guard and then loses every row in step 4.
// Callers must check the result for emptiness.
// =============================================================================

use tracing::{debug, info, warn};

use super::macd::calculate_macd_line;
use super::rsi::calculate_rsi;
use super::sma::calculate_sma;
use crate::market_data::{CloseSeries, PriceTable};
use crate::runtime_config::IndicatorConfig;

pub const RSI_COLUMN: &str = "RSI";
pub const MACD_COLUMN: &str = "MACD";

/// Append `RSI`, `MACD`, `SMA_<short>` and `SMA_<long>` to `table` and drop
/// rows whose look-back windows are not yet satisfied.
///
/// `close` must be the close series of `table` (or of a table `table` was
/// derived from); values are matched to rows by timestamp.  Never fails: the
/// result may be the input unchanged, or empty.
pub fn compute_indicators(
    mut table: PriceTable,
    close: &CloseSeries,
    config: &IndicatorConfig,
) -> PriceTable {
    if table.is_empty() || table.len() < config.min_rows {
        warn!(
            rows = table.len(),
            min_rows = config.min_rows,
            "not enough data to compute indicators"
        );
        return table;
    }

    info!(rows = table.len(), "computing technical indicators");

    let closes = close.values();
    let columns = [
        (RSI_COLUMN.to_string(), calculate_rsi(closes, config.rsi_period)),
        (
            MACD_COLUMN.to_string(),
            calculate_macd_line(closes, config.macd_fast, config.macd_slow),
        ),
        (config.sma_short_column(), calculate_sma(closes, config.sma_short)),
        (config.sma_long_column(), calculate_sma(closes, config.sma_long)),
    ];

    for (name, values) in &columns {
        table.insert_series(name, close.index(), values);
    }

    let before = table.len();
    let table = table.drop_incomplete_rows();
    debug!(
        dropped = before - table.len(),
        retained = table.len(),
        "dropped rows with incomplete look-back"
    );

    if table.is_empty() {
        warn!(
            rows = before,
            sma_long = config.sma_long,
            "no rows left after dropping incomplete look-back windows"
        );
    }

    table
}
