// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators appended by the
// feed.  Every series function returns a `Vec<Option<f64>>` aligned with its
// input so callers can line values up with table rows; `None` marks rows where
// the look-back window is not yet satisfied.

pub mod calculator;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use calculator::{compute_indicators, MACD_COLUMN, RSI_COLUMN};
