// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   line      = EMA(fast) - EMA(slow)
//   signal    = EMA(signal) of `line`
//   histogram = line - signal
//
// Standard parameters are 12 / 26 / 9.  `line` is undefined until the slow EMA
// has `slow` observations; `signal` needs a further `signal - 1` rows.

use super::ema::{calculate_ema, ewm_mean};

/// All three MACD series, each aligned index-for-index with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// EMA(fast) - EMA(slow) only, without the signal pass.
pub fn calculate_macd_line(closes: &[f64], fast: usize, slow: usize) -> Vec<Option<f64>> {
    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect()
}

/// Compute the MACD line, signal and histogram for `closes`.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let line = calculate_macd_line(closes, fast, slow);

    let signal_series = if signal == 0 {
        vec![None; line.len()]
    } else {
        ewm_mean(&line, 2.0 / (signal + 1) as f64, signal)
    };

    let histogram = line
        .iter()
        .zip(&signal_series)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();

    MacdSeries {
        line,
        signal: signal_series,
        histogram,
    }
}
