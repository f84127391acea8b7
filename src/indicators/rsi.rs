// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.  The first
//          bar has no predecessor and counts as a zero move.
// Step 2 — Smooth gains and losses with Wilder's average, i.e. an EWM with
//          alpha = 1 / period:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)       (100 when avg_loss == 0)
//
// The first `period - 1` rows are `None`.
//
// Thresholds:  RSI > 70 => OVERBOUGHT,  RSI < 30 => OVERSOLD.
// =============================================================================

use super::ema::ewm_mean;

/// Compute the full RSI series for the given `closes` and `period`, aligned
/// index-for-index with `closes`.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - If average loss is zero (no down moves, or no moves at all), RSI is 100.
/// - Non-finite results are reported as `None`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || closes.is_empty() {
        return vec![None; closes.len()];
    }

    // --- Gains / losses per bar ----------------------------------------------
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(Some(0.0));
    losses.push(Some(0.0));
    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        gains.push(Some(if delta > 0.0 { delta } else { 0.0 }));
        losses.push(Some(if delta < 0.0 { -delta } else { 0.0 }));
    }

    // --- Wilder's smoothing ---------------------------------------------------
    let alpha = 1.0 / period as f64;
    let avg_gain = ewm_mean(&gains, alpha, period);
    let avg_loss = ewm_mean(&losses, alpha, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect()
}

/// Overbought / oversold classification of an RSI value.
pub fn rsi_label(value: f64) -> &'static str {
    if value >= 70.0 {
        "OVERBOUGHT"
    } else if value <= 30.0 {
        "OVERSOLD"
    } else {
        "NEUTRAL"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert_eq!(calculate_rsi(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn rsi_first_thirteen_rows_undefined() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 30);
        assert!(series[..13].iter().all(Option::is_none));
        assert!(series[13..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains() {
        // Strictly ascending prices => RSI should be 100.
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        // Strictly descending prices => RSI should be 0.
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let series: Vec<f64> = calculate_rsi(&closes, 14).into_iter().flatten().collect();
        assert!(!series.is_empty());
        for v in series {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_reads_as_100() {
        // No down moves at all => avg_loss == 0 => 100.
        let series = calculate_rsi(&[100.0; 30], 14);
        assert_eq!(series.last().copied().flatten(), Some(100.0));
    }

    #[test]
    fn rsi_range_check() {
        // Arbitrary data — RSI must always be in [0, 100].
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series: Vec<f64> = calculate_rsi(&closes, 14).into_iter().flatten().collect();
        assert_eq!(series.len(), closes.len() - 13);
        for v in series {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_wilder_recursion_by_hand() {
        // period 2 => alpha 0.5.  Deltas: 0, +2, -1.
        // avg_gain: 0, 1, 0.5   avg_loss: 0, 0, 0.5
        let series = calculate_rsi(&[10.0, 12.0, 11.0], 2);
        assert_eq!(series[0], None);
        assert_eq!(series[1], Some(100.0));
        assert!((series[2].unwrap() - 50.0).abs() < 1e-10);
    }

    // ---- labels ------------------------------------------------------------

    #[test]
    fn rising_closes_label_overbought() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let last = calculate_rsi(&closes, 14).last().copied().flatten().unwrap();
        assert!((last - 100.0).abs() < 1e-10);
        assert_eq!(rsi_label(last), "OVERBOUGHT");
    }

    #[test]
    fn falling_closes_label_oversold() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let last = calculate_rsi(&closes, 14).last().copied().flatten().unwrap();
        assert!(last.abs() < 1e-10);
        assert_eq!(rsi_label(last), "OVERSOLD");
    }

    #[test]
    fn label_neutral_band() {
        assert_eq!(rsi_label(50.0), "NEUTRAL");
    }
}
