// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula (recursive form, seeded with the first observation):
//   multiplier = 2 / (span + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// Values are reported only once `span` observations have been seen; earlier
// rows are `None`.  Output is aligned index-for-index with the input.
// =============================================================================

/// Exponentially weighted mean with smoothing factor `alpha`.
///
/// Leading `None`s are skipped (the recursion starts at the first value); a
/// `None` after that yields `None` and leaves the running average untouched.
/// A row is reported once at least `min_periods` values have been consumed.
///
/// # Edge cases
/// - `alpha` outside `(0, 1]` => all `None`
/// - Non-finite intermediate values are reported as `None`.
pub fn ewm_mean(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return vec![None; values.len()];
    }

    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    let mut seen = 0usize;

    for value in values {
        let Some(x) = *value else {
            result.push(None);
            continue;
        };

        let ema = match prev {
            None => x,
            Some(p) => x * alpha + p * (1.0 - alpha),
        };
        prev = Some(ema);
        seen += 1;

        result.push((seen >= min_periods && ema.is_finite()).then_some(ema));
    }

    result
}

/// Compute the EMA series for the given `closes` slice and look-back `span`.
///
/// The first `span - 1` rows are `None`; `span == 0` yields all `None`.
pub fn calculate_ema(closes: &[f64], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; closes.len()];
    }
    let multiplier = 2.0 / (span + 1) as f64;
    let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    ewm_mean(&values, multiplier, span)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert_eq!(calculate_ema(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn ema_insufficient_data() {
        assert_eq!(calculate_ema(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..=10], seeded with the first close.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);
        assert!(ema[..4].iter().all(Option::is_none));

        let mult = 2.0 / 6.0;
        let mut expected = closes[0];
        for (i, &c) in closes.iter().enumerate().skip(1) {
            expected = c * mult + expected * (1.0 - mult);
            if i >= 4 {
                let got = ema[i].unwrap();
                assert!((got - expected).abs() < 1e-10, "got {got}, expected {expected}");
            }
        }
    }

    #[test]
    fn ewm_skips_leading_gaps() {
        let values = [None, None, Some(2.0), Some(4.0)];
        let out = ewm_mean(&values, 0.5, 2);
        assert_eq!(out, vec![None, None, None, Some(3.0)]);
    }

    #[test]
    fn ewm_rejects_bad_alpha() {
        let values = [Some(1.0), Some(2.0)];
        assert_eq!(ewm_mean(&values, 0.0, 1), vec![None, None]);
        assert_eq!(ewm_mean(&values, 1.5, 1), vec![None, None]);
    }

    #[test]
    fn ema_of_flat_series_is_flat() {
        let ema = calculate_ema(&[100.0; 30], 12);
        for v in ema.iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10);
        }
        assert_eq!(ema.iter().flatten().count(), 30 - 11);
    }
}
