// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================

/// Trailing mean of the last `window` closes, aligned with `closes`.
///
/// Rows before the window fills are `None`; `window == 0` yields all `None`.
pub fn calculate_sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if window == 0 || closes.len() < window {
        return result;
    }

    for (start, w) in closes.windows(window).enumerate() {
        let mean = w.iter().sum::<f64>() / window as f64;
        result[start + window - 1] = mean.is_finite().then_some(mean);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_basic() {
        let sma = calculate_sma(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(sma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn sma_window_equals_length() {
        assert_eq!(calculate_sma(&[2.0, 4.0, 6.0], 3), vec![None, None, Some(4.0)]);
    }

    #[test]
    fn sma_insufficient_data() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 5), vec![None, None]);
        assert_eq!(calculate_sma(&[1.0, 2.0], 0), vec![None, None]);
    }
}
