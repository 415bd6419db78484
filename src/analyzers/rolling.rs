use crate::utils::rounding::mean_present;

/// Trailing rolling mean over `window` values ending at each position.
///
/// Missing values inside the window are skipped rather than counted as
/// zero, and the first `window - 1` positions average whatever is
/// available. A window with no present values yields `None`.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean_present(&values[start..=i])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_window_at_start() {
        let values = [Some(3.0), Some(6.0), Some(9.0), Some(12.0)];
        assert_eq!(
            rolling_mean(&values, 3),
            vec![Some(3.0), Some(4.5), Some(6.0), Some(9.0)]
        );
    }

    #[test]
    fn test_nulls_are_skipped_not_zeroed() {
        let values = [Some(4.0), None, Some(8.0), None, None, None];
        assert_eq!(
            rolling_mean(&values, 3),
            vec![Some(4.0), Some(4.0), Some(6.0), Some(8.0), Some(8.0), None]
        );
    }

    #[test]
    fn test_degenerate_windows() {
        assert!(rolling_mean(&[], 3).is_empty());
        assert_eq!(rolling_mean(&[Some(1.0)], 0), vec![None]);
        assert_eq!(rolling_mean(&[Some(1.0), Some(2.0)], 1), vec![Some(1.0), Some(2.0)]);
    }
}
