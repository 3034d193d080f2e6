//! Fixed-fractional position sizing.
//!
//! Every entry receives the same size, chosen so that if all entries fill and
//! price then reaches the stop, the combined loss is `account_size * risk_pct`.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SizingError {
    #[error("no entry prices to size")]
    EmptyEntries,

    #[error("risk amount must be positive, got {risk_amount}")]
    NonPositiveRisk { risk_amount: f64 },

    #[error("stop loss equals every entry price")]
    ZeroDistance,
}

/// Equal size per entry: `risk / Σ|entry_i - stop_loss|`.
pub fn size_equal(
    entries: &[f64],
    stop_loss: f64,
    account_size: f64,
    risk_pct: f64,
) -> Result<Vec<f64>, SizingError> {
    if entries.is_empty() {
        return Err(SizingError::EmptyEntries);
    }

    let risk_amount = account_size * risk_pct;
    if !(risk_amount > 0.0) {
        return Err(SizingError::NonPositiveRisk { risk_amount });
    }

    let total_distance: f64 = entries.iter().map(|e| (e - stop_loss).abs()).sum();
    if !(total_distance > 0.0) || !total_distance.is_finite() {
        return Err(SizingError::ZeroDistance);
    }

    let size = risk_amount / total_distance;
    Ok(vec![size; entries.len()])
}

/// Size for a single entry.
pub fn size_single(
    entry: f64,
    stop_loss: f64,
    account_size: f64,
    risk_pct: f64,
) -> Result<f64, SizingError> {
    size_equal(&[entry], stop_loss, account_size, risk_pct).map(|sizes| sizes[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn realised_loss(entries: &[f64], sizes: &[f64], stop: f64) -> f64 {
        entries
            .iter()
            .zip(sizes)
            .map(|(e, s)| s * (e - stop).abs())
            .sum()
    }

    #[test]
    fn single_entry() {
        let size = size_single(100.0, 95.0, 1000.0, 0.02).unwrap();
        assert!((size - 4.0).abs() < 1e-12);
    }

    #[test]
    fn bundle_loss_equals_risk() {
        let entries = [110.0, 105.0, 100.0];
        let sizes = size_equal(&entries, 90.0, 2000.0, 0.02).unwrap();
        assert_eq!(sizes.len(), 3);
        assert!(sizes.iter().all(|&s| (s - sizes[0]).abs() < f64::EPSILON));
        // 40 / (20 + 15 + 10)
        assert!((sizes[0] - 40.0 / 45.0).abs() < 1e-12);
        assert!((realised_loss(&entries, &sizes, 90.0) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn stop_above_entries_uses_absolute_distance() {
        let entries = [100.0, 98.0];
        let sizes = size_equal(&entries, 105.0, 1000.0, 0.01).unwrap();
        assert!((realised_loss(&entries, &sizes, 105.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_entries_rejected() {
        assert_eq!(
            size_equal(&[], 90.0, 1000.0, 0.02),
            Err(SizingError::EmptyEntries)
        );
    }

    #[test]
    fn non_positive_risk_rejected() {
        assert!(matches!(
            size_equal(&[100.0], 90.0, 0.0, 0.02),
            Err(SizingError::NonPositiveRisk { .. })
        ));
        assert!(matches!(
            size_equal(&[100.0], 90.0, 1000.0, -0.01),
            Err(SizingError::NonPositiveRisk { .. })
        ));
        assert!(matches!(
            size_equal(&[100.0], 90.0, -1000.0, 0.02),
            Err(SizingError::NonPositiveRisk { .. })
        ));
    }

    #[test]
    fn zero_distance_rejected() {
        assert_eq!(
            size_equal(&[100.0, 100.0], 100.0, 1000.0, 0.02),
            Err(SizingError::ZeroDistance)
        );
    }

    #[test]
    fn error_messages() {
        let err = SizingError::NonPositiveRisk { risk_amount: 0.0 };
        assert_eq!(err.to_string(), "risk amount must be positive, got 0");
    }
}
