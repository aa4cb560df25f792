//! Drawdown risk scoring: maximum drawdown over an equity curve, mapped
//! through exponential decay onto a bounded 0-100 score.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Detailed drawdown analysis for one equity curve.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownReport {
    /// Largest peak-to-trough decline as a fraction of the peak
    pub max_drawdown: f64,

    /// Equity value at the peak preceding the worst trough
    pub peak_value: f64,

    /// Equity value at the worst trough
    pub trough_value: f64,

    /// Index of the peak within the filtered curve
    pub peak_index: usize,

    /// Index of the trough within the filtered curve
    pub trough_index: usize,

    /// Risk score: 100 * e^(-k * max_drawdown), rounded to 2 decimals
    pub score: f64,
}

/// Drop non-finite and non-positive values; drawdown fractions are only
/// meaningful over strictly positive equity.
fn valid_curve(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect()
}

/// Maximum drawdown of an equity curve, as a fraction in [0, 1].
///
/// Returns `None` when fewer than two valid (positive, finite) points
/// remain after filtering: the statistic is undefined, not zero.
pub fn max_drawdown(equity_curve: &[f64]) -> Option<f64> {
    analyze(equity_curve, DEFAULT_DECAY_K).map(|r| r.max_drawdown)
}

/// Risk score for an equity curve: `100 * e^(-k * MDD)`, rounded to two
/// decimals. A flat or monotonically rising curve scores 100; deeper
/// drawdowns decay toward 0. `None` when the drawdown is undefined.
pub fn risk_score(equity_curve: &[f64], k: f64) -> Option<f64> {
    analyze(equity_curve, k).map(|r| r.score)
}

/// Full drawdown report, or `None` when the curve has fewer than two
/// valid points.
pub fn analyze(equity_curve: &[f64], k: f64) -> Option<DrawdownReport> {
    let curve = valid_curve(equity_curve);
    if curve.len() < 2 {
        return None;
    }

    let mut peak = curve[0];
    let mut peak_index = 0usize;
    let mut report = DrawdownReport {
        max_drawdown: 0.0,
        peak_value: curve[0],
        trough_value: curve[0],
        peak_index: 0,
        trough_index: 0,
        score: 0.0,
    };

    for (i, &value) in curve.iter().enumerate() {
        if value > peak {
            peak = value;
            peak_index = i;
        }
        let drawdown = (peak - value) / peak;
        if drawdown > report.max_drawdown {
            report.max_drawdown = drawdown;
            report.peak_value = peak;
            report.trough_value = value;
            report.peak_index = peak_index;
            report.trough_index = i;
        }
    }

    report.score = round2(100.0 * (-k * report.max_drawdown).exp());
    Some(report)
}

/// Default decay strength for the drawdown score.
pub const DEFAULT_DECAY_K: f64 = 2.1;

/// Reconstruct an equity curve from a chronological realized-PnL
/// sequence, starting from `initial_capital`. The starting capital is the
/// first point, so `n` PnL values yield `n + 1` points.
pub fn equity_from_pnl(pnl_history: &[Decimal], initial_capital: f64) -> Vec<f64> {
    let mut equity = Vec::with_capacity(pnl_history.len() + 1);
    let mut balance = initial_capital;
    equity.push(balance);
    for pnl in pnl_history {
        balance += pnl.to_f64().unwrap_or(0.0);
        equity.push(balance);
    }
    equity
}

/// Risk score over the equity curve implied by a realized-PnL sequence.
pub fn risk_score_from_pnl(pnl_history: &[Decimal], initial_capital: f64, k: f64) -> Option<f64> {
    risk_score(&equity_from_pnl(pnl_history, initial_capital), k)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_known_drawdown_score() {
        // Peak 1200, trough 900: MDD = 0.25, score = 100 * e^-0.525
        let score = risk_score(&[1000.0, 1200.0, 900.0, 1100.0, 1400.0], DEFAULT_DECAY_K);
        assert_eq!(score, Some(59.16));
    }

    #[test]
    fn test_monotonic_curve_scores_100() {
        let score = risk_score(&[1000.0, 1100.0, 1200.0, 1300.0], DEFAULT_DECAY_K);
        assert_eq!(score, Some(100.0));
    }

    #[test]
    fn test_half_drawdown() {
        let score = risk_score(&[1000.0, 500.0], DEFAULT_DECAY_K);
        assert_eq!(score, Some(34.99));
    }

    #[test]
    fn test_deeper_drawdowns_score_strictly_lower() {
        let scores: Vec<f64> = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5]
            .iter()
            .map(|dd| {
                // Build a two-point curve with exactly this drawdown
                risk_score(&[1000.0, 1000.0 * (1.0 - dd)], DEFAULT_DECAY_K)
            })
            .map(|s| s.unwrap())
            .collect();
        for pair in scores.windows(2) {
            assert!(pair[0] > pair[1], "expected {} > {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_non_positive_values_filtered() {
        // After filtering, the curve is [1000, 900]: MDD 0.1
        let report = analyze(&[1000.0, 0.0, -50.0, 900.0], DEFAULT_DECAY_K).unwrap();
        assert!((report.max_drawdown - 0.1).abs() < 1e-12);
        assert_eq!(report.peak_index, 0);
        assert_eq!(report.trough_index, 1);
    }

    #[test]
    fn test_undefined_when_too_few_valid_points() {
        assert_eq!(risk_score(&[], DEFAULT_DECAY_K), None);
        assert_eq!(risk_score(&[1000.0], DEFAULT_DECAY_K), None);
        assert_eq!(risk_score(&[1000.0, -5.0, 0.0], DEFAULT_DECAY_K), None);
    }

    #[test]
    fn test_report_locates_peak_and_trough() {
        let report =
            analyze(&[1000.0, 1200.0, 900.0, 1100.0, 1400.0], DEFAULT_DECAY_K).unwrap();
        assert_eq!(report.peak_value, 1200.0);
        assert_eq!(report.trough_value, 900.0);
        assert_eq!(report.peak_index, 1);
        assert_eq!(report.trough_index, 2);
        assert!((report.max_drawdown - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_equity_reconstruction_from_pnl() {
        let curve = equity_from_pnl(&[dec!(200), dec!(-300), dec!(150)], 1000.0);
        assert_eq!(curve, vec![1000.0, 1200.0, 900.0, 1050.0]);
    }

    #[test]
    fn test_losing_streak_can_invalidate_curve() {
        // Equity goes to zero and below; only the first point survives
        // filtering, so the score is undefined.
        let score = risk_score_from_pnl(&[dec!(-1000), dec!(-50)], 1000.0, DEFAULT_DECAY_K);
        assert_eq!(score, None);
    }
}
