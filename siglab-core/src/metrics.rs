//! Candidate score metrics over the rows a rule selects.
//!
//! Each selected row is treated as one trade held for the label horizon; its
//! outcome is the row's forward return. These are descriptive in-sample
//! numbers, not backtest-grade returns.

use serde::{Deserialize, Serialize};

/// Profit factor ceiling when there are no losing trades.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreMetrics {
    /// Fraction of selected rows with a positive forward return.
    pub win_rate: f64,
    /// Gross gains / gross losses, capped at [`PROFIT_FACTOR_CAP`].
    pub profit_factor: f64,
    /// Worst peak-to-trough decline of the compounded returns, as a
    /// non-positive fraction.
    pub max_drawdown: f64,
    pub selected_rows: usize,
}

impl ScoreMetrics {
    /// Reported when there is nothing to score.
    pub fn neutral() -> Self {
        Self {
            win_rate: 0.5,
            profit_factor: 1.0,
            max_drawdown: 0.0,
            selected_rows: 0,
        }
    }

    /// Metrics of the given forward returns, in row order. NaN returns are skipped.
    pub fn from_returns(returns: &[f64]) -> Self {
        let returns: Vec<f64> = returns.iter().copied().filter(|r| !r.is_nan()).collect();
        let equity = equity_curve(&returns);
        Self {
            win_rate: win_rate(&returns),
            profit_factor: profit_factor(&returns),
            max_drawdown: max_drawdown(&equity),
            selected_rows: returns.len(),
        }
    }
}

/// Compounded equity starting at 1.0, one point per return plus the start.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(returns.len() + 1);
    let mut equity = 1.0;
    curve.push(equity);
    for r in returns {
        equity *= 1.0 + r;
        curve.push(equity);
    }
    curve
}

/// Max drawdown: largest peak-to-trough decline as a negative fraction.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let winners = returns.iter().filter(|&&r| r > 0.0).count();
    winners as f64 / returns.len() as f64
}

/// Profit factor: gross gains / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = returns.iter().filter(|&&r| r > 0.0).sum();
    let gross_loss: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r.abs()).sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 {
            PROFIT_FACTOR_CAP
        } else {
            0.0
        };
    }
    (gross_profit / gross_loss).min(PROFIT_FACTOR_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_drawdown_known() {
        let eq = vec![1.0, 1.1, 0.9, 0.95];
        let expected = (0.9 - 1.1) / 1.1;
        assert!((max_drawdown(&eq) - expected).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_monotonic() {
        let eq: Vec<f64> = (0..50).map(|i| 1.0 + i as f64 * 0.01).collect();
        assert_eq!(max_drawdown(&eq), 0.0);
    }

    #[test]
    fn max_drawdown_short_curve() {
        assert_eq!(max_drawdown(&[]), 0.0);
        assert_eq!(max_drawdown(&[1.0]), 0.0);
    }

    #[test]
    fn profit_factor_known() {
        let pf = profit_factor(&[0.02, -0.01, 0.01]);
        assert!((pf - 3.0).abs() < 1e-10);
    }

    #[test]
    fn profit_factor_capped_without_losses() {
        assert_eq!(profit_factor(&[0.01, 0.02]), PROFIT_FACTOR_CAP);
        assert_eq!(profit_factor(&[0.0, 0.0]), 0.0);
        assert_eq!(profit_factor(&[]), 0.0);
    }

    #[test]
    fn win_rate_counts_strictly_positive() {
        assert_eq!(win_rate(&[0.01, 0.0, -0.01, 0.02]), 0.5);
        assert_eq!(win_rate(&[]), 0.0);
    }

    #[test]
    fn from_returns_compounds() {
        let m = ScoreMetrics::from_returns(&[0.1, -0.5, f64::NAN, 0.2]);
        assert_eq!(m.selected_rows, 3);
        // equity 1.0 → 1.1 → 0.55 → 0.66; peak 1.1, trough 0.55
        assert!((m.max_drawdown - (-0.5)).abs() < 1e-10);
        assert!(m.max_drawdown <= 0.0);
    }

    #[test]
    fn neutral_is_nothing_selected() {
        let n = ScoreMetrics::neutral();
        assert_eq!(n.selected_rows, 0);
        assert_eq!(n.max_drawdown, 0.0);
    }
}
