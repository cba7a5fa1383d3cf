//! Bollinger-derived features: band width and %B.
//!
//! Bands are SMA(close, period) +/- mult * stddev(close, period), using
//! population stddev (divide by N).
//! - Width: (upper - lower) / middle
//! - %B: (close - lower) / (upper - lower); a collapsed band yields 0.5
//!
//! Lookback: period - 1.

use super::Indicator;
use crate::domain::Bar;

pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Rolling (mean, population stddev) of closes, NaN during warm-up.
fn rolling_bands(bars: &[Bar], period: usize) -> Vec<(f64, f64)> {
    let n = bars.len();
    let mut out = vec![(f64::NAN, f64::NAN); n];

    if period == 0 || n < period {
        return out;
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        if window.iter().any(|b| b.close.is_nan()) {
            continue;
        }
        let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|b| {
                let diff = b.close - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        out[i] = (mean, variance.sqrt());
    }

    out
}

#[derive(Debug, Clone)]
pub struct BollingerWidth {
    period: usize,
    multiplier: f64,
    name: String,
}

impl BollingerWidth {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bb_width_{period}"),
        }
    }
}

impl Indicator for BollingerWidth {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        rolling_bands(bars, self.period)
            .into_iter()
            .map(|(mean, std)| {
                if mean.is_nan() || mean == 0.0 {
                    f64::NAN
                } else {
                    2.0 * self.multiplier * std / mean
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct BollingerPercentB {
    period: usize,
    multiplier: f64,
    name: String,
}

impl BollingerPercentB {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            name: format!("bb_pctb_{period}"),
        }
    }
}

impl Indicator for BollingerPercentB {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        rolling_bands(bars, self.period)
            .into_iter()
            .zip(bars)
            .map(|((mean, std), bar)| {
                if mean.is_nan() {
                    return f64::NAN;
                }
                let lower = mean - self.multiplier * std;
                let width = 2.0 * self.multiplier * std;
                if width == 0.0 {
                    0.5
                } else {
                    (bar.close - lower) / width
                }
            })
            .collect()
    }
}
