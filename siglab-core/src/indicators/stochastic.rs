//! Stochastic oscillator.
//!
//! %K = 100 * (close - lowest_low(period)) / (highest_high(period) - lowest_low(period))
//! %D = SMA(%K, 3)
//!
//! A zero high-low range yields 50 (no position within the range).
//! Lookback: period - 1 for %K, period + 1 for %D.

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

const D_SMOOTHING: usize = 3;

fn percent_k(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let range = highest - lowest;
        result[i] = if range == 0.0 {
            50.0
        } else {
            100.0 * (bars[i].close - lowest) / range
        };
    }

    result
}

#[derive(Debug, Clone)]
pub struct StochK {
    period: usize,
    name: String,
}

impl StochK {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "stochastic period must be >= 1");
        Self {
            period,
            name: format!("stoch_k_{period}"),
        }
    }
}

impl Indicator for StochK {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        percent_k(bars, self.period)
    }
}

#[derive(Debug, Clone)]
pub struct StochD {
    period: usize,
    name: String,
}

impl StochD {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "stochastic period must be >= 1");
        Self {
            period,
            name: format!("stoch_d_{period}"),
        }
    }
}

impl Indicator for StochD {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1 + D_SMOOTHING - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        sma_of_series(&percent_k(bars, self.period), D_SMOOTHING)
    }
}
