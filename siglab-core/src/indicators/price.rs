//! Single-bar price features.
//!
//! - `return_1`: close[t] / close[t-1] - 1. Lookback: 1.
//! - `range_pct`: (high - low) / close. Lookback: 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Return1;

impl Indicator for Return1 {
    fn name(&self) -> &str {
        "return_1"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        for i in 1..bars.len() {
            let prev = bars[i - 1].close;
            if prev != 0.0 {
                result[i] = bars[i].close / prev - 1.0;
            }
        }
        result
    }
}

#[derive(Debug, Clone, Default)]
pub struct RangePct;

impl Indicator for RangePct {
    fn name(&self) -> &str {
        "range_pct"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| {
                if b.close == 0.0 {
                    f64::NAN
                } else {
                    (b.high - b.low) / b.close
                }
            })
            .collect()
    }
}
