//! Rate of Change (ROC).
//!
//! Percentage price change over N bars.
//! ROC[t] = (close[t] - close[t-period]) / close[t-period] * 100
//! Lookback: period.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for i in self.period..n {
            let prev = bars[i - self.period].close;
            let curr = bars[i].close;
            if prev.is_nan() || curr.is_nan() || prev == 0.0 {
                continue;
            }
            result[i] = (curr - prev) / prev * 100.0;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn roc_basic() {
        let bars = make_bars(&[100.0, 110.0, 121.0]);
        let result = Roc::new(1).compute(&bars);

        assert!(result[0].is_nan());
        assert_approx(result[1], 10.0, DEFAULT_EPSILON);
        assert_approx(result[2], 10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_period_2() {
        let bars = make_bars(&[100.0, 110.0, 121.0]);
        let result = Roc::new(2).compute(&bars);

        assert!(result[1].is_nan());
        assert_approx(result[2], 21.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_negative() {
        let bars = make_bars(&[100.0, 90.0]);
        let result = Roc::new(1).compute(&bars);
        assert_approx(result[1], -10.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_period_3_mixed_series() {
        // ROC[3] = (105 - 100) / 100 * 100 = 5.0
        // ROC[4] = (103 - 102) / 102 * 100 = 0.980392...
        let bars = make_bars(&[100.0, 102.0, 99.0, 105.0, 103.0]);
        let result = Roc::new(3).compute(&bars);

        assert!(result[..3].iter().all(|v| v.is_nan()));
        assert_approx(result[3], 5.0, DEFAULT_EPSILON);
        assert_approx(result[4], 100.0 / 102.0, DEFAULT_EPSILON);
    }

    #[test]
    fn roc_undefined_base_is_nan() {
        let mut bars = make_bars(&[0.0, 10.0, 20.0, 30.0]);
        bars[3].close = f64::NAN;
        let result = Roc::new(1).compute(&bars);
        // Zero base at 0, NaN close at 3
        assert!(result[1].is_nan());
        assert_approx(result[2], 100.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
    }

    #[test]
    fn roc_lookback() {
        assert_eq!(Roc::new(10).lookback(), 10);
    }
}
