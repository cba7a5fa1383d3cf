//! Volume features.
//!
//! - OBV: running sum of volume signed by the close-to-close direction,
//!   starting at 0. Lookback: 0.
//! - Volume ratio: volume / SMA(volume, period). An all-zero window yields 1.
//!   Lookback: period - 1.

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        "obv"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = Vec::with_capacity(bars.len());
        let mut running = 0.0;
        for (i, bar) in bars.iter().enumerate() {
            if i > 0 {
                let prev = bars[i - 1].close;
                if bar.close > prev {
                    running += bar.volume;
                } else if bar.close < prev {
                    running -= bar.volume;
                }
            }
            result.push(running);
        }
        result
    }
}

#[derive(Debug, Clone)]
pub struct VolumeRatio {
    period: usize,
    name: String,
}

impl VolumeRatio {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volume ratio period must be >= 1");
        Self {
            period,
            name: format!("volume_ratio_{period}"),
        }
    }
}

impl Indicator for VolumeRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        sma_of_series(&volumes, self.period)
            .into_iter()
            .zip(&volumes)
            .map(|(avg, &v)| {
                if avg.is_nan() {
                    f64::NAN
                } else if avg == 0.0 {
                    1.0
                } else {
                    v / avg
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn obv_follows_direction() {
        let mut bars = make_bars(&[10.0, 11.0, 10.5, 10.5, 12.0]);
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.volume = 100.0 * (i + 1) as f64;
        }
        let obv = Obv::new().compute(&bars);
        // 0, +200, -300, flat, +500
        assert_eq!(obv, vec![0.0, 200.0, -100.0, -100.0, 400.0]);
    }

    #[test]
    fn volume_ratio_spike() {
        let mut bars = make_bars(&[10.0, 10.0, 10.0, 10.0]);
        bars[3].volume = 4000.0;
        let ratio = VolumeRatio::new(4).compute(&bars);
        // mean = (1000*3 + 4000) / 4 = 1750
        assert!(ratio[2].is_nan());
        assert_approx(ratio[3], 4000.0 / 1750.0, DEFAULT_EPSILON);
    }

    #[test]
    fn volume_ratio_zero_volume() {
        let mut bars = make_bars(&[10.0, 10.0, 10.0]);
        for bar in &mut bars {
            bar.volume = 0.0;
        }
        let ratio = VolumeRatio::new(2).compute(&bars);
        assert_approx(ratio[2], 1.0, DEFAULT_EPSILON);
    }
}
