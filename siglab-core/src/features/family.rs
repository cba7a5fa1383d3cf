//! Indicator families and the concrete columns each one contributes.

use crate::indicators::{
    Adx, Atr, BollingerPercentB, BollingerWidth, Cci, DayOfWeek, Ema, HourOfDay, Indicator,
    Macd, MacdLine, Natr, Obv, RangePct, Return1, Roc, Rsi, Sma, StochD, StochK, VolumeRatio,
};
use crate::indicators::bollinger::DEFAULT_MULTIPLIER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Family tags accepted in `indicator_families`.
///
/// Ordering is declaration order and fixes the column order of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorFamily {
    Momentum,
    Trend,
    Volatility,
    Volume,
    MovingAverages,
    Calendar,
}

impl IndicatorFamily {
    pub const ALL: [IndicatorFamily; 6] = [
        IndicatorFamily::Momentum,
        IndicatorFamily::Trend,
        IndicatorFamily::Volatility,
        IndicatorFamily::Volume,
        IndicatorFamily::MovingAverages,
        IndicatorFamily::Calendar,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            IndicatorFamily::Momentum => "momentum",
            IndicatorFamily::Trend => "trend",
            IndicatorFamily::Volatility => "volatility",
            IndicatorFamily::Volume => "volume",
            IndicatorFamily::MovingAverages => "moving_averages",
            IndicatorFamily::Calendar => "calendar",
        }
    }

    /// Indicators computed directly from bars, in column order.
    pub fn indicators(&self, ma_periods: &[usize]) -> Vec<Box<dyn Indicator>> {
        match self {
            IndicatorFamily::Momentum => vec![
                Box::new(Rsi::new(14)),
                Box::new(StochK::new(14)),
                Box::new(StochD::new(14)),
                Box::new(Cci::new(20)),
            ],
            IndicatorFamily::Trend => vec![
                Box::new(Roc::new(10)),
                Box::new(Macd::standard(MacdLine::Line)),
                Box::new(Macd::standard(MacdLine::Signal)),
                Box::new(Macd::standard(MacdLine::Histogram)),
                Box::new(Adx::new(14)),
            ],
            IndicatorFamily::Volatility => vec![
                Box::new(Atr::new(14)),
                Box::new(Natr::new(14)),
                Box::new(BollingerWidth::new(20, DEFAULT_MULTIPLIER)),
                Box::new(BollingerPercentB::new(20, DEFAULT_MULTIPLIER)),
                Box::new(Return1),
                Box::new(RangePct),
            ],
            IndicatorFamily::Volume => vec![Box::new(Obv::new()), Box::new(VolumeRatio::new(20))],
            IndicatorFamily::MovingAverages => {
                let mut out: Vec<Box<dyn Indicator>> = Vec::with_capacity(ma_periods.len() * 2);
                for &p in ma_periods {
                    out.push(Box::new(Sma::new(p)));
                }
                for &p in ma_periods {
                    out.push(Box::new(Ema::new(p)));
                }
                out
            }
            IndicatorFamily::Calendar => vec![Box::new(HourOfDay), Box::new(DayOfWeek)],
        }
    }

    /// Features derived from already-materialized columns, in column order.
    pub fn derived(&self, ma_periods: &[usize]) -> Vec<DerivedFeature> {
        match self {
            IndicatorFamily::MovingAverages => ma_periods
                .iter()
                .map(|&p| DerivedFeature::CloseAboveSma(p))
                .collect(),
            IndicatorFamily::Calendar => vec![DerivedFeature::NewHigh, DerivedFeature::NewLow],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for IndicatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 0/1 context flags read from columns the engine has already computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedFeature {
    /// `close > sma_N`, reads `close` and `sma_N`.
    CloseAboveSma(usize),
    /// `high > previous high`, reads `high`.
    NewHigh,
    /// `low < previous low`, reads `low`.
    NewLow,
}

impl DerivedFeature {
    pub fn name(&self) -> String {
        match self {
            DerivedFeature::CloseAboveSma(p) => format!("close_above_sma_{p}"),
            DerivedFeature::NewHigh => "new_high".to_string(),
            DerivedFeature::NewLow => "new_low".to_string(),
        }
    }

    /// Columns this feature reads. They must be materialized first.
    pub fn dependencies(&self) -> Vec<String> {
        match self {
            DerivedFeature::CloseAboveSma(p) => vec!["close".to_string(), format!("sma_{p}")],
            DerivedFeature::NewHigh => vec!["high".to_string()],
            DerivedFeature::NewLow => vec!["low".to_string()],
        }
    }

    pub fn lookback(&self) -> usize {
        match self {
            DerivedFeature::CloseAboveSma(p) => p.saturating_sub(1),
            DerivedFeature::NewHigh | DerivedFeature::NewLow => 1,
        }
    }

    /// Compute from the dependency columns, in `dependencies()` order.
    pub fn compute(&self, inputs: &[&[f64]]) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            DerivedFeature::CloseAboveSma(_) => {
                let (close, sma) = (inputs[0], inputs[1]);
                close
                    .iter()
                    .zip(sma)
                    .map(|(&c, &s)| if s.is_nan() { f64::NAN } else { flag(c > s) })
                    .collect()
            }
            DerivedFeature::NewHigh | DerivedFeature::NewLow => {
                let series = inputs[0];
                let mut out = vec![f64::NAN; series.len()];
                for i in 1..series.len() {
                    out[i] = match self {
                        DerivedFeature::NewHigh => flag(series[i] > series[i - 1]),
                        _ => flag(series[i] < series[i - 1]),
                    };
                }
                out
            }
        }
    }
}
