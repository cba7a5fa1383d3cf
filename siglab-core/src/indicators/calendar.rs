//! Calendar context read from the bar timestamp (UTC).
//!
//! - `hour`: 0..=23
//! - `day_of_week`: Monday = 0 .. Sunday = 6
//!
//! Lookback: 0.

use super::Indicator;
use crate::domain::Bar;
use chrono::{Datelike, Timelike};

#[derive(Debug, Clone, Default)]
pub struct HourOfDay;

impl Indicator for HourOfDay {
    fn name(&self) -> &str {
        "hour"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter().map(|b| b.timestamp.hour() as f64).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DayOfWeek;

impl Indicator for DayOfWeek {
    fn name(&self) -> &str {
        "day_of_week"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| b.timestamp.weekday().num_days_from_monday() as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn hour_and_weekday() {
        // make_bars starts Tuesday 2024-01-02 00:00, hourly
        let bars = make_bars(&[1.0; 26]);
        let hours = HourOfDay.compute(&bars);
        let days = DayOfWeek.compute(&bars);
        assert_eq!(hours[0], 0.0);
        assert_eq!(hours[25], 1.0);
        assert_eq!(days[0], 1.0);
        assert_eq!(days[25], 2.0);
    }
}
