//! Bar — the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar at a single point in time.
///
/// Timestamps are UTC. Volume is kept as `f64` because fractional volume is
/// common for crypto and FX feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }

    /// Basic OHLCV sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.low > 0.0
            && self.volume >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar {index} ({timestamp}) has non-finite or inconsistent OHLCV values")]
    Insane {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("bar {index} timestamp {timestamp} is not after previous timestamp {previous}")]
    NotIncreasing {
        index: usize,
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },
}

/// Validate a bar series: every bar sane, timestamps strictly increasing.
///
/// Duplicate timestamps are reported as `NotIncreasing`.
pub fn validate_series(bars: &[Bar]) -> Result<(), BarError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(BarError::Insane {
                index,
                timestamp: bar.timestamp,
            });
        }
        if index > 0 {
            let previous = bars[index - 1].timestamp;
            if bar.timestamp <= previous {
                return Err(BarError::NotIncreasing {
                    index,
                    timestamp: bar.timestamp,
                    previous,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar(hour: u32) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar(0).is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar(0);
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar(0);
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn validate_accepts_increasing_series() {
        let bars = vec![sample_bar(0), sample_bar(1), sample_bar(2)];
        assert!(validate_series(&bars).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_timestamp() {
        let bars = vec![sample_bar(0), sample_bar(1), sample_bar(1)];
        match validate_series(&bars) {
            Err(BarError::NotIncreasing { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected NotIncreasing, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_out_of_order() {
        let bars = vec![sample_bar(3), sample_bar(1)];
        assert!(matches!(
            validate_series(&bars),
            Err(BarError::NotIncreasing { index: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_insane_bar() {
        let mut bad = sample_bar(1);
        bad.close = -1.0;
        let bars = vec![sample_bar(0), bad];
        assert!(matches!(
            validate_series(&bars),
            Err(BarError::Insane { index: 1, .. })
        ));
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar(5);
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
