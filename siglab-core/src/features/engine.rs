//! Indicator Engine: bars in, trimmed feature table out.
//!
//! All indicators are computed over the full series, derived flags are then
//! computed from those materialized columns, the label last. Only after that
//! are the warm-up rows and the label-less tail dropped, so no kept row
//! carries a value whose window starts before the series or a label whose
//! window ends after it.

use super::family::DerivedFeature;
use super::label::{forward_returns, label};
use super::table::{FeatureColumn, FeatureTable, RAW_COLUMNS};
use crate::config::DiscoveryConfig;
use crate::domain::Bar;
use crate::error::DiscoveryError;
use crate::indicators::Indicator;
use tracing::debug;

/// Everything the engine will compute for a configuration, in column order.
pub struct FeaturePlan {
    indicators: Vec<Box<dyn Indicator>>,
    derived: Vec<DerivedFeature>,
}

impl FeaturePlan {
    pub fn for_config(config: &DiscoveryConfig) -> Self {
        let periods = config.ma_periods();
        let mut indicators = Vec::new();
        let mut derived = Vec::new();
        for family in &config.indicator_families {
            indicators.extend(family.indicators(&periods));
            derived.extend(family.derived(&periods));
        }
        Self {
            indicators,
            derived,
        }
    }

    /// Longest warm-up over every requested column. The longest window is
    /// this plus one bar.
    pub fn max_lookback(&self) -> usize {
        let ind = self.indicators.iter().map(|i| i.lookback());
        let der = self.derived.iter().map(|d| d.lookback());
        ind.chain(der).max().unwrap_or(0)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.indicators
            .iter()
            .map(|i| i.name().to_string())
            .chain(self.derived.iter().map(|d| d.name()))
            .collect()
    }
}

/// Minimum series length for a configuration: longest window plus horizon.
pub fn required_bars(config: &DiscoveryConfig) -> usize {
    FeaturePlan::for_config(config)
        .max_lookback()
        .saturating_add(1)
        .saturating_add(config.label_horizon)
}

pub fn build_feature_table(
    bars: &[Bar],
    config: &DiscoveryConfig,
) -> Result<FeatureTable, DiscoveryError> {
    config.validate()?;

    let plan = FeaturePlan::for_config(config);
    let max_lookback = plan.max_lookback();
    let horizon = config.label_horizon;
    let n = bars.len();

    // Saturates on absurd periods or horizons; no series is that long
    let max_window = max_lookback.saturating_add(1);
    let required = max_window.saturating_add(horizon);
    if n < required {
        return Err(DiscoveryError::InsufficientData {
            required,
            available: n,
            max_window,
            horizon,
        });
    }

    let mut columns: Vec<FeatureColumn> =
        Vec::with_capacity(RAW_COLUMNS.len() + plan.indicators.len() + plan.derived.len());
    columns.push(FeatureColumn::new("open", bars.iter().map(|b| b.open).collect()));
    columns.push(FeatureColumn::new("high", bars.iter().map(|b| b.high).collect()));
    columns.push(FeatureColumn::new("low", bars.iter().map(|b| b.low).collect()));
    columns.push(FeatureColumn::new("close", bars.iter().map(|b| b.close).collect()));
    columns.push(FeatureColumn::new("volume", bars.iter().map(|b| b.volume).collect()));

    for indicator in &plan.indicators {
        columns.push(FeatureColumn::new(indicator.name(), indicator.compute(bars)));
    }

    for feature in &plan.derived {
        let values = {
            let mut inputs: Vec<&[f64]> = Vec::new();
            for dep in feature.dependencies() {
                let col = columns.iter().find(|c| c.name == dep).ok_or_else(|| {
                    DiscoveryError::InvalidConfig(format!(
                        "{} depends on column '{dep}', which is not computed",
                        feature.name()
                    ))
                })?;
                inputs.push(&col.values);
            }
            feature.compute(&inputs)
        };
        columns.push(FeatureColumn::new(feature.name(), values));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fwd = forward_returns(&closes, horizon);

    // Keep rows [max_lookback, n - horizon)
    let start = max_lookback;
    let end = n - horizon;

    let trimmed: Vec<FeatureColumn> = columns
        .into_iter()
        .map(|c| FeatureColumn::new(c.name, c.values[start..end].to_vec()))
        .collect();
    let forward = fwd[start..end].to_vec();
    let labels: Vec<bool> = forward
        .iter()
        .map(|&r| label(r, config.label_threshold))
        .collect();
    let timestamps = bars[start..end].iter().map(|b| b.timestamp).collect();

    debug!(
        bars = n,
        columns = trimmed.len(),
        warmup_rows = start,
        tail_rows = horizon,
        rows = end - start,
        "feature table built"
    );

    FeatureTable::new(timestamps, trimmed, labels, forward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::IndicatorFamily;
    use crate::indicators::make_bars;

    fn rising(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 * 1.01f64.powi(i as i32)).collect();
        make_bars(&closes)
    }

    #[test]
    fn default_config_needs_200_bar_window() {
        let config = DiscoveryConfig::default();
        // sma_200 lookback 199 → window 200, plus horizon 4
        assert_eq!(required_bars(&config), 204);
        let err = build_feature_table(&rising(203), &config).unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::InsufficientData {
                required: 204,
                available: 203,
                max_window: 200,
                horizon: 4
            }
        );
    }

    #[test]
    fn exactly_minimum_length_yields_one_row() {
        let config = DiscoveryConfig::default();
        let table = build_feature_table(&rising(204), &config).unwrap();
        assert_eq!(table.n_rows(), 1);
    }

    #[test]
    fn row_count_invariant() {
        let config = DiscoveryConfig::default().with_families([IndicatorFamily::Momentum]);
        // cci_20 → lookback 19
        let table = build_feature_table(&rising(100), &config).unwrap();
        assert_eq!(table.n_rows(), 100 - 19 - 4);
    }

    #[test]
    fn raw_fields_first_then_indicators() {
        let config = DiscoveryConfig::default().with_families([IndicatorFamily::Momentum]);
        let table = build_feature_table(&rising(60), &config).unwrap();
        assert_eq!(
            table.column_names(),
            vec![
                "open", "high", "low", "close", "volume", "rsi_14", "stoch_k_14", "stoch_d_14",
                "cci_20"
            ]
        );
    }

    #[test]
    fn no_nan_after_trimming() {
        let config = DiscoveryConfig::default();
        let table = build_feature_table(&rising(260), &config).unwrap();
        for col in table.columns() {
            assert!(
                col.values.iter().all(|v| !v.is_nan()),
                "NaN left in {}",
                col.name
            );
        }
    }

    #[test]
    fn rising_series_labels_all_true() {
        // +1% per bar → ~4.06% over 4 bars > 0.5%
        let config = DiscoveryConfig::default().with_families([IndicatorFamily::Volatility]);
        let table = build_feature_table(&rising(80), &config).unwrap();
        assert!(table.labels().iter().all(|&l| l));
    }

    #[test]
    fn derived_flags_use_materialized_columns() {
        let mut config = DiscoveryConfig::default().with_families([
            IndicatorFamily::MovingAverages,
            IndicatorFamily::Calendar,
        ]);
        config.ma_periods = vec![5];
        let table = build_feature_table(&rising(30), &config).unwrap();
        let above = table.column("close_above_sma_5").unwrap();
        assert!(above.iter().all(|&v| v == 1.0));
        let new_high = table.column("new_high").unwrap();
        assert!(new_high.iter().all(|&v| v == 1.0));
        let new_low = table.column("new_low").unwrap();
        assert!(new_low.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn huge_horizon_is_insufficient_data() {
        let config = DiscoveryConfig {
            label_horizon: usize::MAX,
            ..DiscoveryConfig::default().with_families([IndicatorFamily::Momentum])
        };
        assert_eq!(required_bars(&config), usize::MAX);
        let err = build_feature_table(&rising(300), &config).unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::InsufficientData {
                required: usize::MAX,
                available: 300,
                max_window: 20,
                horizon: usize::MAX
            }
        );
    }

    #[test]
    fn huge_ma_period_is_insufficient_data() {
        let mut config = DiscoveryConfig::default().with_families([IndicatorFamily::MovingAverages]);
        config.ma_periods = vec![usize::MAX];
        assert_eq!(required_bars(&config), usize::MAX);
        assert!(matches!(
            build_feature_table(&rising(300), &config),
            Err(DiscoveryError::InsufficientData {
                required: usize::MAX,
                available: 300,
                max_window: usize::MAX,
                ..
            })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DiscoveryConfig {
            label_horizon: 0,
            ..Default::default()
        };
        assert!(matches!(
            build_feature_table(&rising(300), &config),
            Err(DiscoveryError::InvalidConfig(_))
        ));
    }
}
