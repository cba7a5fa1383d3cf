//! Discovery configuration, passed explicitly into every stage.
//!
//! Every field has a default so a partial TOML document (or none at all)
//! yields a runnable configuration.

use crate::error::DiscoveryError;
use crate::features::IndicatorFamily;
use crate::rules::{ParamKind, RuleTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_MA_PERIODS: [usize; 5] = [5, 10, 20, 50, 200];
pub const DEFAULT_LABEL_HORIZON: usize = 4;
pub const DEFAULT_LABEL_THRESHOLD: f64 = 0.005;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_OPTIMIZER_TRIALS: usize = 20;
pub const DEFAULT_SEED: u64 = 42;

/// Raw bar fields excluded from ranking unless the caller says otherwise.
pub const DEFAULT_EXCLUDED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub indicator_families: BTreeSet<IndicatorFamily>,
    pub ma_periods: Vec<usize>,
    pub label_horizon: usize,
    /// Forward return threshold as a fraction (0.005 = 0.5%).
    pub label_threshold: f64,
    pub top_k: usize,
    pub optimizer_trials: usize,
    pub seed: u64,
    pub exclude_columns: Vec<String>,
    pub ranker: RankerConfig,
    pub optimizer: OptimizerConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            indicator_families: IndicatorFamily::ALL.into_iter().collect(),
            ma_periods: DEFAULT_MA_PERIODS.to_vec(),
            label_horizon: DEFAULT_LABEL_HORIZON,
            label_threshold: DEFAULT_LABEL_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            optimizer_trials: DEFAULT_OPTIMIZER_TRIALS,
            seed: DEFAULT_SEED,
            exclude_columns: DEFAULT_EXCLUDED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            ranker: RankerConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl DiscoveryConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, DiscoveryError> {
        let config: Self =
            toml::from_str(s).map_err(|e| DiscoveryError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style override of the enabled families.
    pub fn with_families(mut self, families: impl IntoIterator<Item = IndicatorFamily>) -> Self {
        self.indicator_families = families.into_iter().collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Moving-average periods, sorted and de-duplicated.
    pub fn ma_periods(&self) -> Vec<usize> {
        let set: BTreeSet<usize> = self.ma_periods.iter().copied().collect();
        set.into_iter().collect()
    }

    pub fn validate(&self) -> Result<(), DiscoveryError> {
        let invalid = |msg: &str| Err(DiscoveryError::InvalidConfig(msg.to_string()));

        if self.indicator_families.is_empty() {
            return invalid("indicator_families must not be empty");
        }
        if self.indicator_families.contains(&IndicatorFamily::MovingAverages) {
            if self.ma_periods.is_empty() {
                return invalid("ma_periods must not be empty when moving_averages is enabled");
            }
            if self.ma_periods.contains(&0) {
                return invalid("ma_periods must be positive");
            }
        }
        if self.label_horizon == 0 {
            return invalid("label_horizon must be positive");
        }
        if !self.label_threshold.is_finite() {
            return invalid("label_threshold must be finite");
        }
        if self.top_k == 0 {
            return invalid("top_k must be positive");
        }
        if self.optimizer_trials == 0 {
            return invalid("optimizer_trials must be positive");
        }
        self.ranker.validate()?;
        self.optimizer.validate()
    }
}

/// Importance model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            n_trees: 64,
            max_depth: 6,
            min_samples_leaf: 3,
        }
    }
}

impl RankerConfig {
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.n_trees == 0 || self.max_depth == 0 || self.min_samples_leaf == 0 {
            return Err(DiscoveryError::InvalidConfig(
                "ranker n_trees, max_depth and min_samples_leaf must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Override of a single parameter's search range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeOverride {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Fewer selected rows than this scores 0.
    pub min_support: usize,
    /// Keyed by scoped parameter name, e.g. `rsi_14_low`.
    pub param_ranges: BTreeMap<String, RangeOverride>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            min_support: 5,
            param_ranges: BTreeMap::new(),
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        let rules = RuleTable::standard();
        for (name, range) in &self.param_ranges {
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(DiscoveryError::InvalidConfig(format!(
                    "param range for '{name}' must satisfy min <= max"
                )));
            }
            let int_template = rules
                .param_template(name)
                .is_some_and(|t| t.kind == ParamKind::Int);
            if int_template && range.min.ceil() > range.max.floor() {
                return Err(DiscoveryError::InvalidConfig(format!(
                    "param range for '{name}' contains no integer"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = DiscoveryConfig::default();
        assert_eq!(c.ma_periods, vec![5, 10, 20, 50, 200]);
        assert_eq!(c.label_horizon, 4);
        assert_eq!(c.label_threshold, 0.005);
        assert_eq!(c.top_k, 5);
        assert_eq!(c.optimizer_trials, 20);
        assert_eq!(c.indicator_families.len(), IndicatorFamily::ALL.len());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c = DiscoveryConfig::from_toml_str(
            r#"
            indicator_families = ["momentum", "calendar"]
            seed = 7

            [optimizer.param_ranges.rsi_14_low]
            min = 15.0
            max = 35.0
            "#,
        )
        .unwrap();
        assert_eq!(c.seed, 7);
        assert_eq!(c.label_horizon, 4);
        assert!(c.indicator_families.contains(&IndicatorFamily::Momentum));
        assert!(!c.indicator_families.contains(&IndicatorFamily::Trend));
        assert_eq!(c.optimizer.param_ranges["rsi_14_low"].min, 15.0);
    }

    #[test]
    fn rejects_zero_horizon() {
        let c = DiscoveryConfig {
            label_horizon: 0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(DiscoveryError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_unknown_family_tag() {
        let err = DiscoveryConfig::from_toml_str(r#"indicator_families = ["astrology"]"#);
        assert!(matches!(err, Err(DiscoveryError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_inverted_range_override() {
        let mut c = DiscoveryConfig::default();
        c.optimizer
            .param_ranges
            .insert("rsi_14_low".into(), RangeOverride { min: 40.0, max: 10.0 });
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_int_override_without_an_integer() {
        let mut c = DiscoveryConfig::default();
        c.optimizer
            .param_ranges
            .insert("rsi_14_low".into(), RangeOverride { min: 15.2, max: 15.4 });
        assert!(matches!(c.validate(), Err(DiscoveryError::InvalidConfig(_))));

        // Real parameters accept any non-empty interval
        let mut c = DiscoveryConfig::default();
        c.optimizer
            .param_ranges
            .insert("bb_pctb_20_low".into(), RangeOverride { min: 0.12, max: 0.14 });
        assert!(c.validate().is_ok());
    }

    #[test]
    fn ma_periods_sorted_and_deduplicated() {
        let c = DiscoveryConfig {
            ma_periods: vec![50, 5, 20, 5],
            ..Default::default()
        };
        assert_eq!(c.ma_periods(), vec![5, 20, 50]);
    }
}
