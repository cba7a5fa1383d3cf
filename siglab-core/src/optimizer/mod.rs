//! Threshold Optimizer.
//!
//! Searches the parameters of the selected features for the assignment whose
//! entry condition (the conjunction of every recognized feature's rule) has
//! the highest label positive rate over the rows it selects.
//!
//! Scoring runs on the same table the features were ranked on: there is no
//! held-out split, so scores are in-sample and optimistic.

pub mod space;
pub mod tpe;

pub use space::{ParamSpec, SearchSpace};
pub use tpe::{TpeSampler, Trial};

use crate::config::OptimizerConfig;
use crate::features::FeatureTable;
use crate::metrics::ScoreMetrics;
use crate::rng::{RngHierarchy, OPTIMIZER_STAGE};
use crate::rules::{ResolvedFeature, RuleTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Score reported when nothing can be scored.
pub const NEUTRAL_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub params: BTreeMap<String, f64>,
    pub score: f64,
    pub selected_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// Only parameters of recognized features; empty is valid.
    pub params: BTreeMap<String, f64>,
    pub score: f64,
    pub metrics: ScoreMetrics,
    /// Every evaluation in order. Never longer than the budget.
    pub trials: Vec<TrialRecord>,
}

impl OptimizationOutcome {
    fn neutral() -> Self {
        Self {
            params: BTreeMap::new(),
            score: NEUTRAL_SCORE,
            metrics: ScoreMetrics::neutral(),
            trials: Vec::new(),
        }
    }
}

/// Row selector for a fixed set of resolved features over one table.
struct Objective<'t> {
    features: Vec<(ResolvedFeature<'t>, &'t [f64])>,
    close: Option<&'t [f64]>,
    labels: &'t [bool],
    min_support: usize,
}

impl Objective<'_> {
    /// Rows where every feature's condition holds.
    fn select(&self, space: &SearchSpace, values: &[f64]) -> Vec<usize> {
        let named = space.assign(values);
        let params: Vec<Vec<f64>> = self
            .features
            .iter()
            .map(|(f, _)| f.param_values(&named))
            .collect();

        (0..self.labels.len())
            .filter(|&i| {
                let close = self.close.map_or(f64::NAN, |c| c[i]);
                self.features
                    .iter()
                    .zip(&params)
                    .all(|((f, column), p)| f.holds(column[i], close, p))
            })
            .collect()
    }

    fn score(&self, selected: &[usize]) -> f64 {
        if selected.len() < self.min_support || selected.is_empty() {
            return 0.0;
        }
        let positives = selected.iter().filter(|&&i| self.labels[i]).count();
        positives as f64 / selected.len() as f64
    }
}

pub fn optimize(
    features: &[String],
    table: &FeatureTable,
    rules: &RuleTable,
    config: &OptimizerConfig,
    budget: usize,
    seed: u64,
) -> OptimizationOutcome {
    let (resolved, unrecognized) = rules.partition(features);

    let mut scored = Vec::with_capacity(resolved.len());
    for feature in resolved {
        match table.column(&feature.feature) {
            Some(column) => scored.push((feature, column)),
            None => warn!(feature = %feature.feature, "feature column missing from table; skipped"),
        }
    }

    if !unrecognized.is_empty() {
        debug!(?unrecognized, "features without a scoring rule");
    }
    if scored.is_empty() {
        warn!(?features, "no recognized feature family to optimize; returning neutral score");
        return OptimizationOutcome::neutral();
    }

    let resolved_only: Vec<ResolvedFeature<'_>> = scored.iter().map(|(f, _)| f.clone()).collect();
    let space = SearchSpace::build(&resolved_only, &config.param_ranges);
    let objective = Objective {
        features: scored,
        close: table.column("close"),
        labels: table.labels(),
        min_support: config.min_support,
    };

    if budget == 0 {
        warn!("optimizer budget is zero; returning defaults unscored");
        return OptimizationOutcome {
            params: space.assign(&space.defaults()),
            ..OptimizationOutcome::neutral()
        };
    }

    // Nothing to tune: a single evaluation decides the score
    let budget = if space.is_empty() { 1 } else { budget };

    let sampler = TpeSampler::default();
    let mut rng = RngHierarchy::new(seed).rng_for(OPTIMIZER_STAGE, 0);
    let mut history: Vec<Trial> = Vec::with_capacity(budget);
    let mut records = Vec::with_capacity(budget);
    let mut best: Option<(usize, Vec<usize>)> = None;

    for t in 0..budget {
        let values = sampler.suggest(&space, &history, &mut rng);
        let selected = objective.select(&space, &values);
        let score = objective.score(&selected);

        records.push(TrialRecord {
            params: space.assign(&values),
            score,
            selected_rows: selected.len(),
        });
        let improves = best
            .as_ref()
            .map_or(true, |(b, _)| score > history[*b].score);
        history.push(Trial { values, score });
        if improves {
            best = Some((t, selected));
        }
    }

    let (best_index, selected) = best.unwrap_or_default();
    let forward = table.forward_returns();
    let returns: Vec<f64> = selected.iter().map(|&i| forward[i]).collect();
    let outcome = OptimizationOutcome {
        params: records[best_index].params.clone(),
        score: records[best_index].score,
        metrics: ScoreMetrics::from_returns(&returns),
        trials: records,
    };

    info!(
        trials = outcome.trials.len(),
        best_trial = best_index,
        score = outcome.score,
        selected_rows = outcome.metrics.selected_rows,
        "thresholds optimized"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureColumn;
    use chrono::NaiveDate;

    /// Every fifth row the oscillator dips to 0, 5 or 10 and the label is
    /// positive; otherwise it sits in 45..=55 and the label is negative.
    fn oscillator_table(n: usize) -> FeatureTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let osc: Vec<f64> = (0..n)
            .map(|i| {
                if i % 5 == 0 {
                    ((i * 7) % 15) as f64
                } else {
                    (45 + (i * 3) % 11) as f64
                }
            })
            .collect();
        let labels: Vec<bool> = osc.iter().map(|&v| v < 20.0).collect();
        let forward: Vec<f64> = labels.iter().map(|&l| if l { 0.01 } else { -0.002 }).collect();
        let ts = (0..n).map(|i| base + chrono::Duration::hours(i as i64)).collect();
        FeatureTable::new(
            ts,
            vec![
                FeatureColumn::new("close", vec![100.0; n]),
                FeatureColumn::new("rsi_14", osc),
                FeatureColumn::new("hour", (0..n).map(|i| (i % 24) as f64).collect()),
            ],
            labels,
            forward,
        )
        .unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_a_high_positive_rate_band() {
        let table = oscillator_table(300);
        let outcome = optimize(
            &names(&["rsi_14"]),
            &table,
            &RuleTable::standard(),
            &OptimizerConfig::default(),
            20,
            42,
        );
        assert!(outcome.score > 0.9, "score {}", outcome.score);
        assert_eq!(outcome.trials.len(), 20);
        assert!(outcome.params.contains_key("rsi_14_low"));
        assert!(outcome.params.contains_key("rsi_14_high"));
        assert!(outcome.metrics.win_rate > 0.9);
    }

    #[test]
    fn never_exceeds_budget() {
        let table = oscillator_table(100);
        for budget in [1, 3, 11, 25] {
            let outcome = optimize(
                &names(&["rsi_14"]),
                &table,
                &RuleTable::standard(),
                &OptimizerConfig::default(),
                budget,
                1,
            );
            assert_eq!(outcome.trials.len(), budget);
        }
    }

    #[test]
    fn unsupported_features_score_neutral() {
        let table = oscillator_table(50);
        let outcome = optimize(
            &names(&["hour", "obv"]),
            &table,
            &RuleTable::standard(),
            &OptimizerConfig::default(),
            20,
            42,
        );
        assert!(outcome.params.is_empty());
        assert_eq!(outcome.score, NEUTRAL_SCORE);
        assert!(outcome.trials.is_empty());
    }

    #[test]
    fn same_seed_same_trials() {
        let table = oscillator_table(200);
        let run = |seed| {
            optimize(
                &names(&["rsi_14", "hour"]),
                &table,
                &RuleTable::standard(),
                &OptimizerConfig::default(),
                20,
                seed,
            )
        };
        assert_eq!(run(7), run(7));
        assert_ne!(run(7).trials, run(8).trials);
    }

    #[test]
    fn best_trial_is_earliest_maximum() {
        let table = oscillator_table(200);
        let outcome = optimize(
            &names(&["rsi_14"]),
            &table,
            &RuleTable::standard(),
            &OptimizerConfig::default(),
            20,
            3,
        );
        let max = outcome
            .trials
            .iter()
            .map(|t| t.score)
            .fold(f64::NEG_INFINITY, f64::max);
        let first = outcome.trials.iter().find(|t| t.score == max).unwrap();
        assert_eq!(first.params, outcome.params);
    }

    #[test]
    fn below_min_support_scores_zero() {
        let table = oscillator_table(100);
        let config = OptimizerConfig {
            min_support: 1000,
            ..Default::default()
        };
        let outcome = optimize(&names(&["rsi_14"]), &table, &RuleTable::standard(), &config, 5, 1);
        assert!(outcome.trials.iter().all(|t| t.score == 0.0));
    }

    #[test]
    fn parameter_free_feature_is_evaluated_once() {
        let table = oscillator_table(100);
        let outcome = optimize(
            &names(&["sma_20"]),
            &table,
            &RuleTable::standard(),
            &OptimizerConfig::default(),
            20,
            1,
        );
        // sma_20 column is absent from this table: nothing recognized remains
        assert_eq!(outcome.score, NEUTRAL_SCORE);

        let n = 60;
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = FeatureTable::new(
            (0..n).map(|i| base + chrono::Duration::hours(i as i64)).collect(),
            vec![
                FeatureColumn::new("close", (0..n).map(|i| 100.0 + (i % 2) as f64).collect()),
                FeatureColumn::new("sma_20", vec![100.5; n]),
            ],
            (0..n).map(|i| i % 2 == 1).collect(),
            vec![0.01; n],
        )
        .unwrap();
        let outcome = optimize(
            &names(&["sma_20"]),
            &table,
            &RuleTable::standard(),
            &OptimizerConfig::default(),
            20,
            1,
        );
        assert_eq!(outcome.trials.len(), 1);
        assert!(outcome.params.is_empty());
        assert_eq!(outcome.score, 1.0);
    }
}
