//! End-to-end discovery run.
//!
//! Feature table → ranking → top-k → optimization → candidate → artifact.
//! Every stage is a pure function of its inputs; the clock is passed in
//! rather than read, so a run is reproducible down to the header line.

use crate::candidate::{CandidateBody, StrategyCandidate};
use crate::config::DiscoveryConfig;
use crate::domain::{Bar, DataSource};
use crate::emitter::render_strategy;
use crate::error::DiscoveryError;
use crate::features::{build_feature_table, FeatureTable};
use crate::optimizer::{optimize, OptimizationOutcome};
use crate::ranker::{rank_features, top_k, FeatureImportance};
use crate::rules::RuleTable;
use chrono::{DateTime, Utc};
use tracing::info;

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct DiscoveryRun {
    pub table: FeatureTable,
    pub ranking: Vec<FeatureImportance>,
    /// Names of the top-k features, best first.
    pub selected: Vec<String>,
    pub outcome: OptimizationOutcome,
    pub candidate: StrategyCandidate,
    pub artifact: String,
}

/// Run every stage in order. Any error aborts the run with nothing returned.
pub fn discover(
    bars: &[Bar],
    source: DataSource,
    config: &DiscoveryConfig,
    generated_at: DateTime<Utc>,
) -> Result<DiscoveryRun, DiscoveryError> {
    config.validate()?;
    let rules = RuleTable::standard();

    let table = build_feature_table(bars, config)?;
    info!(
        rows = table.n_rows(),
        columns = table.columns().len(),
        positives = table.positive_count(),
        "feature table built"
    );

    let ranking = rank_features(&table, &config.exclude_columns, &config.ranker, config.seed)?;
    let selected: Vec<String> = top_k(&ranking, config.top_k)
        .iter()
        .map(|f| f.name.clone())
        .collect();

    let outcome = optimize(
        &selected,
        &table,
        &rules,
        &config.optimizer,
        config.optimizer_trials,
        config.seed,
    );

    let candidate = StrategyCandidate::new(
        CandidateBody {
            source,
            features: selected.clone(),
            params: outcome.params.clone(),
            score: outcome.score,
            metrics: outcome.metrics,
            holding_bars: config.label_horizon,
            seed: config.seed,
        },
        generated_at,
    );
    let artifact = render_strategy(&candidate, &rules)?;
    info!(id = %candidate.id, score = candidate.score, "strategy candidate emitted");

    Ok(DiscoveryRun {
        table,
        ranking,
        selected,
        outcome,
        candidate,
        artifact,
    })
}
