//! Feature Ranker.
//!
//! Normalizes the candidate columns, fits a seeded importance model against
//! the label and returns every candidate ordered by importance (descending,
//! ties by name ascending).

pub mod forest;
pub mod normalize;

pub use forest::{impurity_importances, Dataset};
pub use normalize::{ColumnStats, Normalizer};

use crate::config::RankerConfig;
use crate::error::DiscoveryError;
use crate::features::FeatureTable;
use crate::rng::RngHierarchy;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    /// Non-negative; scores of one ranking sum to 1 unless every score is 0.
    pub score: f64,
}

/// Ranking order: score descending, then name ascending.
pub fn ranking_order(a: &FeatureImportance, b: &FeatureImportance) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name))
}

/// Sort in place into ranking order.
pub fn sort_ranking(entries: &mut [FeatureImportance]) {
    entries.sort_by(ranking_order);
}

/// The first `k` entries of a ranking. Never recomputes anything.
pub fn top_k(ranking: &[FeatureImportance], k: usize) -> &[FeatureImportance] {
    &ranking[..k.min(ranking.len())]
}

pub fn rank_features(
    table: &FeatureTable,
    exclude: &[String],
    config: &RankerConfig,
    seed: u64,
) -> Result<Vec<FeatureImportance>, DiscoveryError> {
    config.validate()?;

    let candidates = table.candidate_columns(exclude);
    if candidates.is_empty() {
        return Err(DiscoveryError::EmptyFeatureSet);
    }

    let labels = table.labels();
    let positives = table.positive_count();
    if positives == 0 || positives == labels.len() {
        return Err(DiscoveryError::DegenerateLabel {
            value: positives > 0,
        });
    }

    let normalizer = Normalizer::fit(
        candidates
            .iter()
            .map(|c| (c.name.as_str(), c.values.as_slice())),
    );
    let mut features = Vec::with_capacity(candidates.len());
    for col in &candidates {
        // Fitted above under this exact name
        let z = normalizer
            .apply(&col.name, &col.values)
            .unwrap_or_else(|| vec![0.0; col.values.len()]);
        features.push(z);
    }

    debug!(
        candidates = candidates.len(),
        rows = labels.len(),
        positives,
        n_trees = config.n_trees,
        "fitting importance model"
    );

    let data = Dataset {
        features: &features,
        labels,
    };
    let scores = impurity_importances(&data, config, &RngHierarchy::new(seed));

    let mut ranking: Vec<FeatureImportance> = candidates
        .iter()
        .zip(scores)
        .map(|(col, score)| FeatureImportance {
            name: col.name.clone(),
            score: score.max(0.0),
        })
        .collect();
    sort_ranking(&mut ranking);

    if let Some(first) = ranking.first() {
        info!(top = %first.name, score = first.score, "features ranked");
    }
    Ok(ranking)
}
