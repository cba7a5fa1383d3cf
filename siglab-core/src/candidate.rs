//! Strategy candidate: the record of one discovery run.
//!
//! Built once and never mutated. The id fingerprints everything except the
//! generation time, so reruns over the same data, config and seed share an id
//! while remaining distinguishable by `generated_at`.

use crate::domain::{CandidateId, DataSource};
use crate::metrics::ScoreMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyCandidate {
    pub id: CandidateId,
    pub generated_at: DateTime<Utc>,
    pub source: DataSource,
    /// Selected features, best first.
    pub features: Vec<String>,
    pub params: BTreeMap<String, f64>,
    pub score: f64,
    pub metrics: ScoreMetrics,
    /// Bars a position is held after entry (the label horizon).
    pub holding_bars: usize,
    pub seed: u64,
}

/// Everything but the id and timestamp, in hashing order.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBody {
    pub source: DataSource,
    pub features: Vec<String>,
    pub params: BTreeMap<String, f64>,
    pub score: f64,
    pub metrics: ScoreMetrics,
    pub holding_bars: usize,
    pub seed: u64,
}

impl CandidateBody {
    pub fn fingerprint(&self) -> CandidateId {
        let mut hasher = blake3::Hasher::new();
        let mut field = |bytes: &[u8]| {
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        };
        field(self.source.symbol.as_bytes());
        field(self.source.timeframe.as_bytes());
        field(self.source.dataset_hash.0.as_bytes());
        for f in &self.features {
            field(f.as_bytes());
        }
        for (name, value) in &self.params {
            field(name.as_bytes());
            field(&value.to_le_bytes());
        }
        field(&self.score.to_le_bytes());
        field(&self.metrics.win_rate.to_le_bytes());
        field(&self.metrics.profit_factor.to_le_bytes());
        field(&self.metrics.max_drawdown.to_le_bytes());
        field(&(self.metrics.selected_rows as u64).to_le_bytes());
        field(&(self.holding_bars as u64).to_le_bytes());
        field(&self.seed.to_le_bytes());
        CandidateId(hasher.finalize().to_hex().to_string())
    }
}

impl StrategyCandidate {
    pub fn new(body: CandidateBody, generated_at: DateTime<Utc>) -> Self {
        let id = body.fingerprint();
        Self {
            id,
            generated_at,
            source: body.source,
            features: body.features,
            params: body.params,
            score: body.score,
            metrics: body.metrics,
            holding_bars: body.holding_bars,
            seed: body.seed,
        }
    }

    pub fn body(&self) -> CandidateBody {
        CandidateBody {
            source: self.source.clone(),
            features: self.features.clone(),
            params: self.params.clone(),
            score: self.score,
            metrics: self.metrics,
            holding_bars: self.holding_bars,
            seed: self.seed,
        }
    }

    /// A new candidate with the same content and a different generation time.
    pub fn regenerated_at(&self, generated_at: DateTime<Utc>) -> Self {
        Self::new(self.body(), generated_at)
    }

    /// True if `id` matches the content (e.g. after loading from JSON).
    pub fn verify_id(&self) -> bool {
        self.body().fingerprint() == self.id
    }

    /// Display name, e.g. `siglab BTCUSDT 1h`.
    pub fn name(&self) -> String {
        format!("siglab {} {}", self.source.symbol, self.source.timeframe)
    }
}
