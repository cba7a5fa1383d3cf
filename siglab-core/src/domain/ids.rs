use crate::domain::Bar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of a bar series (BLAKE3 over the canonical bar encoding).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// Hash every bar field in order. Identical series always hash identically.
    pub fn of_bars(bars: &[Bar]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for bar in bars {
            hasher.update(&bar.timestamp.and_utc().timestamp().to_le_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, for headers and file names.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic candidate identity (hash of everything but the generation time).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the bars came from: symbol, timeframe and content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub symbol: String,
    pub timeframe: String,
    pub dataset_hash: DatasetHash,
}

impl DataSource {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>, bars: &[Bar]) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            dataset_hash: DatasetHash::of_bars(bars),
        }
    }
}
