//! Feature table: one row per eligible bar, named numeric columns, label last.

use crate::error::DiscoveryError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The raw bar fields, always the first columns of an engine-built table.
pub const RAW_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl FeatureColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Immutable once built. Every column, the label vector and the forward
/// returns share the same row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<FeatureColumn>,
    labels: Vec<bool>,
    forward_returns: Vec<f64>,
}

impl FeatureTable {
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        columns: Vec<FeatureColumn>,
        labels: Vec<bool>,
        forward_returns: Vec<f64>,
    ) -> Result<Self, DiscoveryError> {
        let rows = labels.len();
        let mismatch = |what: &str, len: usize| {
            DiscoveryError::InvalidConfig(format!(
                "feature table shape: {what} has {len} rows, labels have {rows}"
            ))
        };
        if timestamps.len() != rows {
            return Err(mismatch("timestamps", timestamps.len()));
        }
        if forward_returns.len() != rows {
            return Err(mismatch("forward_returns", forward_returns.len()));
        }
        for col in &columns {
            if col.values.len() != rows {
                return Err(mismatch(&col.name, col.values.len()));
            }
        }
        Ok(Self {
            timestamps,
            columns,
            labels,
            forward_returns,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    /// H-bar forward return per row. Not a feature; used for candidate metrics.
    pub fn forward_returns(&self) -> &[f64] {
        &self.forward_returns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns not named in `exclude`, in table order.
    pub fn candidate_columns<'a>(&'a self, exclude: &[String]) -> Vec<&'a FeatureColumn> {
        self.columns
            .iter()
            .filter(|c| !exclude.iter().any(|e| e == &c.name))
            .collect()
    }

    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }
}
