//! Artifact export: feature table CSV, candidate JSON and strategy text.
//!
//! One run writes three files sharing a `strategy_execution_<YYYYmmdd_HHMMSS>`
//! stem under the reports directory. The candidate JSON round-trips, so a
//! saved candidate can be re-rendered later without the bars.

use chrono::{DateTime, Utc};
use siglab_core::features::FeatureTable;
use siglab_core::StrategyCandidate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Paths of one run's artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub features_csv: PathBuf,
    pub candidate_json: PathBuf,
    pub strategy: PathBuf,
}

pub fn artifact_stem(at: DateTime<Utc>) -> String {
    format!("strategy_execution_{}", at.format("%Y%m%d_%H%M%S"))
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Feature table as CSV: timestamp, every column in table order, label last.
/// NaN cells are written empty.
pub fn export_features_csv(table: &FeatureTable) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["timestamp".to_string()];
    header.extend(table.columns().iter().map(|c| c.name.clone()));
    header.push("label".to_string());
    wtr.write_record(&header)?;

    for row in 0..table.n_rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(table.timestamps()[row].format("%Y-%m-%d %H:%M:%S").to_string());
        for column in table.columns() {
            let v = column.values[row];
            record.push(if v.is_nan() { String::new() } else { v.to_string() });
        }
        record.push(if table.labels()[row] { "1" } else { "0" }.to_string());
        wtr.write_record(&record)?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(data)?)
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_candidate_json(candidate: &StrategyCandidate) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(candidate)?)
}

pub fn import_candidate_json(json: &str) -> Result<StrategyCandidate, ExportError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_candidate(path: &Path) -> Result<StrategyCandidate, ExportError> {
    let json = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_candidate_json(&json)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write all three artifacts under `reports_dir`, creating it if needed.
pub fn save_artifacts(
    reports_dir: &Path,
    stem: &str,
    table: &FeatureTable,
    candidate: &StrategyCandidate,
    strategy_text: &str,
) -> Result<ArtifactPaths, ExportError> {
    std::fs::create_dir_all(reports_dir).map_err(|source| ExportError::Io {
        path: reports_dir.to_path_buf(),
        source,
    })?;

    // Render everything before touching the disk
    let features = export_features_csv(table)?;
    let json = export_candidate_json(candidate)?;

    let paths = ArtifactPaths {
        features_csv: reports_dir.join(format!("{stem}_features.csv")),
        candidate_json: reports_dir.join(format!("{stem}_candidate.json")),
        strategy: reports_dir.join(format!("{stem}_strategy.pine")),
    };
    write(&paths.features_csv, &features)?;
    write(&paths.candidate_json, &json)?;
    write(&paths.strategy, strategy_text)?;

    info!(dir = %reports_dir.display(), stem, "artifacts saved");
    Ok(paths)
}

fn write(path: &Path, contents: &str) -> Result<(), ExportError> {
    std::fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
