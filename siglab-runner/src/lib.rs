//! siglab runner: the thin layer between the discovery core and the outside.
//!
//! This crate builds on `siglab-core` to provide:
//! - TOML run configuration
//! - CSV bar loading with validation, and deterministic synthetic bars
//! - Artifact export (feature table CSV, candidate JSON, strategy text)
//! - Score-threshold alert evaluation

pub mod alerts;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod synthetic;

pub use alerts::{evaluate_alert, Alert};
pub use config::{BarSource, ConfigError, RunConfig};
pub use data_loader::{load_csv_bars, read_csv_bars, write_csv_bars, LoadError};
pub use export::{artifact_stem, load_candidate, save_artifacts, ArtifactPaths, ExportError};
pub use runner::{resolve_bars, run_from_bars, run_once, RunError, RunReport};
pub use synthetic::generate_synthetic_bars;
