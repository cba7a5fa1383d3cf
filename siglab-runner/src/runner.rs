//! One-shot discovery run: load bars, discover, export, evaluate alerts.
//!
//! Two entry points:
//! - `run_once()`: resolves bars from the run config, then runs. Used by the CLI.
//! - `run_from_bars()`: takes pre-loaded bars. No data I/O besides export.
//!
//! Runs exactly once per call. Scheduling lives outside this crate.

use chrono::{DateTime, Utc};
use siglab_core::domain::{Bar, DataSource};
use siglab_core::{discover, DiscoveryError, DiscoveryRun};
use thiserror::Error;
use tracing::{info, warn};

use crate::alerts::{evaluate_alert, Alert};
use crate::config::{BarSource, ConfigError, RunConfig};
use crate::data_loader::{load_csv_bars, LoadError};
use crate::export::{artifact_stem, save_artifacts, ArtifactPaths, ExportError};
use crate::synthetic::generate_synthetic_bars;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// Everything a run produced, including where it was written.
#[derive(Debug)]
pub struct RunReport {
    pub run: DiscoveryRun,
    pub paths: ArtifactPaths,
    pub alert: Option<Alert>,
    pub synthetic: bool,
    pub bar_count: usize,
}

/// Bars for a run config, and whether they are synthetic.
pub fn resolve_bars(config: &RunConfig) -> Result<(Vec<Bar>, bool), RunError> {
    match config.bar_source()? {
        BarSource::Csv(path) => Ok((load_csv_bars(&path)?, false)),
        BarSource::Synthetic(n) => {
            warn!(
                symbol = %config.data.symbol,
                bars = n,
                "using synthetic bars; results are not market evidence"
            );
            let bars = generate_synthetic_bars(&config.data.symbol, n, config.discovery.seed);
            Ok((bars, true))
        }
    }
}

pub fn run_once(config: &RunConfig, now: DateTime<Utc>) -> Result<RunReport, RunError> {
    config.validate()?;
    let (bars, synthetic) = resolve_bars(config)?;
    run_from_bars(config, &bars, synthetic, now)
}

/// Discover over pre-loaded bars and write artifacts. `now` stamps both the
/// candidate and the artifact file names.
pub fn run_from_bars(
    config: &RunConfig,
    bars: &[Bar],
    synthetic: bool,
    now: DateTime<Utc>,
) -> Result<RunReport, RunError> {
    let source = DataSource::new(&config.data.symbol, &config.data.timeframe, bars);
    info!(
        symbol = %source.symbol,
        timeframe = %source.timeframe,
        bars = bars.len(),
        dataset = source.dataset_hash.short(),
        "starting discovery run"
    );

    let run = discover(bars, source, &config.discovery, now)?;

    let paths = save_artifacts(
        &config.output.reports_dir,
        &artifact_stem(now),
        &run.table,
        &run.candidate,
        &run.artifact,
    )?;

    let alert = evaluate_alert(&run.candidate, config.alerts.notify_score_threshold);
    match &alert {
        Some(a) => warn!(message = %a.message, "score threshold passed"),
        None => info!(
            score = run.candidate.score,
            threshold = config.alerts.notify_score_threshold,
            "score below alert threshold"
        ),
    }

    Ok(RunReport {
        run,
        paths,
        alert,
        synthetic,
        bar_count: bars.len(),
    })
}
