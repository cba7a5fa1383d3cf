//! siglab CLI: discovery runs, strategy re-rendering and synthetic data.
//!
//! Commands:
//! - `discover`: run the pipeline once from a TOML config or a CSV file
//! - `render`: re-emit the strategy text for a saved candidate JSON
//! - `synth`: write a deterministic synthetic bar series as CSV
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use siglab_core::emitter::render_strategy;
use siglab_core::rules::RuleTable;
use siglab_runner::{
    generate_synthetic_bars, load_candidate, run_once, write_csv_bars, RunConfig, RunReport,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "siglab", about = "siglab: trading-signal discovery pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run discovery once and write artifacts to the reports directory.
    Discover {
        /// Path to a TOML run config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV of bars (timestamp,open,high,low,close,volume).
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Symbol (with --csv).
        #[arg(long, default_value = "UNKNOWN")]
        symbol: String,

        /// Timeframe label (with --csv).
        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// Override the discovery seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Override the reports directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Override the alert score threshold.
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Re-render the strategy text for a saved candidate.
    Render {
        /// Path to a `*_candidate.json` artifact.
        #[arg(long)]
        candidate: PathBuf,

        /// Write here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write synthetic bars as CSV. Not market data.
    Synth {
        /// Number of bars.
        #[arg(long, default_value_t = 500)]
        bars: usize,

        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,

        /// Symbol the series is seeded from.
        #[arg(long, default_value = "SYNTH")]
        symbol: String,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Discover {
            config,
            csv,
            symbol,
            timeframe,
            seed,
            output_dir,
            threshold,
        } => run_discover(config, csv, symbol, timeframe, seed, output_dir, threshold),
        Commands::Render { candidate, output } => run_render(candidate, output),
        Commands::Synth {
            bars,
            output,
            symbol,
            seed,
        } => run_synth(bars, output, &symbol, seed),
    }
}

fn run_discover(
    config_path: Option<PathBuf>,
    csv: Option<PathBuf>,
    symbol: String,
    timeframe: String,
    seed: Option<u64>,
    output_dir: Option<PathBuf>,
    threshold: Option<f64>,
) -> Result<()> {
    let mut config = match (config_path, csv) {
        (Some(_), Some(_)) => bail!("--config and --csv are mutually exclusive"),
        (None, None) => bail!("one of --config or --csv is required"),
        (Some(path), None) => RunConfig::from_file(&path)?,
        (None, Some(path)) => RunConfig::for_csv(path, &symbol, &timeframe),
    };

    if let Some(seed) = seed {
        config.discovery = config.discovery.with_seed(seed);
    }
    if let Some(dir) = output_dir {
        config.output.reports_dir = dir;
    }
    if let Some(t) = threshold {
        config.alerts.notify_score_threshold = t;
    }

    let report = run_once(&config, Utc::now())?;
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &RunReport) {
    let candidate = &report.run.candidate;
    let m = &candidate.metrics;

    println!();
    println!("=== Discovery: {} ===", candidate.name());
    if report.synthetic {
        println!("  (synthetic data, not market evidence)");
    }
    println!("Bars:           {}", report.bar_count);
    println!("Table rows:     {}", report.run.table.n_rows());
    println!("Dataset:        {}", candidate.source.dataset_hash.short());
    println!();
    println!("Ranking (top {}):", report.run.selected.len());
    for f in report.run.ranking.iter().take(report.run.selected.len()) {
        println!("  {:<20} {:.4}", f.name, f.score);
    }
    println!();
    println!("Score:          {:.4}", candidate.score);
    println!("Win rate:       {:.2}%", m.win_rate * 100.0);
    println!("Profit factor:  {:.2}", m.profit_factor);
    println!("Max drawdown:   {:.2}%", m.max_drawdown * 100.0);
    println!("Selected rows:  {}", m.selected_rows);
    if !candidate.params.is_empty() {
        println!("Parameters:");
        for (name, value) in &candidate.params {
            println!("  {name:<20} {value}");
        }
    }
    println!();
    println!("Candidate id:   {}", candidate.id.0);
    println!("Strategy:       {}", report.paths.strategy.display());
    println!("Candidate:      {}", report.paths.candidate_json.display());
    println!("Features:       {}", report.paths.features_csv.display());

    if let Some(alert) = &report.alert {
        println!();
        println!("{}", alert.message);
    }
}

fn run_render(candidate_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let candidate = load_candidate(&candidate_path)?;
    if !candidate.verify_id() {
        bail!(
            "candidate id {} does not match its content; the file was edited",
            candidate.id.0
        );
    }
    let text = render_strategy(&candidate, &RuleTable::standard())?;
    match output {
        Some(path) => {
            std::fs::write(&path, &text)?;
            info!(path = %path.display(), "strategy written");
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn run_synth(n: usize, output: PathBuf, symbol: &str, seed: u64) -> Result<()> {
    if n == 0 {
        bail!("--bars must be positive");
    }
    let bars = generate_synthetic_bars(symbol, n, seed);
    write_csv_bars(&output, &bars)?;
    println!("Wrote {} synthetic bars to {}", bars.len(), output.display());
    Ok(())
}
