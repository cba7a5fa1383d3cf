//! siglab core: deterministic trading-signal discovery.
//!
//! Three pure stages over an in-memory bar series:
//! - Indicator Engine: bars to a feature table with a forward-looking label
//! - Feature Ranker and Threshold Optimizer: which features, which thresholds
//! - Strategy Emitter: candidate to strategy text
//!
//! One rule table drives both threshold scoring and rendering, so the emitted
//! entry condition is exactly the one that was scored. No I/O happens here.

pub mod candidate;
pub mod config;
pub mod domain;
pub mod emitter;
pub mod error;
pub mod features;
pub mod indicators;
pub mod metrics;
pub mod optimizer;
pub mod pipeline;
pub mod ranker;
pub mod rng;
pub mod rules;

pub use candidate::StrategyCandidate;
pub use config::DiscoveryConfig;
pub use error::DiscoveryError;
pub use pipeline::{discover, DiscoveryRun};
