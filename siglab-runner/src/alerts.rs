//! Score-threshold alerts.
//!
//! Delivery (chat, email) belongs to an external notification service; this
//! only decides whether a candidate warrants an alert and what it says.

use serde::{Deserialize, Serialize};
use siglab_core::StrategyCandidate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub strategy: String,
    pub symbol: String,
    pub score: f64,
    pub threshold: f64,
    pub message: String,
}

/// An alert when the candidate's score is at or above `threshold`.
pub fn evaluate_alert(candidate: &StrategyCandidate, threshold: f64) -> Option<Alert> {
    if candidate.score.is_nan() || candidate.score < threshold {
        return None;
    }
    let strategy = candidate.name();
    let symbol = candidate.source.symbol.clone();
    let message = format!(
        "Strategy passed threshold: {strategy} for {symbol} — score={:.4} (threshold={threshold})",
        candidate.score
    );
    Some(Alert {
        strategy,
        symbol,
        score: candidate.score,
        threshold,
        message,
    })
}
