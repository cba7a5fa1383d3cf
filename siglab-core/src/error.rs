//! Fatal errors of the discovery pipeline.
//!
//! Every variant aborts the run before any artifact is produced. Graceful
//! omissions (an unrecognized feature during optimization, an undeclarable
//! feature during rendering) never surface here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscoveryError {
    /// Series shorter than the longest indicator window plus the label horizon.
    #[error("insufficient data: need at least {required} bars (longest window {max_window} + horizon {horizon}), got {available}")]
    InsufficientData {
        required: usize,
        available: usize,
        max_window: usize,
        horizon: usize,
    },

    #[error("no candidate feature columns remain after exclusions")]
    EmptyFeatureSet,

    #[error("label column is constant ({value}); no importance ranking is meaningful")]
    DegenerateLabel { value: bool },

    /// The entry expression would be empty (always true).
    #[error("none of the selected features belongs to a recognized family: {features:?}")]
    UnsupportedFeatureFamily { features: Vec<String> },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_both_counts() {
        let err = DiscoveryError::InsufficientData {
            required: 204,
            available: 150,
            max_window: 200,
            horizon: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("204"));
        assert!(msg.contains("150"));
    }
}
