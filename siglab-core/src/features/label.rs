//! Forward-looking training label.
//!
//! label[i] = close[i+H] / close[i] - 1 > T, defined only where bar i+H exists.

/// H-bar forward return per bar; NaN where the window runs past the series end.
pub fn forward_returns(closes: &[f64], horizon: usize) -> Vec<f64> {
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    for i in 0..n.saturating_sub(horizon) {
        let now = closes[i];
        if now != 0.0 {
            out[i] = closes[i + horizon] / now - 1.0;
        }
    }
    out
}

/// Strictly greater than the threshold; a NaN return is never positive.
pub fn label(forward_return: f64, threshold: f64) -> bool {
    forward_return > threshold
}
