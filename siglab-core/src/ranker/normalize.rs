//! Per-column z-score normalization.
//!
//! Statistics come only from the table being ranked. Population standard
//! deviation; zero-variance columns map to 0. Missing values (NaN) are
//! ignored when fitting and become 0 after normalization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

/// Fitted normalization, reapplicable to any column with the same name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Normalizer {
    stats: Vec<ColumnStats>,
}

impl Normalizer {
    pub fn fit<'a>(columns: impl IntoIterator<Item = (&'a str, &'a [f64])>) -> Self {
        let stats = columns
            .into_iter()
            .map(|(name, values)| {
                let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
                let (mean, std) = if finite.is_empty() {
                    (0.0, 0.0)
                } else {
                    let n = finite.len() as f64;
                    let mean = finite.iter().sum::<f64>() / n;
                    let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                    (mean, var.sqrt())
                };
                ColumnStats {
                    name: name.to_string(),
                    mean,
                    std,
                }
            })
            .collect();
        Self { stats }
    }

    pub fn stats(&self) -> &[ColumnStats] {
        &self.stats
    }

    pub fn get(&self, name: &str) -> Option<&ColumnStats> {
        self.stats.iter().find(|s| s.name == name)
    }

    /// Normalize a column with the statistics fitted under `name`.
    /// Returns `None` if no statistics were fitted for that name.
    pub fn apply(&self, name: &str, values: &[f64]) -> Option<Vec<f64>> {
        let stats = self.get(name)?;
        Some(values.iter().map(|&v| normalize_value(v, stats)).collect())
    }
}

fn normalize_value(v: f64, stats: &ColumnStats) -> f64 {
    if v.is_nan() || stats.std == 0.0 {
        0.0
    } else {
        (v - stats.mean) / stats.std
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mean_unit_variance() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let norm = Normalizer::fit([("x", &values[..])]);
        let z = norm.apply("x", &values).unwrap();
        let mean = z.iter().sum::<f64>() / 4.0;
        let var = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let values = [5.0; 4];
        let norm = Normalizer::fit([("flat", &values[..])]);
        assert_eq!(norm.apply("flat", &values).unwrap(), vec![0.0; 4]);
    }

    #[test]
    fn nan_fills_with_zero() {
        let values = [1.0, f64::NAN, 3.0];
        let norm = Normalizer::fit([("x", &values[..])]);
        let stats = norm.get("x").unwrap();
        assert_eq!(stats.mean, 2.0);
        let z = norm.apply("x", &values).unwrap();
        assert_eq!(z[1], 0.0);
        assert!(z[0] < 0.0 && z[2] > 0.0);
    }

    #[test]
    fn reapplication_is_deterministic() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        let norm = Normalizer::fit([("x", &values[..])]);
        assert_eq!(norm.apply("x", &values), norm.apply("x", &values));
        assert!(norm.apply("other", &values).is_none());
    }
}
