//! Seeded random-forest classifier, used only for its impurity importances.
//!
//! Each tree is grown on a bootstrap sample with Gini splits, considering
//! `ceil(sqrt(n_features))` randomly chosen features per node. A split's
//! importance is its impurity decrease weighted by the node's sample count.
//! Per-tree importances are normalized to sum 1, then averaged over trees.
//! Only importances are kept; the fitted trees are discarded.

use crate::config::RankerConfig;
use crate::rng::{RngHierarchy, RANKER_STAGE};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

const MIN_GAIN: f64 = 1e-12;

/// Column-major design matrix: `features[j][i]` is feature j at row i.
pub struct Dataset<'a> {
    pub features: &'a [Vec<f64>],
    pub labels: &'a [bool],
}

impl Dataset<'_> {
    fn n_features(&self) -> usize {
        self.features.len()
    }

    fn n_rows(&self) -> usize {
        self.labels.len()
    }
}

/// Mean decrease in impurity per feature, averaged over `config.n_trees`.
pub fn impurity_importances(
    data: &Dataset<'_>,
    config: &RankerConfig,
    rng: &RngHierarchy,
) -> Vec<f64> {
    let n_features = data.n_features();
    let mut total = vec![0.0; n_features];

    if n_features == 0 || data.n_rows() == 0 {
        return total;
    }

    for tree_index in 0..config.n_trees {
        let mut tree_rng = rng.rng_for(RANKER_STAGE, tree_index as u64);
        let n = data.n_rows();
        let sample: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();

        let mut tree = TreeGrower {
            data,
            config,
            rng: tree_rng,
            importances: vec![0.0; n_features],
        };
        tree.grow(sample, 0);

        let sum: f64 = tree.importances.iter().sum();
        if sum > 0.0 {
            for (acc, imp) in total.iter_mut().zip(&tree.importances) {
                *acc += imp / sum;
            }
        }
    }

    for v in &mut total {
        *v /= config.n_trees as f64;
    }
    total
}

struct TreeGrower<'d, 'a> {
    data: &'d Dataset<'a>,
    config: &'d RankerConfig,
    rng: StdRng,
    importances: Vec<f64>,
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl TreeGrower<'_, '_> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) {
        let positives = indices.iter().filter(|&&i| self.data.labels[i]).count();
        let impurity = gini(positives, indices.len());

        if depth >= self.config.max_depth
            || indices.len() < 2 * self.config.min_samples_leaf
            || impurity < MIN_GAIN
        {
            return;
        }

        let split = match self.best_split(&indices, impurity) {
            Some(s) => s,
            None => return,
        };
        self.importances[split.feature] += split.gain * indices.len() as f64;

        let column = &self.data.features[split.feature];
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| column[i] <= split.threshold);

        self.grow(left, depth + 1);
        self.grow(right, depth + 1);
    }

    fn best_split(&mut self, indices: &[usize], parent_impurity: f64) -> Option<Split> {
        let n_features = self.data.n_features();
        let max_features = (n_features as f64).sqrt().ceil() as usize;

        let mut candidates: Vec<usize> = (0..n_features).collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(max_features.max(1));

        let n = indices.len();
        let total_pos = indices.iter().filter(|&&i| self.data.labels[i]).count();
        let min_leaf = self.config.min_samples_leaf;
        let mut best: Option<Split> = None;

        for &feature in &candidates {
            let column = &self.data.features[feature];
            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| column[a].total_cmp(&column[b]).then(a.cmp(&b)));

            let mut left_pos = 0usize;
            for k in 0..n - 1 {
                if self.data.labels[order[k]] {
                    left_pos += 1;
                }
                let (here, next) = (column[order[k]], column[order[k + 1]]);
                if here == next {
                    continue;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let weighted = (n_left as f64 * gini(left_pos, n_left)
                    + n_right as f64 * gini(total_pos - left_pos, n_right))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > MIN_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(Split {
                        feature,
                        threshold: (here + next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

/// Gini impurity of a binary node with `positives` out of `n`.
fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RankerConfig {
        RankerConfig {
            n_trees: 16,
            max_depth: 4,
            min_samples_leaf: 2,
        }
    }

    /// Feature 0 decides the label, feature 1 is a deterministic scramble.
    fn informative_and_noise(n: usize) -> (Vec<Vec<f64>>, Vec<bool>) {
        let signal: Vec<f64> = (0..n).map(|i| (i % 10) as f64).collect();
        let noise: Vec<f64> = (0..n).map(|i| ((i * 7919) % 101) as f64).collect();
        let labels: Vec<bool> = signal.iter().map(|&v| v < 3.0).collect();
        (vec![signal, noise], labels)
    }

    #[test]
    fn gini_values() {
        assert_eq!(gini(0, 10), 0.0);
        assert_eq!(gini(10, 10), 0.0);
        assert!((gini(5, 10) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn informative_feature_dominates() {
        let (features, labels) = informative_and_noise(200);
        let data = Dataset {
            features: &features,
            labels: &labels,
        };
        let imp = impurity_importances(&data, &config(), &RngHierarchy::new(42));
        assert!(imp[0] > imp[1], "importances: {imp:?}");
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_importances() {
        let (features, labels) = informative_and_noise(150);
        let data = Dataset {
            features: &features,
            labels: &labels,
        };
        let a = impurity_importances(&data, &config(), &RngHierarchy::new(7));
        let b = impurity_importances(&data, &config(), &RngHierarchy::new(7));
        assert_eq!(a, b);
    }

    #[test]
    fn constant_feature_scores_zero() {
        let (mut features, labels) = informative_and_noise(100);
        features.push(vec![1.0; 100]);
        let data = Dataset {
            features: &features,
            labels: &labels,
        };
        let imp = impurity_importances(&data, &config(), &RngHierarchy::new(1));
        assert_eq!(imp[2], 0.0);
    }

    #[test]
    fn pure_labels_give_no_splits() {
        let features = vec![vec![1.0, 2.0, 3.0, 4.0]];
        let labels = vec![true; 4];
        let data = Dataset {
            features: &features,
            labels: &labels,
        };
        let imp = impurity_importances(&data, &config(), &RngHierarchy::new(1));
        assert_eq!(imp, vec![0.0]);
    }
}
