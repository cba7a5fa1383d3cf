//! Search space: one bounded parameter per tunable threshold.

use crate::config::RangeOverride;
use crate::rules::{ParamKind, ResolvedFeature};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Scoped name, e.g. `rsi_14_low`.
    pub name: String,
    pub kind: ParamKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParamSpec {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp into `[min, max]` and snap to the kind's grid.
    pub fn snap(&self, value: f64) -> f64 {
        let v = self.kind.quantize(value.clamp(self.min, self.max));
        if (self.min..=self.max).contains(&v) {
            return v;
        }
        // Rounding stepped past a fractional bound: take the grid point inside
        match self.kind {
            ParamKind::Int if self.min.ceil() <= self.max.floor() => {
                if v < self.min {
                    self.min.ceil()
                } else {
                    self.max.floor()
                }
            }
            _ => value.clamp(self.min, self.max),
        }
    }

    pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> f64 {
        match self.kind {
            ParamKind::Int => {
                let lo = self.min.ceil() as i64;
                let hi = self.max.floor() as i64;
                if lo >= hi {
                    return self.snap(self.min);
                }
                rng.gen_range(lo..=hi) as f64
            }
            ParamKind::Real => {
                if self.width() <= 0.0 {
                    return self.snap(self.min);
                }
                self.snap(rng.gen_range(self.min..=self.max))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchSpace {
    pub params: Vec<ParamSpec>,
}

impl SearchSpace {
    /// Parameters of every resolved feature in feature order, with ranges
    /// replaced where `overrides` names the scoped parameter.
    pub fn build(features: &[ResolvedFeature<'_>], overrides: &BTreeMap<String, RangeOverride>) -> Self {
        let mut params = Vec::new();
        for feature in features {
            for template in feature.rule.params {
                let name = feature.param_name(template);
                let (min, max) = match overrides.get(&name) {
                    Some(r) => (r.min, r.max),
                    None => (template.min, template.max),
                };
                params.push(ParamSpec {
                    name,
                    kind: template.kind,
                    min,
                    max,
                    default: template.default.clamp(min, max),
                });
            }
        }
        Self { params }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.params.iter().map(|p| p.sample_uniform(rng)).collect()
    }

    pub fn defaults(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.snap(p.default)).collect()
    }

    /// Name each value of a point in this space.
    pub fn assign(&self, values: &[f64]) -> BTreeMap<String, f64> {
        self.params
            .iter()
            .zip(values)
            .map(|(p, &v)| (p.name.clone(), v))
            .collect()
    }
}
