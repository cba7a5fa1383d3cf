//! Shared signal-rule lookup.
//!
//! One table maps a feature family (recognized from the column name) to its
//! tunable parameters, the row condition the optimizer scores, and the text
//! the emitter renders for that same condition. Scoring and rendering both go
//! through [`ResolvedFeature`], so the emitted logic is the scored logic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Int,
    Real,
}

impl ParamKind {
    /// Snap a sampled value onto the representable grid. Ints round to the
    /// nearest integer; reals keep six decimals so the rendered literal
    /// reproduces the scored value exactly.
    pub fn quantize(&self, value: f64) -> f64 {
        match self {
            ParamKind::Int => value.round(),
            ParamKind::Real => (value * 1e6).round() / 1e6,
        }
    }
}

/// A family parameter before it is scoped to a concrete feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamTemplate {
    pub suffix: &'static str,
    pub kind: ParamKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

const fn int(suffix: &'static str, min: f64, max: f64, default: f64) -> ParamTemplate {
    ParamTemplate {
        suffix,
        kind: ParamKind::Int,
        min,
        max,
        default,
    }
}

const fn real(suffix: &'static str, min: f64, max: f64, default: f64) -> ParamTemplate {
    ParamTemplate {
        suffix,
        kind: ParamKind::Real,
        min,
        max,
        default,
    }
}

/// Row condition shapes. Any NaN operand makes the condition false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// `value < low or value > high`; params `[low, high]`.
    OutsideBand,
    /// `value > min`; params `[min]`.
    AboveMinimum,
    /// `close > value`; no params.
    CloseAbove,
    /// `value == 1`; no params.
    Flag,
}

/// How a family is recognized from a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Matcher {
    /// `<prefix>_<period>` with a positive integer period.
    Periodic(&'static str),
    /// The exact column name.
    Exact(&'static str),
}

impl Matcher {
    /// `Some(period)` on a match; the period is `None` for exact names.
    fn matches(&self, feature: &str) -> Option<Option<usize>> {
        match self {
            Matcher::Exact(name) => (feature == *name).then_some(None),
            Matcher::Periodic(prefix) => {
                let rest = feature.strip_prefix(prefix)?.strip_prefix('_')?;
                if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let period: usize = rest.parse().ok()?;
                (period > 0).then_some(Some(period))
            }
        }
    }
}

type DeclareFn = fn(feature: &str, period: usize) -> Vec<String>;

#[derive(Clone)]
pub struct FamilyRule {
    pub tag: &'static str,
    matcher: Matcher,
    pub params: &'static [ParamTemplate],
    pub condition: Condition,
    /// Plotted in a separate pane rather than over price.
    pub oscillator: bool,
    declare: DeclareFn,
}

impl fmt::Debug for FamilyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilyRule")
            .field("tag", &self.tag)
            .field("matcher", &self.matcher)
            .field("params", &self.params)
            .field("condition", &self.condition)
            .field("oscillator", &self.oscillator)
            .finish_non_exhaustive()
    }
}

const BAND_RSI: &[ParamTemplate] = &[int("low", 10.0, 40.0, 30.0), int("high", 60.0, 90.0, 70.0)];
const BAND_STOCH: &[ParamTemplate] = &[int("low", 5.0, 30.0, 20.0), int("high", 70.0, 95.0, 80.0)];
const BAND_CCI: &[ParamTemplate] = &[
    int("low", -250.0, -50.0, -100.0),
    int("high", 50.0, 250.0, 100.0),
];
const BAND_PCTB: &[ParamTemplate] = &[real("low", -0.2, 0.3, 0.0), real("high", 0.7, 1.2, 1.0)];
const MIN_ROC: &[ParamTemplate] = &[real("min", -3.0, 3.0, 0.0)];
const MIN_MACD_HIST: &[ParamTemplate] = &[real("min", -2.0, 2.0, 0.0)];
const MIN_ADX: &[ParamTemplate] = &[int("min", 10.0, 40.0, 20.0)];

fn declare_rsi(f: &str, p: usize) -> Vec<String> {
    vec![format!("{f} = ta.rsi(close, {p})")]
}

fn declare_stoch_k(f: &str, p: usize) -> Vec<String> {
    vec![format!("{f} = ta.stoch(close, high, low, {p})")]
}

fn declare_cci(f: &str, p: usize) -> Vec<String> {
    vec![format!("{f} = ta.cci(hlc3, {p})")]
}

fn declare_bb_pctb(f: &str, p: usize) -> Vec<String> {
    vec![
        format!("[_{f}_mid, _{f}_upper, _{f}_lower] = ta.bb(close, {p}, 2.0)"),
        format!("{f} = _{f}_upper == _{f}_lower ? 0.5 : (close - _{f}_lower) / (_{f}_upper - _{f}_lower)"),
    ]
}

fn declare_roc(f: &str, p: usize) -> Vec<String> {
    vec![format!("{f} = ta.roc(close, {p})")]
}

fn declare_macd_hist(f: &str, _p: usize) -> Vec<String> {
    vec![format!("[_{f}_line, _{f}_signal, {f}] = ta.macd(close, 12, 26, 9)")]
}

fn declare_adx(f: &str, p: usize) -> Vec<String> {
    vec![format!("[_{f}_plus, _{f}_minus, {f}] = ta.dmi({p}, {p})")]
}

fn declare_sma(f: &str, p: usize) -> Vec<String> {
    vec![format!("{f} = ta.sma(close, {p})")]
}

fn declare_ema(f: &str, p: usize) -> Vec<String> {
    vec![format!("{f} = ta.ema(close, {p})")]
}

fn declare_close_above_sma(f: &str, p: usize) -> Vec<String> {
    vec![format!("{f} = close > ta.sma(close, {p}) ? 1 : 0")]
}

fn rule(
    tag: &'static str,
    matcher: Matcher,
    params: &'static [ParamTemplate],
    condition: Condition,
    oscillator: bool,
    declare: DeclareFn,
) -> FamilyRule {
    FamilyRule {
        tag,
        matcher,
        params,
        condition,
        oscillator,
        declare,
    }
}

/// The family-to-condition lookup shared by the optimizer and the emitter.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<FamilyRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleTable {
    pub fn standard() -> Self {
        use Condition::*;
        use Matcher::*;
        Self {
            rules: vec![
                rule("rsi", Periodic("rsi"), BAND_RSI, OutsideBand, true, declare_rsi),
                rule("stoch_k", Periodic("stoch_k"), BAND_STOCH, OutsideBand, true, declare_stoch_k),
                rule("cci", Periodic("cci"), BAND_CCI, OutsideBand, true, declare_cci),
                rule("bb_pctb", Periodic("bb_pctb"), BAND_PCTB, OutsideBand, true, declare_bb_pctb),
                rule("roc", Periodic("roc"), MIN_ROC, AboveMinimum, false, declare_roc),
                rule("macd_hist", Exact("macd_hist"), MIN_MACD_HIST, AboveMinimum, false, declare_macd_hist),
                rule("adx", Periodic("adx"), MIN_ADX, AboveMinimum, false, declare_adx),
                rule("sma", Periodic("sma"), &[], CloseAbove, false, declare_sma),
                rule("ema", Periodic("ema"), &[], CloseAbove, false, declare_ema),
                rule("close_above_sma", Periodic("close_above_sma"), &[], Flag, false, declare_close_above_sma),
            ],
        }
    }

    pub fn rules(&self) -> &[FamilyRule] {
        &self.rules
    }

    /// Find the family rule for a feature name, if any.
    pub fn resolve(&self, feature: &str) -> Option<ResolvedFeature<'_>> {
        self.rules.iter().find_map(|rule| {
            rule.matcher.matches(feature).map(|period| ResolvedFeature {
                feature: feature.to_string(),
                rule,
                period,
            })
        })
    }

    /// The template behind a scoped parameter name such as `rsi_14_low`.
    pub fn param_template(&self, scoped: &str) -> Option<&'static ParamTemplate> {
        self.rules.iter().find_map(|rule| {
            rule.params.iter().find(|t| {
                scoped
                    .strip_suffix(t.suffix)
                    .and_then(|rest| rest.strip_suffix('_'))
                    .is_some_and(|feature| rule.matcher.matches(feature).is_some())
            })
        })
    }

    /// Split `features` into resolved ones and the unrecognized remainder,
    /// both in input order.
    pub fn partition<'a>(&'a self, features: &[String]) -> (Vec<ResolvedFeature<'a>>, Vec<String>) {
        let mut resolved = Vec::new();
        let mut unrecognized = Vec::new();
        for f in features {
            match self.resolve(f) {
                Some(r) => resolved.push(r),
                None => unrecognized.push(f.clone()),
            }
        }
        (resolved, unrecognized)
    }
}

/// A feature bound to its family rule.
#[derive(Debug, Clone)]
pub struct ResolvedFeature<'a> {
    pub feature: String,
    pub rule: &'a FamilyRule,
    period: Option<usize>,
}

impl ResolvedFeature<'_> {
    /// `<feature>_<suffix>`, e.g. `rsi_14_low`.
    pub fn param_name(&self, template: &ParamTemplate) -> String {
        format!("{}_{}", self.feature, template.suffix)
    }

    pub fn param_names(&self) -> Vec<String> {
        self.rule.params.iter().map(|t| self.param_name(t)).collect()
    }

    /// Parameter values in template order; missing names fall back to the default.
    pub fn param_values(&self, params: &BTreeMap<String, f64>) -> Vec<f64> {
        self.rule
            .params
            .iter()
            .map(|t| params.get(&self.param_name(t)).copied().unwrap_or(t.default))
            .collect()
    }

    /// The row condition the optimizer scores.
    pub fn holds(&self, value: f64, close: f64, params: &[f64]) -> bool {
        match self.rule.condition {
            Condition::OutsideBand => value < params[0] || value > params[1],
            Condition::AboveMinimum => value > params[0],
            Condition::CloseAbove => close > value,
            Condition::Flag => value == 1.0,
        }
    }

    /// Indicator declaration lines.
    pub fn declaration(&self) -> Vec<String> {
        (self.rule.declare)(&self.feature, self.period.unwrap_or(0))
    }

    /// The same condition as [`holds`](Self::holds), rendered as an expression.
    pub fn condition_expr(&self) -> String {
        let f = &self.feature;
        let names = self.param_names();
        match self.rule.condition {
            Condition::OutsideBand => format!("({f} < {} or {f} > {})", names[0], names[1]),
            Condition::AboveMinimum => format!("{f} > {}", names[0]),
            Condition::CloseAbove => format!("close > {f}"),
            Condition::Flag => format!("{f} == 1"),
        }
    }
}
