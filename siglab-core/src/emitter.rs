//! Strategy Emitter.
//!
//! Renders a candidate into Pine-Script-v5-style strategy text. Rendering is
//! a pure function of the candidate and the rule table: the generation
//! timestamp appears on the header line and nowhere else, so two candidates
//! differing only in `generated_at` render identically below line 2.

use crate::candidate::StrategyCandidate;
use crate::error::DiscoveryError;
use crate::rules::{ParamKind, ResolvedFeature, RuleTable};
use chrono::SecondsFormat;

/// Tool name in the header and strategy title.
pub const TOOL_NAME: &str = "siglab";

pub fn render_strategy(candidate: &StrategyCandidate, rules: &RuleTable) -> Result<String, DiscoveryError> {
    let (resolved, unrecognized) = rules.partition(&candidate.features);
    if resolved.is_empty() {
        return Err(DiscoveryError::UnsupportedFeatureFamily {
            features: candidate.features.clone(),
        });
    }

    let primary_oscillator = resolved.iter().find(|f| f.rule.oscillator);
    let src = &candidate.source;
    let m = &candidate.metrics;
    let mut out: Vec<String> = Vec::new();

    out.push("//@version=5".to_string());
    out.push(format!(
        "// {TOOL_NAME} {} | generated {} | id {}",
        env!("CARGO_PKG_VERSION"),
        candidate.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        candidate.id
    ));
    out.push(format!(
        "strategy(\"{}\", overlay={})",
        sanitize(&candidate.name()),
        primary_oscillator.is_none()
    ));
    out.push(format!(
        "// source: {} {} dataset {}",
        src.symbol, src.timeframe, src.dataset_hash
    ));
    out.push(format!(
        "// metrics: score={:.4} win_rate={:.4} profit_factor={:.4} max_drawdown={:.4} selected_rows={} holding_bars={} seed={}",
        candidate.score, m.win_rate, m.profit_factor, m.max_drawdown, m.selected_rows, candidate.holding_bars, candidate.seed
    ));
    out.push(format!("// features: {}", candidate.features.join(", ")));

    out.push(String::new());
    out.push("// indicators".to_string());
    for feature in &candidate.features {
        match resolved.iter().find(|r| &r.feature == feature) {
            Some(r) => out.extend(r.declaration()),
            None => out.push(format!("// unrecognized feature: {feature}")),
        }
    }

    let inputs: Vec<String> = resolved
        .iter()
        .flat_map(|r| parameter_inputs(r, candidate))
        .collect();
    if !inputs.is_empty() {
        out.push(String::new());
        out.push("// parameters".to_string());
        out.extend(inputs);
    }

    let conditions: Vec<String> = resolved.iter().map(|r| r.condition_expr()).collect();
    out.push(String::new());
    out.push("// logic".to_string());
    out.push(format!("long_entry = {}", conditions.join(" and ")));
    out.push(format!(
        "long_exit = ta.barssince(long_entry) >= {}",
        candidate.holding_bars
    ));
    out.push("if long_entry and strategy.position_size == 0".to_string());
    out.push("    strategy.entry(\"long\", strategy.long)".to_string());
    out.push("if long_exit and strategy.position_size > 0".to_string());
    out.push("    strategy.close(\"long\")".to_string());

    if let Some(osc) = primary_oscillator {
        out.push(String::new());
        out.push("// display".to_string());
        out.push(format!("plot({0}, \"{0}\")", osc.feature));
        for name in osc.param_names() {
            out.push(format!("hline({name}, \"{name}\")"));
        }
    }

    if !unrecognized.is_empty() {
        tracing::debug!(?unrecognized, "rendered without declarations");
    }

    let mut text = out.join("\n");
    text.push('\n');
    Ok(text)
}

fn parameter_inputs(feature: &ResolvedFeature<'_>, candidate: &StrategyCandidate) -> Vec<String> {
    let values = feature.param_values(&candidate.params);
    feature
        .rule
        .params
        .iter()
        .zip(values)
        .map(|(template, value)| {
            let name = feature.param_name(template);
            let min = template.min.min(value);
            let max = template.max.max(value);
            match template.kind {
                ParamKind::Int => format!(
                    "{name} = input.int({}, \"{name}\", minval={}, maxval={})",
                    value.round() as i64,
                    min.floor() as i64,
                    max.ceil() as i64
                ),
                ParamKind::Real => format!(
                    "{name} = input.float({}, \"{name}\", minval={}, maxval={})",
                    float_literal(value),
                    float_literal(min),
                    float_literal(max)
                ),
            }
        })
        .collect()
}

/// Shortest decimal form that still reads as a float (`0` becomes `0.0`).
fn float_literal(value: f64) -> String {
    let s = format!("{value}");
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

fn sanitize(title: &str) -> String {
    title.replace(['"', '\n', '\r'], " ")
}
