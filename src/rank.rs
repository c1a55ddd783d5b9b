//! Column ranking orchestration.
//!
//! Wires discovery, sampling, rules, accumulation, scoring, and ordering into
//! the one operation the host calls per completed query result. The scored
//! pipeline runs inside a failure boundary: any error discards the in-flight
//! computation and substitutes the structural fallback wholesale, so the call
//! never returns a partial ordering and never takes the host down.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{error, info};
use serde::Deserialize;

use crate::{
    cli::RankingArgs,
    data::{MESSAGE_COLUMN, ResultTable, TIMESTAMP_COLUMN},
    discover::{self, KeyBook},
    order, rules, score,
};

/// Immutable per-call ranking configuration. Every field has a serving
/// default so a partial settings file deserializes cleanly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Score-based ranking; the structural fallback is used when false.
    pub enabled: bool,
    /// Rows inspected by the statistics pass (0 = default 200).
    pub sample_size: usize,
    /// Ceiling on tracked distinct values per key.
    pub distinct_cap: usize,
    /// Average value length at which the length penalty saturates.
    pub length_cap: usize,
    pub weight_presence: f64,
    pub weight_variability: f64,
    /// Conventionally negative.
    pub weight_length: f64,
    pub weight_type: f64,
    /// Boost of the implicit `^al` prefix rule.
    pub al_boost: f64,
    /// Presence rate below which the `^al` rule contributes nothing.
    pub al_min_presence: f64,
    /// Operator boost rules: JSON object or `pattern=boost;...` fragments.
    pub rule_spec: Option<String>,
    /// Comma-separated columns forced ahead of every scored column.
    pub pinned_spec: Option<String>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_size: discover::DEFAULT_SAMPLE_SIZE,
            distinct_cap: 50,
            length_cap: 80,
            weight_presence: 1.0,
            weight_variability: 0.6,
            weight_length: -0.4,
            weight_type: 1.0,
            al_boost: 3.0,
            al_min_presence: 0.3,
            rule_spec: None,
            pinned_spec: None,
        }
    }
}

impl RankingConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Reading settings {path:?}"))?;
        serde_json::from_str(&raw).with_context(|| format!("Parsing settings {path:?}"))
    }
}

/// Builds the effective configuration for one command invocation: the
/// settings file (when given) overridden by explicit flags.
pub fn resolve_config(args: &RankingArgs) -> Result<RankingConfig> {
    let mut config = match &args.settings {
        Some(path) => RankingConfig::load(path)?,
        None => RankingConfig::default(),
    };
    if args.no_rank {
        config.enabled = false;
    }
    if let Some(sample_size) = args.sample_size {
        config.sample_size = sample_size;
    }
    if let Some(pin) = &args.pin {
        config.pinned_spec = Some(pin.clone());
    }
    if let Some(rules) = &args.rules {
        config.rule_spec = Some(rules.clone());
    }
    Ok(config)
}

/// Computes the ordered header sequence for one query result. The sequence
/// always starts with the two primaries and never contains a duplicate
/// canonical key; identical inputs produce identical output.
pub fn ranked_headers(table: &ResultTable, config: &RankingConfig) -> Vec<String> {
    let book = discover::discover_keys(table);
    let pinned = order::parse_pinned_spec(config.pinned_spec.as_deref());
    if !config.enabled {
        return order::fallback_headers(&book, &pinned);
    }
    if table.rows.is_empty() || book.is_empty() {
        return vec![TIMESTAMP_COLUMN.to_string(), MESSAGE_COLUMN.to_string()];
    }
    match rank_scored(table, config, &book, &pinned) {
        Ok(headers) => headers,
        Err(err) => {
            error!("Column ranking failed, substituting structural fallback: {err:#}");
            order::fallback_headers(&book, &pinned)
        }
    }
}

fn rank_scored(
    table: &ResultTable,
    config: &RankingConfig,
    book: &KeyBook,
    pinned: &[String],
) -> Result<Vec<String>> {
    let sampled = discover::sample(&table.rows, config.sample_size);
    let rules = rules::build_rules(config);
    let mut stats = score::accumulate(table, sampled, book, config)
        .context("Accumulating dimension statistics")?;
    score::score_keys(&mut stats, &rules, config);
    order::apply_pinned(&mut stats, pinned);
    order::order_keys(&mut stats);
    log_top_keys(&stats, sampled.len());

    let mut headers = vec![TIMESTAMP_COLUMN.to_string(), MESSAGE_COLUMN.to_string()];
    headers.extend(
        stats
            .iter()
            .filter(|entry| !order::is_primary(&entry.canonical))
            .map(|entry| entry.display.clone()),
    );
    Ok(headers)
}

fn log_top_keys(stats: &[score::KeyStats], sampled_rows: usize) {
    let summary = stats
        .iter()
        .take(10)
        .map(|entry| {
            format!(
                "{}={:.3} (presence {:.2}, variability {:.2}, boost {:.2})",
                entry.display, entry.score, entry.presence_rate, entry.variability,
                entry.keyword_boost
            )
        })
        .join("; ");
    info!(
        "Ranked {} dimension key(s) over {} sampled row(s): {}",
        stats.len(),
        sampled_rows,
        summary
    );
}
