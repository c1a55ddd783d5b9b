//! Per-key statistics accumulation and scoring.
//!
//! The accumulator walks the sampled rows exactly once, flattening each
//! dimensions value into a scratch map of lower-cased key to value text and
//! updating raw counters for every discovered key. The scorer then converts
//! the counters into one score per key. Cost is O(sampledRows x keys),
//! bounded by the sampler and the distinct/length caps.

use std::collections::{HashMap, HashSet};

use anyhow::Result;

use crate::{
    data::{DIMENSIONS_COLUMN, ResultTable},
    discover::KeyBook,
    flatten::{self, FlatField},
    rank::RankingConfig,
    rules::BoostRule,
};

/// The scratch map is rebuilt from empty once its table grows past this many
/// slots; one freak row must not pin a huge allocation for the whole pass.
const SCRATCH_RESET_CAPACITY: usize = 1024;

/// Raw counters plus derived metrics for one canonical key. Mutated once per
/// sampled row, scored once, then read-only for the orderer.
#[derive(Debug)]
pub struct KeyStats {
    pub canonical: String,
    pub display: String,
    pub occurrences: usize,
    pub non_empty: usize,
    pub distinct: HashSet<String>,
    pub total_len: usize,
    pub boolean_like: bool,
    pub presence_rate: f64,
    pub variability: f64,
    pub avg_len: f64,
    pub length_ratio: f64,
    pub type_bias: f64,
    pub keyword_boost: f64,
    pub keyword_matches: usize,
    pub score: f64,
    /// Position in the operator's pinned spec, when the key is pinned.
    pub pinned_rank: Option<usize>,
}

impl KeyStats {
    fn new(canonical: String, display: String) -> Self {
        Self {
            canonical,
            display,
            occurrences: 0,
            non_empty: 0,
            distinct: HashSet::new(),
            total_len: 0,
            boolean_like: false,
            presence_rate: 0.0,
            variability: 0.0,
            avg_len: 0.0,
            length_ratio: 0.0,
            type_bias: 0.0,
            keyword_boost: 0.0,
            keyword_matches: 0,
            score: 0.0,
            pinned_rank: None,
        }
    }
}

/// Accumulates raw counters over `sampled` for every key in `book`. After
/// this returns, every entry's `occurrences` equals the sampled row count.
pub fn accumulate(
    table: &ResultTable,
    sampled: &[Vec<serde_json::Value>],
    book: &KeyBook,
    config: &RankingConfig,
) -> Result<Vec<KeyStats>> {
    let mut stats = book
        .iter()
        .map(|key| KeyStats::new(key.canonical.clone(), key.display.clone()))
        .collect::<Vec<_>>();
    let Some(dims_idx) = table.column_index(DIMENSIONS_COLUMN) else {
        return Ok(stats);
    };
    let distinct_cap = config.distinct_cap.max(1);

    let mut fields: Vec<FlatField> = Vec::new();
    let mut scratch: HashMap<String, String> = HashMap::new();
    for row in sampled {
        if scratch.capacity() > SCRATCH_RESET_CAPACITY {
            scratch = HashMap::new();
        } else {
            scratch.clear();
        }
        if let Some(value) = row.get(dims_idx) {
            fields.clear();
            flatten::flatten_dimensions(value, &mut fields)?;
            for field in fields.drain(..) {
                scratch
                    .entry(field.key.to_ascii_lowercase())
                    .or_insert(field.value);
            }
        }
        for entry in stats.iter_mut() {
            entry.occurrences += 1;
            let Some(value) = scratch.get(&entry.canonical) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            entry.non_empty += 1;
            entry.total_len += value.chars().count();
            if entry.distinct.len() < distinct_cap {
                entry.distinct.insert(value.clone());
            }
            if !entry.boolean_like && (value == "true" || value == "false") {
                entry.boolean_like = true;
            }
        }
    }
    Ok(stats)
}

/// Derives the once-computed metrics and the final score for every key.
pub fn score_keys(stats: &mut [KeyStats], rules: &[BoostRule], config: &RankingConfig) {
    let distinct_cap = config.distinct_cap.max(1) as f64;
    let length_cap = config.length_cap.max(1) as f64;
    for entry in stats.iter_mut() {
        if entry.occurrences == 0 {
            continue;
        }
        entry.presence_rate = entry.non_empty as f64 / entry.occurrences as f64;
        entry.variability = (entry.distinct.len() as f64 / distinct_cap).min(1.0);
        entry.avg_len = if entry.non_empty > 0 {
            entry.total_len as f64 / entry.non_empty as f64
        } else {
            0.0
        };
        entry.length_ratio = (entry.avg_len / length_cap).min(1.0);

        // The biases stack; a short boolean-like key earns both bonuses.
        let mut bias = 0.0;
        if entry.boolean_like {
            bias += 0.2;
        }
        if (1..=5).contains(&entry.distinct.len()) && entry.avg_len <= 12.0 {
            bias += 0.2;
        }
        if entry.avg_len >= 120.0 {
            bias -= 0.2;
        }
        entry.type_bias = bias;

        // Boosts scale with presence; the gated rule zeroes out entirely
        // below its threshold.
        let mut boost = 0.0;
        let mut matches = 0;
        for rule in rules {
            if rule.pattern.is_match(&entry.canonical) {
                matches += 1;
                if !(rule.presence_gated && entry.presence_rate < rule.min_presence) {
                    boost += rule.boost * entry.presence_rate;
                }
            }
        }
        entry.keyword_matches = matches;
        entry.keyword_boost = boost;

        entry.score = config.weight_presence * entry.presence_rate
            + config.weight_variability * (entry.variability * entry.presence_rate)
            + entry.keyword_boost
            + config.weight_length * entry.length_ratio
            + config.weight_type * entry.type_bias;
    }
}
