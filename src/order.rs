//! Deterministic ordering of scored keys, plus the score-free structural
//! fallback used when ranking is disabled or fails.

use std::cmp::Ordering;

use crate::{
    data::{MESSAGE_COLUMN, TIMESTAMP_COLUMN},
    discover::KeyBook,
    score::KeyStats,
};

/// Canonical name of the promotable event-id key.
const EVENT_ID_CANONICAL: &str = "eventid";
/// Display casing used when the event-id key is promoted by the fallback.
const EVENT_ID_DISPLAY: &str = "eventId";

/// Parses the operator's pinned-column spec: comma-separated, order
/// significant, case-insensitive, first occurrence wins.
pub fn parse_pinned_spec(spec: Option<&str>) -> Vec<String> {
    let mut pinned = Vec::new();
    let Some(spec) = spec else {
        return pinned;
    };
    for part in spec.split(',') {
        let canonical = part.trim().to_ascii_lowercase();
        if !canonical.is_empty() && !pinned.iter().any(|seen| seen == &canonical) {
            pinned.push(canonical);
        }
    }
    pinned
}

/// Stamps each key's position in the pinned spec, if any.
pub fn apply_pinned(stats: &mut [KeyStats], pinned: &[String]) {
    for entry in stats.iter_mut() {
        entry.pinned_rank = pinned.iter().position(|name| name == &entry.canonical);
    }
}

/// Sorts keys by the full comparator cascade. Every level breaks ties from
/// the previous one; the final level compares unique canonical keys, so the
/// ordering is a strict total order no matter what order the keys arrived in.
pub fn order_keys(stats: &mut [KeyStats]) {
    stats.sort_by(compare_keys);
}

fn compare_keys(a: &KeyStats, b: &KeyStats) -> Ordering {
    match (a.pinned_rank, b.pinned_rank) {
        (Some(left), Some(right)) => return left.cmp(&right),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.keyword_matches.cmp(&a.keyword_matches))
        .then_with(|| b.presence_rate.total_cmp(&a.presence_rate))
        .then_with(|| b.variability.total_cmp(&a.variability))
        .then_with(|| a.avg_len.total_cmp(&b.avg_len))
        .then_with(|| a.canonical.cmp(&b.canonical))
}

/// Structural header ordering: the two primaries, a promoted `eventId` when
/// discovered, pinned keys in spec order, then the remaining keys sorted
/// case-insensitively with first-seen casing as the tie-break.
pub fn fallback_headers(book: &KeyBook, pinned: &[String]) -> Vec<String> {
    let mut headers = vec![TIMESTAMP_COLUMN.to_string(), MESSAGE_COLUMN.to_string()];
    let promote_event_id = book.contains(EVENT_ID_CANONICAL);
    if promote_event_id {
        headers.push(EVENT_ID_DISPLAY.to_string());
    }
    for canonical in pinned {
        if canonical == EVENT_ID_CANONICAL || is_primary(canonical) {
            continue;
        }
        if let Some(display) = book.display(canonical) {
            headers.push(display.to_string());
        }
    }
    let mut rest = book
        .iter()
        .filter(|key| {
            key.canonical != EVENT_ID_CANONICAL
                && !is_primary(&key.canonical)
                && !pinned.iter().any(|name| name == &key.canonical)
        })
        .collect::<Vec<_>>();
    rest.sort_by(|a, b| {
        a.canonical
            .cmp(&b.canonical)
            .then_with(|| a.display.cmp(&b.display))
    });
    headers.extend(rest.into_iter().map(|key| key.display.clone()));
    headers
}

/// A dimension key shadowing a primary column is dropped from the header
/// sequence rather than duplicated.
pub fn is_primary(canonical: &str) -> bool {
    canonical == TIMESTAMP_COLUMN || canonical == MESSAGE_COLUMN
}
