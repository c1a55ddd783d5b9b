//! Keyword boost rules biasing the column scorer toward conventionally
//! interesting dimension keys.
//!
//! The active rule set is rebuilt for every ranking invocation: six built-in
//! patterns, any operator-supplied rules, and an implicit `^al` prefix rule
//! unless an operator rule already covers that prefix. Operator specs are
//! parsed leniently; a bad fragment is skipped with a diagnostic and never
//! invalidates the rest of the set.

use log::warn;
use regex::Regex;
use serde_json::Value;

use crate::rank::RankingConfig;

/// Compiled boost rule. `min_presence` only applies when `presence_gated`.
#[derive(Debug)]
pub struct BoostRule {
    pub pattern: Regex,
    pub boost: f64,
    pub presence_gated: bool,
    pub min_presence: f64,
}

impl BoostRule {
    fn fixed(pattern: Regex, boost: f64) -> Self {
        Self {
            pattern,
            boost,
            presence_gated: false,
            min_presence: 0.0,
        }
    }
}

const BUILTIN_RULES: &[(&str, f64)] = &[
    (r"(?i)^(request|operation|correlation|trace|span)", 2.5),
    (r"(?i)status|result|outcome", 2.0),
    (r"(?i)error|exception|severity", 3.0),
    (r"(?i)duration|latency|elapsed", 2.0),
    (r"(?i)user|session|tenant|company|environment", 2.0),
    (r"(?i)id$", 2.0),
];

const AL_PREFIX_PATTERN: &str = r"(?i)^al";

/// Builds the active rule set for one ranking invocation.
pub fn build_rules(config: &RankingConfig) -> Vec<BoostRule> {
    let mut rules = BUILTIN_RULES
        .iter()
        .map(|(pattern, boost)| {
            let regex = Regex::new(pattern).expect("built-in rule pattern compiles");
            BoostRule::fixed(regex, *boost)
        })
        .collect::<Vec<_>>();

    if let Some(spec) = config.rule_spec.as_deref() {
        parse_rule_spec(spec, &mut rules);
    }

    // The implicit prefix rule stands down if an operator rule already
    // covers keys starting with "al".
    if !rules.iter().any(|rule| rule.pattern.is_match("al")) {
        let regex = Regex::new(AL_PREFIX_PATTERN).expect("al prefix pattern compiles");
        rules.push(BoostRule {
            pattern: regex,
            boost: config.al_boost,
            presence_gated: true,
            min_presence: config.al_min_presence.clamp(0.0, 1.0),
        });
    }

    rules
}

/// Parses an operator rule spec: a JSON object mapping pattern to boost, or
/// semicolon-delimited `pattern=boost` fragments. Malformed JSON recovers by
/// stripping the outer braces and re-reading the remainder as fragments with
/// commas accepted as separators.
fn parse_rule_spec(spec: &str, rules: &mut Vec<BoostRule>) {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return;
    }
    if trimmed.starts_with('{') {
        match serde_json::from_str::<serde_json::Map<String, Value>>(trimmed) {
            Ok(entries) => {
                for (pattern, boost) in &entries {
                    if let Some(rule) = compile_json_rule(pattern, boost) {
                        rules.push(rule);
                    }
                }
                return;
            }
            Err(err) => {
                warn!("Rule spec is not valid JSON ({err}); re-reading as fragments");
                let stripped = trimmed
                    .trim_start_matches('{')
                    .trim_end_matches('}');
                parse_fragments(stripped, &[';', ','], rules);
                return;
            }
        }
    }
    parse_fragments(trimmed, &[';'], rules);
}

fn parse_fragments(spec: &str, separators: &[char], rules: &mut Vec<BoostRule>) {
    for fragment in spec.split(separators) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        if let Some(rule) = compile_fragment(fragment) {
            rules.push(rule);
        }
    }
}

fn compile_fragment(fragment: &str) -> Option<BoostRule> {
    let Some((pattern, boost)) = fragment.split_once('=') else {
        warn!("Skipping rule fragment '{fragment}': expected pattern=boost");
        return None;
    };
    let pattern = pattern.trim();
    let boost = boost.trim();
    if pattern.is_empty() || boost.is_empty() {
        warn!("Skipping rule fragment '{fragment}': empty pattern or boost");
        return None;
    }
    let boost: f64 = match boost.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!("Skipping rule fragment '{fragment}': boost '{boost}' is not numeric");
            return None;
        }
    };
    compile_pattern(pattern, boost)
}

fn compile_json_rule(pattern: &str, boost: &Value) -> Option<BoostRule> {
    let boost = match boost {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(boost) = boost else {
        warn!("Skipping rule '{pattern}': boost is not numeric");
        return None;
    };
    compile_pattern(pattern, boost)
}

fn compile_pattern(pattern: &str, boost: f64) -> Option<BoostRule> {
    match Regex::new(pattern) {
        Ok(regex) => Some(BoostRule::fixed(regex, boost)),
        Err(err) => {
            warn!("Skipping rule '{pattern}': {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_spec(spec: Option<&str>) -> RankingConfig {
        RankingConfig {
            rule_spec: spec.map(str::to_string),
            ..RankingConfig::default()
        }
    }

    fn boost_for(rules: &[BoostRule], key: &str) -> f64 {
        rules
            .iter()
            .filter(|rule| rule.pattern.is_match(key))
            .map(|rule| rule.boost)
            .sum()
    }

    #[test]
    fn default_set_is_builtins_plus_al_prefix() {
        let rules = build_rules(&RankingConfig::default());
        assert_eq!(rules.len(), BUILTIN_RULES.len() + 1);
        let al = rules.last().unwrap();
        assert!(al.presence_gated);
        assert!(al.pattern.is_match("alertName"));
        assert!(!al.pattern.is_match("normal"));
    }

    #[test]
    fn builtin_patterns_cover_conventional_keys() {
        let rules = build_rules(&RankingConfig::default());
        assert!(boost_for(&rules, "requestpath") > 0.0);
        assert!(boost_for(&rules, "resultcode") > 0.0);
        assert!(boost_for(&rules, "errorcount") > 0.0);
        assert!(boost_for(&rules, "durationms") > 0.0);
        assert!(boost_for(&rules, "tenantname") > 0.0);
        assert!(boost_for(&rules, "sessionid") > 0.0);
        assert_eq!(boost_for(&rules, "payload"), 0.0);
    }

    #[test]
    fn semicolon_spec_skips_bad_fragments_and_keeps_the_rest() {
        let rules = build_rules(&config_with_spec(Some("(?i)^foo=5;badfragment;(?i)end$=2")));
        assert_eq!(rules.len(), BUILTIN_RULES.len() + 2 + 1);
        assert_eq!(boost_for(&rules, "foothing"), 5.0);
        assert_eq!(boost_for(&rules, "backend"), 2.0);
    }

    #[test]
    fn fragment_with_bad_boost_or_bad_regex_is_skipped() {
        let rules = build_rules(&config_with_spec(Some("a=notanumber;(unclosed=2;=3;x=")));
        assert_eq!(rules.len(), BUILTIN_RULES.len() + 1);
    }

    #[test]
    fn json_object_spec_maps_patterns_to_boosts() {
        let rules = build_rules(&config_with_spec(Some(r#"{"(?i)^foo": 4, "bar": "1.5"}"#)));
        assert_eq!(boost_for(&rules, "foothing"), 4.0);
        assert_eq!(boost_for(&rules, "rebar"), 1.5);
    }

    #[test]
    fn malformed_json_recovers_as_comma_separated_fragments() {
        let rules = build_rules(&config_with_spec(Some("{^foo=2, bar=3}")));
        assert_eq!(boost_for(&rules, "foothing"), 2.0);
        assert_eq!(boost_for(&rules, "rebar"), 3.0);
    }

    #[test]
    fn operator_rule_covering_al_suppresses_the_implicit_rule() {
        let rules = build_rules(&config_with_spec(Some("(?i)^al=9")));
        let implicit = rules
            .iter()
            .filter(|rule| rule.presence_gated)
            .count();
        assert_eq!(implicit, 0);
        assert_eq!(boost_for(&rules, "alpha"), 9.0);
    }

    #[test]
    fn al_threshold_is_clamped_to_unit_interval() {
        let config = RankingConfig {
            al_min_presence: 7.5,
            ..RankingConfig::default()
        };
        let rules = build_rules(&config);
        let al = rules.last().unwrap();
        assert!(al.presence_gated);
        assert_eq!(al.min_presence, 1.0);
    }
}
