// Pattern Cache
//
// `matches` patterns compiled once per knowledge base. Evaluation only
// reads the cache; a pattern that is not in it (one taken from a context
// reference) is compiled on the spot.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::kb::{Operator, Rule};

#[derive(Debug, Default)]
pub struct PatternCache {
    /// `None` marks a pattern that failed to compile.
    compiled: HashMap<String, Option<Regex>>,
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            debug!(%pattern, %err, "invalid pattern, condition fails closed");
            None
        }
    }
}

impl PatternCache {
    pub fn build<'r>(rules: impl IntoIterator<Item = &'r Rule>) -> Self {
        let mut compiled = HashMap::new();
        let literals = rules
            .into_iter()
            .flat_map(|rule| &rule.conditions)
            .filter(|c| c.operator == Operator::Matches)
            .filter_map(|c| match &c.value {
                Value::String(pattern) => Some(pattern),
                _ => None,
            });

        for pattern in literals {
            if !compiled.contains_key(pattern) {
                compiled.insert(pattern.clone(), compile(pattern));
            }
        }

        Self { compiled }
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn is_match(&self, pattern: &str, text: &str) -> bool {
        match self.compiled.get(pattern) {
            Some(Some(re)) => re.is_match(text),
            Some(None) => false,
            None => compile(pattern).is_some_and(|re| re.is_match(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule_with(conditions: Value) -> Rule {
        serde_json::from_value(json!({
            "id": "drive-letter",
            "name": "Drive letter",
            "description": "d",
            "layer": "guest",
            "actions": ["DetachDisk"],
            "conditions": conditions,
            "impact": { "reason": "r" }
        }))
        .unwrap()
    }

    #[test]
    fn compiles_each_literal_pattern_once() {
        let a = rule_with(json!([
            { "field": "disk.driveLetter", "operator": "matches", "value": "^[D-Zd-z]:?$" },
            { "field": "disk.mount", "operator": "eq", "value": "/data" }
        ]));
        let b = rule_with(json!([
            { "field": "disk.driveLetter", "operator": "matches", "value": "^[D-Zd-z]:?$" },
            { "field": "vm.sku", "operator": "matches", "value": "(unclosed" }
        ]));

        let cache = PatternCache::build([&a, &b]);

        assert_eq!(cache.len(), 2);
        assert!(cache.is_match("^[D-Zd-z]:?$", "F:"));
        assert!(!cache.is_match("^[D-Zd-z]:?$", "C:"));
        assert!(!cache.is_match("(unclosed", "(unclosed"));
    }

    #[test]
    fn uncached_patterns_compile_on_demand() {
        let cache = PatternCache::default();

        assert!(cache.is_empty());
        assert!(cache.is_match("^Standard_D", "Standard_D4s_v5"));
        assert!(!cache.is_match("[", "["));
    }
}
