// Rule Index
//
// Rules grouped per action kind and classification, built once from
// the knowledge base and never mutated afterwards.

use std::collections::HashMap;

use tracing::debug;

use super::patterns::PatternCache;
use crate::kb::{Layer, Rule, RuleType};
use crate::model::ActionKind;

#[derive(Debug, Default)]
struct ActionRules {
    blockers: Vec<usize>,
    infra: Vec<usize>,
    guest: Vec<usize>,
}

/// Arena of rules plus per-action index lists in declaration order.
#[derive(Debug, Default)]
pub struct RuleIndex {
    rules: Vec<Rule>,
    by_action: HashMap<ActionKind, ActionRules>,
    patterns: PatternCache,
}

impl RuleIndex {
    pub fn build(rules: Vec<Rule>) -> Self {
        let mut by_action: HashMap<ActionKind, ActionRules> = HashMap::new();

        for (idx, rule) in rules.iter().enumerate() {
            for &kind in &rule.actions {
                let entry = by_action.entry(kind).or_default();
                let list = match (rule.rule_type, rule.layer) {
                    (RuleType::Blocker, _) => &mut entry.blockers,
                    (RuleType::Rule, Some(Layer::Infra)) => &mut entry.infra,
                    (RuleType::Rule, Some(Layer::Guest)) => &mut entry.guest,
                    (RuleType::Rule, None) => {
                        debug!(rule = %rule.id, "rule has no layer, not indexed");
                        continue;
                    }
                    (RuleType::Override, _) => continue,
                };
                // A rule listing the same action twice is indexed once.
                if list.last() != Some(&idx) {
                    list.push(idx);
                }
            }
        }

        for kind in ActionKind::ALL {
            if let Some(entry) = by_action.get(&kind) {
                debug!(
                    action = %kind,
                    blockers = entry.blockers.len(),
                    infra = entry.infra.len(),
                    guest = entry.guest.len(),
                    "indexed rules"
                );
            }
        }

        let patterns = PatternCache::build(&rules);
        debug!(patterns = patterns.len(), "compiled match patterns");

        Self {
            rules,
            by_action,
            patterns,
        }
    }

    pub fn blockers(&self, kind: ActionKind) -> impl Iterator<Item = &Rule> {
        self.select(kind, |e| &e.blockers)
    }

    pub fn infra(&self, kind: ActionKind) -> impl Iterator<Item = &Rule> {
        self.select(kind, |e| &e.infra)
    }

    pub fn guest(&self, kind: ActionKind) -> impl Iterator<Item = &Rule> {
        self.select(kind, |e| &e.guest)
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Every rule in the arena, including ones that are never indexed.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn select<'a>(
        &'a self,
        kind: ActionKind,
        pick: impl Fn(&'a ActionRules) -> &'a Vec<usize>,
    ) -> impl Iterator<Item = &'a Rule> + 'a {
        self.by_action
            .get(&kind)
            .map(pick)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.rules[idx])
    }
}
