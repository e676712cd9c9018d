// Knowledge Base Validation
//
// Build-time checks for a compiled knowledge base. The engine itself
// trusts its input and fails closed on anything malformed; this is
// where malformed input is reported instead.

use std::collections::HashSet;
use std::fmt;

use super::{KnowledgeBase, Operator, RuleType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding, attributed to a rule or mitigation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{marker}: {}: {}", self.subject, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    fn error(&mut self, subject: &str, message: impl Into<String>) {
        self.findings.push(Finding {
            severity: Severity::Error,
            subject: subject.to_string(),
            message: message.into(),
        });
    }

    fn warning(&mut self, subject: &str, message: impl Into<String>) {
        self.findings.push(Finding {
            severity: Severity::Warning,
            subject: subject.to_string(),
            message: message.into(),
        });
    }
}

/// Identifiers are lowercase ASCII letters, digits and dashes.
pub fn is_kebab_case(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

pub fn validate(kb: &KnowledgeBase) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut mitigation_ids = HashSet::new();
    for mitigation in &kb.mitigations {
        let id = mitigation.id.as_str();
        if !mitigation_ids.insert(id) {
            report.error(id, "duplicate mitigation id");
        }
        if !is_kebab_case(id) {
            report.error(id, "mitigation id must be kebab-case");
        }
        if mitigation.title.trim().is_empty() {
            report.error(id, "mitigation title is empty");
        }
        if mitigation.description.trim().is_empty() {
            report.error(id, "mitigation description is empty");
        }
    }

    let mut rule_ids = HashSet::new();
    for rule in &kb.rules {
        let id = rule.id.as_str();
        if !rule_ids.insert(id) {
            report.error(id, "duplicate rule id");
        }
        if !is_kebab_case(id) {
            report.error(id, "rule id must be kebab-case");
        }
        if rule.name.trim().is_empty() {
            report.error(id, "rule name is empty");
        }
        if rule.description.trim().is_empty() {
            report.error(id, "rule description is empty");
        }
        if rule.actions.is_empty() {
            report.error(id, "rule applies to no actions");
        }
        if rule.rule_type == RuleType::Rule && rule.layer.is_none() {
            report.error(id, "rule must specify a layer (infra or guest)");
        }

        for condition in &rule.conditions {
            if condition.operator == Operator::Unknown {
                report.error(
                    id,
                    format!("unknown operator in condition on `{}`", condition.field),
                );
            }
        }

        if rule.rule_type == RuleType::Override
            && rule.override_targets.as_ref().map_or(true, Vec::is_empty)
        {
            report.error(id, "override rules must specify overrideTargets");
        }

        for mitigation in &rule.mitigations {
            if !mitigation_ids.contains(mitigation.as_str()) {
                report.error(id, format!("references unknown mitigation `{mitigation}`"));
            }
        }

        if rule.sources.is_empty() {
            report.warning(id, "rule has no sources");
        }
        if rule.deprecated && rule.deprecated_by.is_none() {
            report.warning(id, "deprecated rule has no replacement");
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::{Condition, Mitigation, Rule};
    use serde_json::json;

    fn rule(value: serde_json::Value) -> Rule {
        serde_json::from_value(value).unwrap()
    }

    fn mitigation(id: &str) -> Mitigation {
        serde_json::from_value(json!({ "id": id, "title": "T", "description": "D" })).unwrap()
    }

    fn sourced(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "N",
            "description": "D",
            "layer": "infra",
            "actions": ["StopVM"],
            "impact": { "reason": "r" },
            "sources": [{ "title": "docs", "url": "https://example.com" }]
        })
    }

    #[test]
    fn clean_knowledge_base_passes() {
        let kb = KnowledgeBase::new(vec![rule(sourced("stop-vm"))], vec![mitigation("notify-users")]);
        let report = validate(&kb);

        assert!(report.is_ok());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn structural_errors_are_reported() {
        let mut bad = rule(sourced("Bad_Id"));
        bad.mitigations = vec!["missing-step".into()];
        bad.conditions = vec![Condition::new("vm.sku", Operator::Unknown, "x")];

        let mut override_rule = rule(sourced("override-a"));
        override_rule.rule_type = RuleType::Override;

        let kb = KnowledgeBase::new(
            vec![rule(sourced("dup")), rule(sourced("dup")), bad, override_rule],
            vec![mitigation("step"), mitigation("step")],
        );
        let report = validate(&kb);
        let messages: Vec<String> = report.errors().map(ToString::to_string).collect();

        assert!(!report.is_ok());
        assert!(messages.contains(&"error: dup: duplicate rule id".to_string()));
        assert!(messages.contains(&"error: step: duplicate mitigation id".to_string()));
        assert!(messages.contains(&"error: Bad_Id: rule id must be kebab-case".to_string()));
        assert!(messages
            .iter()
            .any(|m| m.contains("references unknown mitigation `missing-step`")));
        assert!(messages.iter().any(|m| m.contains("unknown operator")));
        assert!(messages
            .iter()
            .any(|m| m.contains("override-a: override rules must specify overrideTargets")));
    }

    #[test]
    fn rule_without_layer_is_an_error() {
        let mut unlayered = rule(sourced("guest-no-layer"));
        unlayered.layer = None;
        let mut blocker = rule(sourced("blocker-no-layer"));
        blocker.layer = None;
        blocker.rule_type = RuleType::Blocker;

        let report = validate(&KnowledgeBase::new(vec![unlayered, blocker], vec![]));
        let messages: Vec<String> = report.errors().map(ToString::to_string).collect();

        assert_eq!(
            messages,
            ["error: guest-no-layer: rule must specify a layer (infra or guest)"]
        );
    }

    #[test]
    fn metadata_gaps_are_warnings() {
        let mut deprecated = rule(sourced("old-rule"));
        deprecated.deprecated = true;
        deprecated.sources.clear();

        let report = validate(&KnowledgeBase::new(vec![deprecated], vec![]));

        assert!(report.is_ok());
        assert_eq!(report.warnings().count(), 2);
    }

    #[test]
    fn kebab_case_ids() {
        assert!(is_kebab_case("blocker-x86-to-arm"));
        assert!(!is_kebab_case(""));
        assert!(!is_kebab_case("snake_case"));
        assert!(!is_kebab_case("Upper"));
    }
}
