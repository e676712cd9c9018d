// Impact Aggregation
//
// Folds matched rules into one infra and one guest impact by severity
// dominance. Declaration order only decides between rules of equal
// severity: the first one keeps its reason.

use std::collections::HashSet;

use crate::impact::{GuestImpact, InfraImpact, RuleRisk};
use crate::kb::Rule;

#[derive(Debug)]
pub struct Aggregator {
    infra: InfraImpact,
    guest: GuestImpact,
    mitigation_ids: Vec<String>,
    seen_mitigations: HashSet<String>,
    seen_components: HashSet<String>,
}

/// Result of folding every matched non-blocking rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub infra: InfraImpact,
    pub guest: GuestImpact,
    /// Union of the matched rules' mitigation ids, first appearance first.
    pub mitigation_ids: Vec<String>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            infra: InfraImpact::none(),
            guest: GuestImpact::none(),
            mitigation_ids: Vec::new(),
            seen_mitigations: HashSet::new(),
            seen_components: HashSet::new(),
        }
    }

    /// The reason follows reboot severity only. A rule that raises
    /// downtime alone does not replace it.
    pub fn add_infra(&mut self, rule: &Rule) {
        let impact = &rule.impact;

        if let Some(reboot) = impact.reboot {
            if reboot > self.infra.reboot {
                self.infra.reboot = reboot;
                self.infra.reason = impact.reason.clone();
            }
        }
        if let Some(downtime) = impact.downtime {
            if downtime > self.infra.downtime {
                self.infra.downtime = downtime;
            }
        }

        self.collect_mitigations(rule);
    }

    pub fn add_guest(&mut self, rule: &Rule) {
        let impact = &rule.impact;

        if let Some(risk) = impact.risk.and_then(RuleRisk::level) {
            if risk > self.guest.risk {
                self.guest.risk = risk;
                self.guest.reason = impact.reason.clone();
            }
        }
        for component in impact.affected_components.iter().flatten() {
            if self.seen_components.insert(component.clone()) {
                self.guest.affected_components.push(component.clone());
            }
        }

        self.collect_mitigations(rule);
    }

    pub fn finish(self) -> Aggregate {
        Aggregate {
            infra: self.infra,
            guest: self.guest,
            mitigation_ids: self.mitigation_ids,
        }
    }

    fn collect_mitigations(&mut self, rule: &Rule) {
        for id in &rule.mitigations {
            if self.seen_mitigations.insert(id.clone()) {
                self.mitigation_ids.push(id.clone());
            }
        }
    }
}
