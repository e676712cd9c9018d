// Impact Engine
//
// Runs one action against one machine:
// context → blockers → infra/guest aggregation → mitigations → report

use tracing::{info, info_span};

use crate::catalog::SkuCatalog;
use crate::context::EvalContext;
use crate::impact::ImpactReport;
use crate::kb::{KnowledgeBase, Rule};
use crate::model::{Action, MachineDescription};

pub mod aggregate;
pub mod condition;
pub mod explain;
pub mod index;
pub mod matcher;
pub mod mitigations;
pub mod patterns;

use aggregate::Aggregator;
use index::RuleIndex;
use matcher::rule_matches;
use mitigations::MitigationTable;

/// Evaluator bound to one knowledge base and one SKU catalog.
///
/// The rule index is built at construction and read-only afterwards, so
/// a single engine can serve concurrent callers without locking.
#[derive(Debug)]
pub struct ImpactEngine<C: SkuCatalog> {
    index: RuleIndex,
    mitigations: MitigationTable,
    catalog: C,
}

impl<C: SkuCatalog> ImpactEngine<C> {
    pub fn new(kb: KnowledgeBase, catalog: C) -> Self {
        Self {
            index: RuleIndex::build(kb.rules),
            mitigations: MitigationTable::new(kb.mitigations),
            catalog,
        }
    }

    /// Evaluate the impact of `action` on `machine`.
    ///
    /// This function is:
    /// - deterministic
    /// - side-effect free
    /// - infallible: invalid SKUs produce a blocked report
    pub fn evaluate(&self, machine: &MachineDescription, action: &Action) -> ImpactReport {
        let span = info_span!("evaluate", action = %action.kind);
        let _guard = span.enter();

        let report = self.run(machine, action);
        info!(
            blocked = report.blocked,
            matched = report.matched_rules.len(),
            "evaluation finished"
        );
        report
    }

    fn run(&self, machine: &MachineDescription, action: &Action) -> ImpactReport {
        // 1. Build context
        let ctx = match EvalContext::build(machine, action, &self.catalog) {
            Ok(ctx) => ctx,
            Err(err) => return ImpactReport::invalid_configuration(err.to_string()),
        };
        let kind = action.kind;
        let patterns = self.index.patterns();

        // 2. First matching blocker wins
        if let Some(blocker) = self
            .index
            .blockers(kind)
            .find(|r| rule_matches(r, &ctx, patterns))
        {
            return ImpactReport::blocked_by(&blocker.id, blocker.block_reason());
        }

        // 3. Aggregate infra then guest rules
        let infra: Vec<&Rule> = self
            .index
            .infra(kind)
            .filter(|r| rule_matches(r, &ctx, patterns))
            .collect();
        let guest: Vec<&Rule> = self
            .index
            .guest(kind)
            .filter(|r| rule_matches(r, &ctx, patterns))
            .collect();

        let mut aggregator = Aggregator::new();
        for rule in &infra {
            aggregator.add_infra(rule);
        }
        for rule in &guest {
            aggregator.add_guest(rule);
        }
        let aggregate = aggregator.finish();

        // 4. Resolve mitigations and explain
        let matched: Vec<&Rule> = infra.into_iter().chain(guest).collect();
        let explanation = explain::explanation(&aggregate.infra, &aggregate.guest, &matched);

        ImpactReport {
            blocked: false,
            blocker_reason: None,
            mitigations: self.mitigations.resolve(&aggregate.mitigation_ids),
            explanation,
            matched_rules: matched.iter().map(|r| r.id.clone()).collect(),
            infra: aggregate.infra,
            guest: aggregate.guest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticSkuCatalog;
    use crate::impact::{RebootLevel, RiskLevel, NO_INFRA_IMPACT};
    use crate::kb::Mitigation;
    use crate::model::{ActionKind, Generation, OsConfig, OsFamily, VmConfig};
    use serde_json::json;

    fn machine(sku: &str) -> MachineDescription {
        MachineDescription {
            vm: VmConfig {
                sku: sku.into(),
                generation: Generation::Gen2,
                zonal: true,
                zone: Some("2".into()),
            },
            os: OsConfig {
                family: OsFamily::Linux,
                distro: "RHEL".into(),
                version: "9".into(),
            },
            disks: Vec::new(),
        }
    }

    fn kb() -> KnowledgeBase {
        let rules: Vec<Rule> = serde_json::from_value(json!([
            {
                "id": "stop-blocked-on-arm",
                "name": "No Stop On ARM",
                "description": "blocked",
                "type": "blocker",
                "actions": ["StopVM"],
                "conditions": [{ "field": "vm.processor", "operator": "eq", "value": "ARM" }],
                "impact": { "reason": "ARM machines cannot be stopped here." }
            },
            {
                "id": "stop-reboot",
                "name": "Stop",
                "description": "Stopping",
                "layer": "infra",
                "actions": ["StopVM"],
                "impact": { "reboot": "guaranteed", "downtime": "medium", "reason": "Stops." },
                "mitigations": ["notify", "ghost"]
            },
            {
                "id": "stop-guest",
                "name": "Guest",
                "description": "Guest side",
                "layer": "guest",
                "actions": ["StopVM"],
                "impact": { "risk": "medium", "reason": "Apps stop.", "affectedComponents": ["Apps"] },
                "mitigations": ["drain"]
            }
        ]))
        .unwrap();
        let mitigations: Vec<Mitigation> = serde_json::from_value(json!([
            { "id": "notify", "title": "Notify", "description": "Tell users." },
            { "id": "drain", "title": "Drain", "description": "Drain traffic.", "required": true }
        ]))
        .unwrap();
        KnowledgeBase::new(rules, mitigations)
    }

    #[test]
    fn aggregates_matched_rules() {
        let engine = ImpactEngine::new(kb(), StaticSkuCatalog::builtin());
        let report = engine.evaluate(&machine("Standard_D4s_v5"), &Action::new(ActionKind::StopVm));

        assert!(!report.blocked);
        assert_eq!(report.infra.reboot, RebootLevel::Guaranteed);
        assert_eq!(report.guest.risk, RiskLevel::Medium);
        assert_eq!(report.matched_rules, ["stop-reboot", "stop-guest"]);
        let ids: Vec<_> = report.mitigations.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["drain", "notify"]);
        assert!(report.explanation.contains("- Stop: Stopping"));
    }

    #[test]
    fn blocker_short_circuits() {
        let engine = ImpactEngine::new(kb(), StaticSkuCatalog::builtin());
        let report = engine.evaluate(
            &machine("Standard_D4pls_v5"),
            &Action::new(ActionKind::StopVm),
        );

        assert!(report.blocked);
        assert_eq!(
            report.blocker_reason.as_deref(),
            Some("ARM machines cannot be stopped here.")
        );
        assert_eq!(report.matched_rules, ["stop-blocked-on-arm"]);
        assert_eq!(report.infra.reason, NO_INFRA_IMPACT);
        assert!(report.mitigations.is_empty());
    }

    #[test]
    fn invalid_sku_becomes_blocked_report() {
        let engine = ImpactEngine::new(kb(), StaticSkuCatalog::builtin());
        let report = engine.evaluate(&machine("Standard_Bogus"), &Action::new(ActionKind::StopVm));

        assert!(report.blocked);
        assert!(report.blocker_reason.unwrap().contains("Standard_Bogus"));
        assert!(report.explanation.starts_with("**ERROR:**"));
        assert!(report.matched_rules.is_empty());
    }

    #[test]
    fn action_without_rules_is_zero_impact() {
        let engine = ImpactEngine::new(kb(), StaticSkuCatalog::builtin());
        let report = engine.evaluate(&machine("Standard_D4s_v5"), &Action::new(ActionKind::AddNic));

        assert!(!report.blocked);
        assert_eq!(report.infra.reboot, RebootLevel::None);
        assert_eq!(report.guest.risk, RiskLevel::Low);
        assert!(report.matched_rules.is_empty());
        assert_eq!(report.explanation, "");
    }

    #[test]
    fn rule_without_layer_never_contributes() {
        let mut kb = kb();
        kb.rules.push(
            serde_json::from_value(json!({
                "id": "guest-no-layer",
                "name": "No layer",
                "description": "layer omitted",
                "actions": ["AddNIC"],
                "impact": { "risk": "critical", "reason": "would be critical" }
            }))
            .unwrap(),
        );
        let engine = ImpactEngine::new(kb, StaticSkuCatalog::builtin());

        let report = engine.evaluate(&machine("Standard_D4s_v5"), &Action::new(ActionKind::AddNic));

        assert!(report.matched_rules.is_empty());
        assert_eq!(report.guest.risk, RiskLevel::Low);
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImpactEngine<StaticSkuCatalog>>();
    }
}
