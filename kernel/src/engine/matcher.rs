// Rule Matching

use tracing::debug;

use super::condition::evaluate_condition;
use super::patterns::PatternCache;
use crate::context::EvalContext;
use crate::kb::Rule;

/// A rule matches when it lists the action kind and all of its
/// conditions hold. An empty condition list always holds.
pub fn rule_matches(rule: &Rule, ctx: &EvalContext<'_>, patterns: &PatternCache) -> bool {
    let matched = rule.applies_to(ctx.action.kind)
        && rule
            .conditions
            .iter()
            .all(|condition| evaluate_condition(condition, ctx, patterns));

    if matched {
        debug!(rule = %rule.id, "rule matched");
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticSkuCatalog;
    use crate::kb::{Condition, Operator};
    use crate::model::{
        Action, ActionKind, Generation, MachineDescription, OsConfig, OsFamily, VmConfig,
    };
    use serde_json::json;

    fn windows_vm() -> MachineDescription {
        MachineDescription {
            vm: VmConfig {
                sku: "Standard_B2s".into(),
                generation: Generation::Gen1,
                zonal: false,
                zone: None,
            },
            os: OsConfig {
                family: OsFamily::Windows,
                distro: "Windows Server".into(),
                version: "2022".into(),
            },
            disks: Vec::new(),
        }
    }

    fn rule(actions: &[&str], conditions: Vec<Condition>) -> Rule {
        let mut rule: Rule = serde_json::from_value(json!({
            "id": "test-rule",
            "name": "Test",
            "description": "Test rule",
            "actions": actions,
            "impact": { "reboot": "possible", "reason": "test" }
        }))
        .unwrap();
        rule.conditions = conditions;
        rule
    }

    #[test]
    fn unconditional_rule_matches_its_actions() {
        let catalog = StaticSkuCatalog::builtin();
        let m = windows_vm();
        let stop = Action::new(ActionKind::StopVm);
        let ctx = EvalContext::build(&m, &stop, &catalog).unwrap();
        let patterns = PatternCache::default();

        assert!(rule_matches(&rule(&["StopVM"], vec![]), &ctx, &patterns));
        assert!(!rule_matches(&rule(&["DeallocateVM"], vec![]), &ctx, &patterns));
    }

    #[test]
    fn every_condition_must_hold() {
        let catalog = StaticSkuCatalog::builtin();
        let m = windows_vm();
        let stop = Action::new(ActionKind::StopVm);
        let ctx = EvalContext::build(&m, &stop, &catalog).unwrap();
        let patterns = PatternCache::default();

        let windows = Condition::new("os.family", Operator::Eq, "Windows");
        let gen1 = Condition::new("vm.generation", Operator::Eq, "Gen1");
        let zonal = Condition::new("vm.zonal", Operator::Eq, true);

        assert!(rule_matches(
            &rule(&["StopVM"], vec![windows.clone(), gen1]),
            &ctx,
            &patterns
        ));
        assert!(!rule_matches(&rule(&["StopVM"], vec![windows, zonal]), &ctx, &patterns));
    }
}
