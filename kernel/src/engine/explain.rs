// Explanation Text
//
// Markdown-flavoured summary of an evaluation, paragraphs separated by
// blank lines.

use crate::impact::{GuestImpact, InfraImpact, RebootLevel, RiskLevel};
use crate::kb::Rule;

pub fn explanation(infra: &InfraImpact, guest: &GuestImpact, matched: &[&Rule]) -> String {
    let mut parts = Vec::new();

    if infra.reboot != RebootLevel::None {
        parts.push(format!(
            "**Infrastructure Impact:** {} reboot with {} downtime. {}",
            infra.reboot.as_str(),
            infra.downtime.as_str(),
            infra.reason
        ));
    }

    if guest.risk != RiskLevel::Low {
        parts.push(format!(
            "**Guest OS Impact:** {} risk. {}",
            guest.risk.as_str(),
            guest.reason
        ));
        if !guest.affected_components.is_empty() {
            parts.push(format!(
                "Affected components: {}",
                guest.affected_components.join(", ")
            ));
        }
    }

    if !matched.is_empty() {
        parts.push("\n**Matched Rules:**".to_string());
        for rule in matched {
            parts.push(format!("- {}: {}", rule.name, rule.description));
        }
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::DowntimeLevel;
    use serde_json::json;

    #[test]
    fn zero_impact_without_rules_is_empty() {
        assert_eq!(
            explanation(&InfraImpact::none(), &GuestImpact::none(), &[]),
            ""
        );
    }

    #[test]
    fn full_explanation_layout() {
        let rule: Rule = serde_json::from_value(json!({
            "id": "lvm-detach",
            "name": "LVM Detach",
            "description": "Detaching an LVM disk",
            "actions": ["DetachDisk"],
            "impact": { "reason": "x" }
        }))
        .unwrap();
        let infra = InfraImpact {
            reboot: RebootLevel::Guaranteed,
            downtime: DowntimeLevel::Medium,
            reason: "Moves hosts.".into(),
        };
        let guest = GuestImpact {
            risk: RiskLevel::Critical,
            reason: "Data loss.".into(),
            affected_components: vec!["Volume Group".into(), "Filesystem".into()],
        };

        let text = explanation(&infra, &guest, &[&rule]);

        assert_eq!(
            text,
            "**Infrastructure Impact:** guaranteed reboot with medium downtime. Moves hosts.\n\n\
             **Guest OS Impact:** critical risk. Data loss.\n\n\
             Affected components: Volume Group, Filesystem\n\n\
             \n**Matched Rules:**\n\n\
             - LVM Detach: Detaching an LVM disk"
        );
    }
}
