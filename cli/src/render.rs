// Plain-text report rendering.

use std::fmt;

use vmimpact_kernel::{Action, ImpactReport};

pub fn text(action: &Action, report: &ImpactReport) -> String {
    TextReport { action, report }.to_string()
}

struct TextReport<'a> {
    action: &'a Action,
    report: &'a ImpactReport,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "Action: {}", self.action.display_name())?;

        if report.blocked {
            let reason = report.blocker_reason.as_deref().unwrap_or_default();
            writeln!(f, "Status: BLOCKED")?;
            writeln!(f, "Reason: {reason}")?;
            if let Some(rule) = report.matched_rules.first() {
                writeln!(f, "Rule:   {rule}")?;
            }
            return Ok(());
        }

        writeln!(f, "Status: allowed")?;
        writeln!(
            f,
            "Infra:  reboot {}, downtime {}",
            report.infra.reboot.as_str(),
            report.infra.downtime.as_str()
        )?;
        writeln!(f, "        {}", report.infra.reason)?;
        writeln!(f, "Guest:  risk {}", report.guest.risk.as_str())?;
        writeln!(f, "        {}", report.guest.reason)?;
        if !report.guest.affected_components.is_empty() {
            writeln!(
                f,
                "        affects: {}",
                report.guest.affected_components.join(", ")
            )?;
        }

        if !report.mitigations.is_empty() {
            writeln!(f, "\nMitigations:")?;
            for m in &report.mitigations {
                let marker = if m.required { "required" } else { "optional" };
                writeln!(f, "  [{marker}] {}: {}", m.title, m.description)?;
            }
        }

        if !report.matched_rules.is_empty() {
            writeln!(f, "\nMatched rules: {}", report.matched_rules.join(", "))?;
        }

        Ok(())
    }
}
