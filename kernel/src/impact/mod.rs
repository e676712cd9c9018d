// Impact Severities & Report
//
// Ordinal severity scales for each impact dimension, the infra/guest
// payloads they roll up into, and the report handed back to callers.

use serde::{Deserialize, Serialize};

use crate::kb::Mitigation;

/// Likelihood that the VM restarts during the change.
///
/// Variants are declared in ascending severity; `Ord` follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebootLevel {
    None,
    Possible,
    Likely,
    Guaranteed,
}

/// Expected service interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DowntimeLevel {
    None,
    Low,
    Medium,
    High,
}

/// Guest OS risk, including data-loss exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Guest risk as authored on a rule.
///
/// Rules may declare `none`, which never raises the aggregate; reports
/// only ever carry a [`RiskLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleRisk {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RuleRisk {
    pub fn level(self) -> Option<RiskLevel> {
        match self {
            RuleRisk::None => None,
            RuleRisk::Low => Some(RiskLevel::Low),
            RuleRisk::Medium => Some(RiskLevel::Medium),
            RuleRisk::High => Some(RiskLevel::High),
            RuleRisk::Critical => Some(RiskLevel::Critical),
        }
    }
}

impl RebootLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RebootLevel::None => "none",
            RebootLevel::Possible => "possible",
            RebootLevel::Likely => "likely",
            RebootLevel::Guaranteed => "guaranteed",
        }
    }
}

impl DowntimeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DowntimeLevel::None => "none",
            DowntimeLevel::Low => "low",
            DowntimeLevel::Medium => "medium",
            DowntimeLevel::High => "high",
        }
    }
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

pub const NO_INFRA_IMPACT: &str = "No infrastructure impact detected.";
pub const NO_GUEST_IMPACT: &str = "No guest OS impact detected.";
pub const CANNOT_EVALUATE: &str = "Cannot evaluate - invalid configuration.";
pub const EVALUATION_FAILED: &str = "Error evaluating rules";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfraImpact {
    pub reboot: RebootLevel,
    pub downtime: DowntimeLevel,
    pub reason: String,
}

impl InfraImpact {
    pub fn none() -> Self {
        Self::with_reason(NO_INFRA_IMPACT)
    }

    fn with_reason(reason: &str) -> Self {
        Self {
            reboot: RebootLevel::None,
            downtime: DowntimeLevel::None,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestImpact {
    pub risk: RiskLevel,
    pub reason: String,
    pub affected_components: Vec<String>,
}

impl GuestImpact {
    pub fn none() -> Self {
        Self::with_reason(NO_GUEST_IMPACT)
    }

    fn with_reason(reason: &str) -> Self {
        Self {
            risk: RiskLevel::Low,
            reason: reason.into(),
            affected_components: Vec::new(),
        }
    }
}

/// Outcome of evaluating one action against one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocker_reason: Option<String>,
    pub infra: InfraImpact,
    pub guest: GuestImpact,
    pub mitigations: Vec<Mitigation>,
    pub explanation: String,
    pub matched_rules: Vec<String>,
}

impl ImpactReport {
    /// Report for inputs the engine could not build a context from.
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            blocked: true,
            explanation: format!("**ERROR:** {reason}"),
            blocker_reason: Some(reason),
            infra: InfraImpact::with_reason(CANNOT_EVALUATE),
            guest: GuestImpact::with_reason(CANNOT_EVALUATE),
            mitigations: Vec::new(),
            matched_rules: Vec::new(),
        }
    }

    /// Report for an action a blocking rule disallows.
    pub fn blocked_by(rule_id: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            blocked: true,
            explanation: format!("**BLOCKED:** {reason}"),
            blocker_reason: Some(reason),
            infra: InfraImpact::none(),
            guest: GuestImpact::none(),
            mitigations: Vec::new(),
            matched_rules: vec![rule_id.to_string()],
        }
    }

    /// Degraded report for callers whose own boundary caught a failure
    /// around the evaluation call.
    ///
    /// Structurally identical to any other blocked report; only the
    /// reason text differs.
    pub fn report_for_failure(detail: impl AsRef<str>) -> Self {
        let detail = detail.as_ref();
        let reason = if detail.is_empty() {
            EVALUATION_FAILED.to_string()
        } else {
            format!("{EVALUATION_FAILED}: {detail}")
        };
        Self::invalid_configuration(reason)
    }

    pub fn required_mitigations(&self) -> impl Iterator<Item = &Mitigation> {
        self.mitigations.iter().filter(|m| m.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_are_ordinal() {
        assert!(RebootLevel::None < RebootLevel::Possible);
        assert!(RebootLevel::Likely < RebootLevel::Guaranteed);
        assert!(DowntimeLevel::Low < DowntimeLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert_eq!(
            [RiskLevel::Medium, RiskLevel::Critical, RiskLevel::Low]
                .into_iter()
                .max(),
            Some(RiskLevel::Critical)
        );
    }

    #[test]
    fn rule_risk_none_has_no_level() {
        let risks: Vec<RuleRisk> = serde_json::from_str(r#"["none", "critical"]"#).unwrap();

        assert_eq!(risks[0].level(), None);
        assert_eq!(risks[1].level(), Some(RiskLevel::Critical));
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = ImpactReport::blocked_by("blocker-x", "nope");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["blocked"], true);
        assert_eq!(json["blockerReason"], "nope");
        assert_eq!(json["infra"]["reboot"], "none");
        assert_eq!(json["guest"]["affectedComponents"], serde_json::json!([]));
        assert_eq!(json["matchedRules"], serde_json::json!(["blocker-x"]));
    }

    #[test]
    fn failure_report_is_blocked_and_empty() {
        let report = ImpactReport::report_for_failure("unexpected input");

        assert!(report.blocked);
        assert_eq!(
            report.blocker_reason.as_deref(),
            Some("Error evaluating rules: unexpected input")
        );
        assert_eq!(report.infra.reboot, RebootLevel::None);
        assert_eq!(report.guest.risk, RiskLevel::Low);
        assert!(report.mitigations.is_empty());
        assert!(report.matched_rules.is_empty());
    }
}
