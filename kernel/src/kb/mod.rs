// Knowledge Base
//
// Declarative rules and mitigations. Rules are authored and compiled
// upstream; at runtime they are plain immutable values interpreted by
// the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impact::{DowntimeLevel, RebootLevel, RuleRisk};
use crate::model::ActionKind;

mod builtin;
pub mod loader;
pub mod validate;

pub use loader::KbError;
pub use validate::{validate, ValidationReport};

/// Rule classification.
///
/// `Override` rules are accepted from authoring sources but never
/// indexed or evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    #[default]
    Rule,
    Blocker,
    Override,
}

/// Which impact a non-blocking rule contributes to. Required for
/// `rule`-type rules; blockers and overrides may omit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Infra,
    Guest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    High,
    Medium,
    Low,
}

/// Comparison operator of a condition.
///
/// Unrecognised operator names deserialize to `Unknown`, which never
/// matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Eq,
    Ne,
    In,
    Nin,
    Exists,
    NotExists,
    Gt,
    Gte,
    Lt,
    Lte,
    Matches,
    #[serde(other)]
    Unknown,
}

/// One test of a context field against a literal or another field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dot path into the evaluation context, e.g. `disk.topology`.
    pub field: String,
    pub operator: Operator,
    /// Literal, or a dot path resolved against the context.
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleImpact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reboot: Option<RebootLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downtime: Option<DowntimeLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RuleRisk>,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_components: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSource {
    pub title: String,
    pub url: String,
}

fn default_version() -> String {
    "1.0.0".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub rule_type: RuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,
    pub actions: Vec<ActionKind>,
    /// All must hold. Empty means the rule applies unconditionally.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_targets: Option<Vec<String>>,
    pub impact: RuleImpact,
    #[serde(default)]
    pub mitigations: Vec<String>,

    // Metadata below is carried for authors and tooling; the engine
    // does not consult it.
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub sources: Vec<RuleSource>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_at: Option<String>,
}

impl Rule {
    pub fn applies_to(&self, kind: ActionKind) -> bool {
        self.actions.contains(&kind)
    }

    /// Text shown when this rule blocks an action.
    pub fn block_reason(&self) -> &str {
        if self.impact.reason.is_empty() {
            &self.description
        } else {
            &self.impact.reason
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Before,
    During,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Linux,
    #[serde(rename = "all")]
    All,
}

fn all_platforms() -> Vec<Platform> {
    vec![Platform::All]
}

/// A preparatory or recovery step referenced by rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mitigation {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "all_platforms")]
    pub platforms: Vec<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
}

/// The two collections the engine consumes, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub rules: Vec<Rule>,
    pub mitigations: Vec<Mitigation>,
}

impl KnowledgeBase {
    pub fn new(rules: Vec<Rule>, mitigations: Vec<Mitigation>) -> Self {
        Self { rules, mitigations }
    }

    /// The knowledge base shipped with the crate.
    pub fn builtin() -> Result<Self, KbError> {
        builtin::load()
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn mitigation(&self, id: &str) -> Option<&Mitigation> {
        self.mitigations.iter().find(|m| m.id == id)
    }
}
