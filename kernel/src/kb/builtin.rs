// Bundled knowledge base.

use super::loader::{parse_mitigations, parse_rules};
use super::{KbError, KnowledgeBase};

const RULES: &str = include_str!("../../kb/rules.yaml");
const MITIGATIONS: &str = include_str!("../../kb/mitigations.yaml");

pub(super) fn load() -> Result<KnowledgeBase, KbError> {
    let rules = parse_rules(RULES, "builtin rules.yaml")?;
    let mitigations = parse_mitigations(MITIGATIONS, "builtin mitigations.yaml")?;
    Ok(KnowledgeBase::new(rules, mitigations))
}
