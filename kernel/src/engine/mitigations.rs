// Mitigation Resolution

use std::collections::HashMap;

use tracing::warn;

use crate::kb::Mitigation;

/// Id-keyed view over the knowledge base's mitigations.
#[derive(Debug, Default)]
pub struct MitigationTable {
    records: Vec<Mitigation>,
    by_id: HashMap<String, usize>,
}

impl MitigationTable {
    /// When an id is declared twice the first declaration wins.
    pub fn new(records: Vec<Mitigation>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, m) in records.iter().enumerate() {
            by_id.entry(m.id.clone()).or_insert(idx);
        }
        Self { records, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Mitigation> {
        self.by_id.get(id).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Map ids to records, required ones first.
    ///
    /// Ids without a record are skipped. Order within the required and
    /// optional groups follows `ids`.
    pub fn resolve(&self, ids: &[String]) -> Vec<Mitigation> {
        let mut resolved: Vec<Mitigation> = ids
            .iter()
            .filter_map(|id| {
                let found = self.get(id);
                if found.is_none() {
                    warn!(mitigation = %id, "referenced mitigation not found");
                }
                found.cloned()
            })
            .collect();

        // sort_by_key is stable
        resolved.sort_by_key(|m| !m.required);
        resolved
    }
}
