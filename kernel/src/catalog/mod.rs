// SKU Catalog
//
// Read-only lookup of VM size characteristics by name. The engine
// only ever asks "does this size exist, and what is it like".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::Generation;

mod builtin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Processor {
    Intel,
    #[serde(rename = "AMD")]
    Amd,
    #[serde(rename = "ARM")]
    Arm,
}

impl Processor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Processor::Intel => "Intel",
            Processor::Amd => "AMD",
            Processor::Arm => "ARM",
        }
    }
}

/// Immutable characteristics of one VM size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuRecord {
    pub name: String,
    pub family: String,
    #[serde(rename = "vCPUs")]
    pub vcpus: u32,
    #[serde(rename = "memoryGB")]
    pub memory_gb: f64,
    #[serde(rename = "maxDataDisks")]
    pub max_data_disks: u32,
    /// Zero when the size has no local temp disk.
    #[serde(rename = "tempDiskGB")]
    pub temp_disk_gb: u64,
    #[serde(rename = "premiumIO")]
    pub premium_io: bool,
    #[serde(rename = "acceleratedNetworking")]
    pub accelerated_networking: bool,
    pub generation: Vec<Generation>,
    pub processor: Processor,
}

impl SkuRecord {
    pub fn has_temp_disk(&self) -> bool {
        self.temp_disk_gb > 0
    }

    pub fn supports(&self, generation: Generation) -> bool {
        self.generation.contains(&generation)
    }
}

/// Name → SKU lookup service.
///
/// Absence is reported as `None`; implementations must not panic on
/// unknown names.
pub trait SkuCatalog: Send + Sync {
    fn lookup(&self, name: &str) -> Option<&SkuRecord>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid sku catalog json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate sku name: {0}")]
    DuplicateName(String),
}

/// In-memory catalog preserving declaration order.
#[derive(Debug, Clone, Default)]
pub struct StaticSkuCatalog {
    records: Vec<SkuRecord>,
    by_name: HashMap<String, usize>,
}

impl StaticSkuCatalog {
    pub fn from_records(records: Vec<SkuRecord>) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if by_name.insert(record.name.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateName(record.name.clone()));
            }
        }
        Ok(Self { records, by_name })
    }

    /// Parse a JSON array of SKU records.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<SkuRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Reference table of common Azure sizes.
    pub fn builtin() -> Self {
        let records = builtin::records();
        let by_name = records
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.name.clone(), idx))
            .collect();
        Self { records, by_name }
    }

    pub fn records(&self) -> impl Iterator<Item = &SkuRecord> {
        self.records.iter()
    }

    pub fn by_family<'a>(&'a self, family: &'a str) -> impl Iterator<Item = &'a SkuRecord> {
        self.records.iter().filter(move |r| r.family == family)
    }

    pub fn by_processor(&self, processor: Processor) -> impl Iterator<Item = &SkuRecord> {
        self.records.iter().filter(move |r| r.processor == processor)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SkuCatalog for StaticSkuCatalog {
    fn lookup(&self, name: &str) -> Option<&SkuRecord> {
        self.by_name.get(name).map(|&idx| &self.records[idx])
    }
}
