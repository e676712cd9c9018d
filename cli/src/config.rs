// CLI Configuration
//
// Where the knowledge base and SKU catalog come from, and how reports
// are printed. Loaded from JSON/YAML; flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    /// Authoring tree with `rules/` and `mitigations.yaml`. The bundled
    /// knowledge base is used when unset.
    pub knowledge_base: Option<PathBuf>,
    /// JSON array of SKU records. The bundled table is used when unset.
    pub sku_catalog: Option<PathBuf>,
    /// Refuse to evaluate against a knowledge base with validation errors.
    pub strict: bool,
    pub format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl CliConfig {
    /// Built-in configuration (used if no config file is provided).
    pub fn default_config() -> Self {
        Self {
            knowledge_base: None,
            sku_catalog: None,
            strict: false,
            format: OutputFormat::Json,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        read_document(path)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// Read a JSON or YAML file, chosen by extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    if is_yaml(path) {
        serde_yaml::from_str(&data).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&data).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}
