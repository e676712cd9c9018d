// Knowledge Base Loader
//
// Compiles an authoring tree of YAML/JSON documents into the rule and
// mitigation collections the engine consumes:
//
//   <dir>/rules/**/*.yaml    one rule or a list of rules per file
//   <dir>/mitigations.yaml   a list, or a map keyed by mitigation id
//
// Files are visited in sorted path order so declaration order, and
// with it blocker precedence, is stable across machines.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::debug;
use walkdir::WalkDir;

use super::{KnowledgeBase, Mitigation, Rule};

#[derive(Debug, thiserror::Error)]
pub enum KbError {
    #[error("knowledge base directory not found: {0}")]
    MissingDir(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid document {origin}: {source}")]
    Yaml {
        origin: String,
        source: serde_yaml::Error,
    },

    #[error("invalid compiled collection {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

const DOCUMENT_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
}

fn read(path: &Path) -> Result<String, KbError> {
    fs::read_to_string(path).map_err(|source| KbError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode<T: DeserializeOwned>(value: Value, origin: &str) -> Result<T, KbError> {
    serde_yaml::from_value(value).map_err(|source| KbError::Yaml {
        origin: origin.to_string(),
        source,
    })
}

fn parse_document(text: &str, origin: &str) -> Result<Value, KbError> {
    serde_yaml::from_str(text).map_err(|source| KbError::Yaml {
        origin: origin.to_string(),
        source,
    })
}

/// Parse one rule document: a single rule, a list of rules, or empty.
/// Null list entries are skipped.
pub fn parse_rules(text: &str, origin: &str) -> Result<Vec<Rule>, KbError> {
    match parse_document(text, origin)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| decode(item, origin))
            .collect(),
        single => Ok(vec![decode(single, origin)?]),
    }
}

/// Parse a mitigation document in list or id-keyed map form.
pub fn parse_mitigations(text: &str, origin: &str) -> Result<Vec<Mitigation>, KbError> {
    match parse_document(text, origin)? {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| decode(item, origin))
            .collect(),
        Value::Mapping(entries) => entries
            .into_iter()
            .map(|(_, item)| decode(item, origin))
            .collect(),
        single => Ok(vec![decode(single, origin)?]),
    }
}

/// Compile an authoring tree rooted at `dir`.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<KnowledgeBase, KbError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(KbError::MissingDir(dir.to_path_buf()));
    }

    let mut rules = Vec::new();
    let rules_dir = dir.join("rules");
    if rules_dir.is_dir() {
        for entry in WalkDir::new(&rules_dir).sort_by_file_name() {
            let entry = entry.map_err(|source| KbError::Walk {
                path: rules_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_document(path) {
                continue;
            }

            let parsed = parse_rules(&read(path)?, &path.display().to_string())?;
            debug!(file = %path.display(), rules = parsed.len(), "loaded rule document");
            rules.extend(parsed);
        }
    }

    let mut mitigations = Vec::new();
    for name in ["mitigations.yaml", "mitigations.yml", "mitigations.json"] {
        let path = dir.join(name);
        if path.is_file() {
            mitigations = parse_mitigations(&read(&path)?, &path.display().to_string())?;
            debug!(file = %path.display(), mitigations = mitigations.len(), "loaded mitigations");
            break;
        }
    }

    Ok(KnowledgeBase::new(rules, mitigations))
}

/// Load already-compiled JSON arrays of rules and mitigations.
pub fn load_compiled(
    rules_path: impl AsRef<Path>,
    mitigations_path: impl AsRef<Path>,
) -> Result<KnowledgeBase, KbError> {
    fn json<T: DeserializeOwned>(path: &Path) -> Result<T, KbError> {
        serde_json::from_str(&read(path)?).map_err(|source| KbError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    let rules = json(rules_path.as_ref())?;
    let mitigations = json(mitigations_path.as_ref())?;
    Ok(KnowledgeBase::new(rules, mitigations))
}
