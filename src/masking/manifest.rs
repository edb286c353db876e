//! Locating and reading the masking section of the packaged manifest.

use super::{MaskingError, MaskingPolicy, StrategyOptions};
use crate::constants::{MANIFEST_FILE_NAME, MANIFEST_SEARCH_DEPTH, MASKING_SECTION};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The `pii_masking` manifest section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaskingSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub on_failure: MaskingPolicy,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

fn default_enabled() -> bool {
    true
}

/// One masking rule as written in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Exact column name, compared case-insensitively
    #[serde(default)]
    pub column: Option<String>,

    /// Regex over column names
    #[serde(default)]
    pub column_pattern: Option<String>,

    /// Regex that the value's text must match
    #[serde(default)]
    pub value_pattern: Option<String>,

    /// Registered strategy name
    pub strategy: String,

    #[serde(default)]
    pub options: StrategyOptions,
}

/// Result of reading a manifest.
#[derive(Debug)]
pub enum ManifestOutcome {
    /// No manifest file was found.
    NotFound,
    /// The manifest has no masking section.
    NoSection(PathBuf),
    /// The file or its masking section could not be parsed.
    Malformed { path: PathBuf, error: String },
    /// The masking section was parsed.
    Loaded {
        path: PathBuf,
        section: MaskingSection,
    },
}

/// Find the manifest in `start` or one of its nearest ancestors.
pub fn locate_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(MANIFEST_SEARCH_DEPTH + 1)
        .map(|dir| dir.join(MANIFEST_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Read the masking section of the manifest at `path`.
pub fn read_manifest(path: &Path) -> ManifestOutcome {
    let path_buf = path.to_path_buf();
    let malformed = |error: String| ManifestOutcome::Malformed {
        path: path.to_path_buf(),
        error,
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return malformed(MaskingError::from(e).to_string()),
    };

    let document: serde_json::Value = match serde_json::from_str(&text) {
        Ok(document) => document,
        Err(e) => return malformed(e.to_string()),
    };

    let Some(section) = document.get(MASKING_SECTION) else {
        return ManifestOutcome::NoSection(path_buf);
    };

    match MaskingSection::deserialize(section) {
        Ok(section) => ManifestOutcome::Loaded {
            path: path_buf,
            section,
        },
        Err(e) => malformed(MaskingError::Malformed(e.to_string()).to_string()),
    }
}
