//! Fixture loading and management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::HarnessError;

fn default_evaluator() -> String {
    String::from("both")
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Library operation being exercised (`regex_match`, `strcat_safe`, ...).
    pub function: String,
    /// Behavior the case pins down, e.g. "leading star".
    pub section: String,
    /// Input parameters.
    pub inputs: serde_json::Value,
    /// Expected output, compared as a string.
    pub expected_output: String,
    /// Matcher the case applies to: `recursive`, `compiled` or `both`.
    #[serde(default = "default_evaluator")]
    pub evaluator: String,
}

/// A collection of fixture cases for one area of the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Area name, e.g. "regex" or "memory".
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        Ok(Self::from_json(&content)?)
    }
}

/// All `*.json` files in `dir`, sorted by path.
pub fn fixture_paths(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| HarnessError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}
