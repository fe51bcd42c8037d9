//! Configuration shapes of the two transformers.

use crate::error::{PatchError, Result};
use crate::selector::TargetSelector;
use serde::{Deserialize, Serialize};

/// PatchConfig configures a single patch, strategic-merge or JSON-Patch.
///
/// Exactly one of `path` and `patch` must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchConfig {
    /// Reference to load the patch from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    /// Inline patch text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub patch: String,
    /// Resources to patch. Required for JSON-Patch; a strategic-merge patch
    /// without one targets the resource named by its own identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetSelector>,
    /// Selects the structured strategy unless explicitly `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaml_support: Option<bool>,
}

/// PatchStrategicMergeConfig configures any number of strategic-merge
/// patches, each addressing its target by its own identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchStrategicMergeConfig {
    /// Entries that are either inline documents or references to load.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    /// Inline documents, possibly several separated by `---`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub patches: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaml_support: Option<bool>,
}

impl PatchConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| PatchError::config(format!("invalid patch configuration: {}", e)))
    }
}

impl PatchStrategicMergeConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| {
            PatchError::config(format!("invalid strategic merge configuration: {}", e))
        })
    }
}
