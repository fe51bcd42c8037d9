//! Parsed patch entities.

use crate::resource::Resource;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JsonPatchOp is one RFC6902 operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum JsonPatchOp {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl JsonPatchOp {
    pub fn op_name(&self) -> &'static str {
        match self {
            JsonPatchOp::Add { .. } => "add",
            JsonPatchOp::Remove { .. } => "remove",
            JsonPatchOp::Replace { .. } => "replace",
            JsonPatchOp::Move { .. } => "move",
            JsonPatchOp::Copy { .. } => "copy",
            JsonPatchOp::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            JsonPatchOp::Add { path, .. }
            | JsonPatchOp::Remove { path }
            | JsonPatchOp::Replace { path, .. }
            | JsonPatchOp::Move { path, .. }
            | JsonPatchOp::Copy { path, .. }
            | JsonPatchOp::Test { path, .. } => path,
        }
    }
}

impl fmt::Display for JsonPatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonPatchOp::Move { from, path } | JsonPatchOp::Copy { from, path } => {
                write!(f, "{} {} -> {}", self.op_name(), from, path)
            }
            _ => write!(f, "{} {}", self.op_name(), self.path()),
        }
    }
}

/// Patch is either a strategic-merge document or a list of JSON-Patch operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// A partial document shaped like its target, carrying its own identity.
    StrategicMerge(Resource),
    /// RFC6902 operations; these carry no identity and need an explicit target.
    JsonPatch(Vec<JsonPatchOp>),
}

impl Patch {
    pub fn is_strategic_merge(&self) -> bool {
        matches!(self, Patch::StrategicMerge(_))
    }

    pub fn is_json_patch(&self) -> bool {
        matches!(self, Patch::JsonPatch(_))
    }

    /// A short human-readable description used in error messages and logs.
    pub fn describe(&self) -> String {
        match self {
            Patch::StrategicMerge(res) => format!("strategic merge patch {}", res.org_id()),
            Patch::JsonPatch(ops) => format!(
                "json patch [{}]",
                ops.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}
