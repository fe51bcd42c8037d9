//! Error types for patch loading, resolution and application.

use crate::loader::LoadError;
use crate::resource::ResId;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PatchError>;

/// PatchError is the error taxonomy of a transformation pass.
///
/// Every variant is terminal for the pass that produced it.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Empty or contradictory configuration.
    #[error("config error: {message}")]
    Config { message: String },

    /// Content that is neither a strategic-merge document nor a JSON-Patch.
    #[error("parse error: {message}: [{content}]")]
    Parse { message: String, content: String },

    /// Implicit-identity resolution found nothing.
    #[error("not found: no resource matches {id} (patch {patch})")]
    NotFound { id: ResId, patch: String },

    /// A patch could not be applied to a resolved target.
    #[error("failed to apply patch {patch} to {target}: {source}")]
    Apply {
        patch: String,
        target: ResId,
        #[source]
        source: ApplyError,
    },

    /// External patch content could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl PatchError {
    /// Creates a config error.
    pub fn config(message: impl Into<String>) -> Self {
        PatchError::Config {
            message: message.into(),
        }
    }

    /// Creates a parse error, keeping the offending content for diagnosis.
    pub fn parse(message: impl Into<String>, content: impl Into<String>) -> Self {
        PatchError::Parse {
            message: message.into(),
            content: content.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(id: ResId, patch: impl Into<String>) -> Self {
        PatchError::NotFound {
            id,
            patch: patch.into(),
        }
    }

    /// Wraps an application failure with the patch and target it concerns.
    pub fn apply(patch: impl Into<String>, target: ResId, source: ApplyError) -> Self {
        PatchError::Apply {
            patch: patch.into(),
            target,
            source,
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, PatchError::Config { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, PatchError::Parse { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PatchError::NotFound { .. })
    }

    pub fn is_apply(&self) -> bool {
        matches!(self, PatchError::Apply { .. })
    }
}

/// ApplyError describes why a single patch application failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplyError {
    #[error("{op}: path {path} does not exist")]
    MissingPath { op: &'static str, path: String },

    #[error("test: value at {path} is {actual}, expected {expected}")]
    TestFailed {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("invalid pointer {pointer}: {reason}")]
    InvalidPointer { pointer: String, reason: String },

    #[error("{path}: malformed merge directive: {message}")]
    InvalidDirective { path: String, message: String },

    #[error("json patch: {message}")]
    JsonPatch { message: String },

    #[error("resource identity {id} is already taken by another resource")]
    IdentityConflict { id: ResId },
}

impl ApplyError {
    /// Creates a missing path error.
    pub fn missing_path(op: &'static str, path: impl Into<String>) -> Self {
        ApplyError::MissingPath {
            op,
            path: path.into(),
        }
    }

    /// Creates an invalid pointer error.
    pub fn invalid_pointer(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        ApplyError::InvalidPointer {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }

    /// Creates a malformed directive error.
    pub fn invalid_directive(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApplyError::InvalidDirective {
            path: path.into(),
            message: message.into(),
        }
    }
}
