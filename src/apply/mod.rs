//! Apply module - Applying one patch to one resource.
//!
//! Two interchangeable strategies implement [`Applicator`]:
//!
//! - [`StructuredApplicator`] works directly on the crate's field-tree.
//! - [`LegacyApplicator`] round-trips the resource through `serde_json` and
//!   applies JSON-Patch operations with the `json-patch` crate.
//!
//! Both must produce the same observable result for the same input.

mod legacy;
mod structured;

#[cfg(test)]
mod equivalence_test;

pub use legacy::LegacyApplicator;
pub use structured::StructuredApplicator;

use crate::error::ApplyError;
use crate::patch::JsonPatchOp;
use crate::resource::{ResId, Resource};

/// ApplyOutcome reports what a strategic-merge application left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The resource still has content.
    Patched,
    /// The patch removed every field; the caller should drop the resource.
    Emptied,
}

impl ApplyOutcome {
    fn of(resource: &Resource) -> ApplyOutcome {
        if resource.is_empty() {
            ApplyOutcome::Emptied
        } else {
            ApplyOutcome::Patched
        }
    }
}

/// Applicator applies patches to a single resource in place.
pub trait Applicator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Merges `patch` into `resource`.
    ///
    /// `patch` is expected to already carry the identity of `resource`, see
    /// [`patch_for_target`].
    fn apply_strategic_merge(
        &self,
        resource: &mut Resource,
        patch: &Resource,
    ) -> Result<ApplyOutcome, ApplyError>;

    /// Applies `ops` in order. On failure `resource` is left untouched.
    fn apply_json_patch(&self, resource: &mut Resource, ops: &[JsonPatchOp])
        -> Result<(), ApplyError>;
}

/// Strategy selects an [`Applicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Structured,
    Legacy,
}

static STRUCTURED: StructuredApplicator = StructuredApplicator;
static LEGACY: LegacyApplicator = LegacyApplicator;

impl Strategy {
    /// Maps the `yamlSupport` configuration flag; absent means structured.
    pub fn from_yaml_support(yaml_support: Option<bool>) -> Strategy {
        match yaml_support {
            Some(false) => Strategy::Legacy,
            Some(true) | None => Strategy::Structured,
        }
    }

    pub fn applicator(&self) -> &'static dyn Applicator {
        match self {
            Strategy::Structured => &STRUCTURED,
            Strategy::Legacy => &LEGACY,
        }
    }
}

/// Returns a copy of `patch` stamped with the identity of `target`, so a
/// single patch body can be applied to differently named resources.
pub fn patch_for_target(patch: &Resource, target: &ResId) -> Resource {
    let mut copy = patch.clone();
    copy.set_id(target);
    copy
}
