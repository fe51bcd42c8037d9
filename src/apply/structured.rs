use super::{ApplyOutcome, Applicator};
use crate::error::ApplyError;
use crate::jsonpatch::apply_ops;
use crate::patch::JsonPatchOp;
use crate::resource::Resource;
use crate::strategic;

/// StructuredApplicator merges directly on the field-tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredApplicator;

impl Applicator for StructuredApplicator {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn apply_strategic_merge(
        &self,
        resource: &mut Resource,
        patch: &Resource,
    ) -> Result<ApplyOutcome, ApplyError> {
        let mut merged = resource.content().clone();
        strategic::apply(&mut merged, patch.content())?;
        resource.set_content(merged);
        Ok(ApplyOutcome::of(resource))
    }

    fn apply_json_patch(
        &self,
        resource: &mut Resource,
        ops: &[JsonPatchOp],
    ) -> Result<(), ApplyError> {
        apply_ops(resource.content_mut(), ops)
    }
}
