//! Combining strategic-merge patches that address the same resource.

use crate::error::{PatchError, Result};
use crate::resource::Resource;
use crate::strategic;

/// Groups patches by original identity and composes each group into one
/// patch, later patches taking precedence. Groups keep the order in which
/// their identity first appeared.
pub fn merge_patches(patches: &[Resource]) -> Result<Vec<Resource>> {
    let mut merged: Vec<Resource> = Vec::with_capacity(patches.len());
    for patch in patches {
        match merged.iter_mut().find(|m| m.org_id() == patch.org_id()) {
            Some(existing) => {
                let content = strategic::compose(existing.content(), patch.content())
                    .map_err(|e| {
                        PatchError::apply(
                            format!("strategic merge patch {}", patch.org_id()),
                            patch.org_id().clone(),
                            e,
                        )
                    })?;
                existing.set_content(content);
            }
            None => merged.push(patch.clone()),
        }
    }
    Ok(merged)
}
