//! Resolving the resources a patch applies to.

use crate::error::{PatchError, Result};
use crate::patch::Patch;
use crate::resource::{ResId, ResourceCollection};
use crate::selector::TargetSelector;
use tracing::{debug, warn};

/// Returns the current identities of the resources `patch` applies to, in
/// collection order.
///
/// - With a selector, every matching resource; none is not an error.
/// - Without one, a strategic-merge patch addresses the single resource
///   whose original or current identity equals the patch's own.
/// - A JSON-Patch without a selector is a config error.
pub fn resolve_targets(
    patch: &Patch,
    target: Option<&TargetSelector>,
    resources: &ResourceCollection,
) -> Result<Vec<ResId>> {
    match (target, patch) {
        (Some(selector), _) => {
            let ids = resources.select(selector)?;
            if ids.is_empty() {
                warn!(patch = %patch.describe(), ?selector, "target selector matched no resources");
            } else {
                debug!(patch = %patch.describe(), targets = ids.len(), "resolved selector");
            }
            Ok(ids)
        }
        (None, Patch::StrategicMerge(res)) => {
            let found = resources.get_by_id(res.org_id(), &patch.describe())?;
            Ok(vec![found.cur_id()])
        }
        (None, Patch::JsonPatch(_)) => Err(PatchError::config(format!(
            "target required for JSON-Patch: {}",
            patch.describe()
        ))),
    }
}
