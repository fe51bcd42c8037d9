//! Driving patches over a resource collection.

use super::config::{PatchConfig, PatchStrategicMergeConfig};
use super::resolver::resolve_targets;
use crate::apply::{patch_for_target, ApplyOutcome, Strategy};
use crate::error::{ApplyError, PatchError, Result};
use crate::loader::Loader;
use crate::patch::{load_patch, load_strategic_merge_patches, merge_patches, Patch};
use crate::resource::{ResId, ResourceCollection};
use crate::selector::{SelectorMatcher, TargetSelector};
use tracing::{debug, info};

/// TransformReport lists what a pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Current identities of patched resources, once per application.
    pub patched: Vec<ResId>,
    /// Identities of resources removed because a patch emptied them.
    pub removed: Vec<ResId>,
}

/// Transformer is a configured patch pass over a collection.
pub trait Transformer {
    fn transform(&self, resources: &mut ResourceCollection) -> Result<TransformReport>;
}

/// MutationCoordinator applies one patch to its resolved targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationCoordinator {
    strategy: Strategy,
}

impl MutationCoordinator {
    pub fn new(strategy: Strategy) -> Self {
        MutationCoordinator { strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Resolves the targets of `patch` and applies it to each in order.
    ///
    /// Every target is patched on a copy that replaces the original only
    /// when the application succeeded. A resource emptied by a
    /// strategic-merge patch is removed. The first error stops the pass;
    /// targets patched before it stay patched.
    pub fn apply(
        &self,
        patch: &Patch,
        target: Option<&TargetSelector>,
        resources: &mut ResourceCollection,
        report: &mut TransformReport,
    ) -> Result<()> {
        let applicator = self.strategy.applicator();
        let describe = patch.describe();
        for id in resolve_targets(patch, target, resources)? {
            let mut working = resources
                .get_by_cur_id(&id)
                .cloned()
                .ok_or_else(|| PatchError::not_found(id.clone(), describe.as_str()))?;
            let failed = |e: ApplyError| PatchError::apply(describe.as_str(), id.clone(), e);

            match patch {
                Patch::StrategicMerge(body) => {
                    let stamped = patch_for_target(body, &id);
                    let outcome = applicator
                        .apply_strategic_merge(&mut working, &stamped)
                        .map_err(failed)?;
                    if outcome == ApplyOutcome::Emptied {
                        resources.remove(&id)?;
                        debug!(resource = %id, patch = %describe, "patch emptied resource, removed");
                        report.removed.push(id);
                        continue;
                    }
                }
                Patch::JsonPatch(ops) => {
                    applicator.apply_json_patch(&mut working, ops).map_err(failed)?;
                }
            }

            let new_id = working.cur_id();
            if new_id != id && resources.get_by_cur_id(&new_id).is_some() {
                return Err(failed(ApplyError::IdentityConflict { id: new_id }));
            }
            resources.replace(&id, working)?;
            debug!(resource = %id, patch = %describe, applicator = applicator.name(), "patched");
            report.patched.push(new_id);
        }
        Ok(())
    }
}

/// PatchTransformer applies one strategic-merge or JSON-Patch patch.
#[derive(Debug, Clone)]
pub struct PatchTransformer {
    patch: Patch,
    target: Option<TargetSelector>,
    coordinator: MutationCoordinator,
}

impl PatchTransformer {
    /// Loads and classifies the configured patch.
    pub fn configure(config: &PatchConfig, loader: &dyn Loader) -> Result<Self> {
        let patch = load_patch(loader, &config.patch, &config.path)?;
        match &config.target {
            Some(selector) => {
                SelectorMatcher::compile(selector)?;
            }
            None if patch.is_json_patch() => {
                return Err(PatchError::config(format!(
                    "target required for JSON-Patch: {}",
                    patch.describe()
                )));
            }
            None => {}
        }
        Ok(PatchTransformer {
            patch,
            target: config.target.clone(),
            coordinator: MutationCoordinator::new(Strategy::from_yaml_support(config.yaml_support)),
        })
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn target(&self) -> Option<&TargetSelector> {
        self.target.as_ref()
    }
}

impl Transformer for PatchTransformer {
    fn transform(&self, resources: &mut ResourceCollection) -> Result<TransformReport> {
        let mut report = TransformReport::default();
        self.coordinator
            .apply(&self.patch, self.target.as_ref(), resources, &mut report)?;
        info!(
            patched = report.patched.len(),
            removed = report.removed.len(),
            "patch transformer done"
        );
        Ok(report)
    }
}

/// StrategicMergeTransformer applies strategic-merge patches, each to the
/// resource named by its own identity. Patches for the same resource are
/// composed into one before the pass.
#[derive(Debug, Clone)]
pub struct StrategicMergeTransformer {
    patches: Vec<Patch>,
    coordinator: MutationCoordinator,
}

impl StrategicMergeTransformer {
    pub fn configure(config: &PatchStrategicMergeConfig, loader: &dyn Loader) -> Result<Self> {
        let loaded = load_strategic_merge_patches(loader, &config.paths, &config.patches)?;
        let merged = merge_patches(&loaded)?;
        debug!(loaded = loaded.len(), merged = merged.len(), "strategic merge patches loaded");
        Ok(StrategicMergeTransformer {
            patches: merged.into_iter().map(Patch::StrategicMerge).collect(),
            coordinator: MutationCoordinator::new(Strategy::from_yaml_support(config.yaml_support)),
        })
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }
}

impl Transformer for StrategicMergeTransformer {
    fn transform(&self, resources: &mut ResourceCollection) -> Result<TransformReport> {
        let mut report = TransformReport::default();
        for patch in &self.patches {
            self.coordinator.apply(patch, None, resources, &mut report)?;
        }
        info!(
            patches = self.patches.len(),
            patched = report.patched.len(),
            removed = report.removed.len(),
            "strategic merge transformer done"
        );
        Ok(report)
    }
}
