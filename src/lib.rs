//! # Resource Patch
//!
//! Patch transformation for collections of Kubernetes-style resource documents.
//!
//! A patch is either a strategic-merge document, shaped like the resource it
//! patches, or a list of RFC6902 JSON-Patch operations. Patches are loaded
//! from inline text or references, classified, merged when several address
//! the same resource, resolved to their targets and applied. A resource that
//! a patch empties is removed from the collection.
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of YAML/JSON documents
//! - [`resource`] - Resource identities, resources and their collection
//! - [`selector`] - Target selectors and label selector expressions
//! - [`patch`] - Patch entities, loading, classification and merging
//! - [`strategic`] - Strategic-merge semantics and directives
//! - [`jsonpatch`] - JSON-Patch operations over documents
//! - [`apply`] - Interchangeable strategies applying one patch to one resource
//! - [`transform`] - Configurations and the passes that drive everything above
//! - [`loader`] - Loading referenced patch content

pub mod apply;
pub mod error;
pub mod jsonpatch;
pub mod loader;
pub mod patch;
pub mod resource;
pub mod selector;
pub mod strategic;
pub mod transform;
pub mod value;

pub use apply::{Applicator, ApplyOutcome, Strategy};
pub use error::{ApplyError, PatchError, Result};
pub use loader::{FileLoader, LoadError, Loader, MemoryLoader};
pub use patch::{JsonPatchOp, Patch};
pub use resource::{Gvk, ResId, Resource, ResourceCollection};
pub use selector::TargetSelector;
pub use transform::{
    PatchConfig, PatchStrategicMergeConfig, PatchTransformer, StrategicMergeTransformer,
    TransformReport, Transformer,
};
pub use value::Value;
