//! Strategic module - Strategic-merge semantics over the field-tree.
//!
//! [`apply`] merges a patch into a document; [`compose`] merges two patches
//! into one, keeping their directives.

mod compose;
mod directives;
mod merge;

pub use compose::*;
pub use directives::*;
pub use merge::apply;
