//! Selector module - Matching resources by group/version/kind, name,
//! namespace, labels and annotations.

mod labels;
mod target;

pub use labels::*;
pub use target::*;
