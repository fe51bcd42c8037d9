//! Patch module - Patch entities, their loading, classification and merging.

pub mod codec;
mod loader;
mod merger;
mod patch;

pub use loader::*;
pub use merger::*;
pub use patch::*;
