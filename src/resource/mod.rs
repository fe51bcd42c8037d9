//! Resource module - Identified resource documents and their collection.

mod collection;
mod id;
mod resource;

pub use collection::*;
pub use id::*;
pub use resource::*;
