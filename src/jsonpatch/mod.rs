//! Jsonpatch module - RFC6902 application over the field-tree.

mod apply;
mod pointer;

pub use apply::apply_ops;
pub use pointer::*;
