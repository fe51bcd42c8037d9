//! Value module - In-memory representation of YAML/JSON resource content.
//!
//! Resource documents and patches are both held as a [`Value`] tree.

mod value;

pub use value::*;
