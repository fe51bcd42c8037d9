//! Transform module - Configured patch passes over a resource collection.
//!
//! A configuration is loaded once into an immutable transformer; every call
//! to [`Transformer::transform`] is an independent pass.

mod config;
mod coordinator;
mod resolver;

pub use config::*;
pub use coordinator::*;
pub use resolver::*;
