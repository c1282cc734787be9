//! Identifiers and the per-document identifier registry.

mod id;
mod registry;

pub use id::Id;
pub use registry::{IdRegistry, DEFAULT_PREFIX};
