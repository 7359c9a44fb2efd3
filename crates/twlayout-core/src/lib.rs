//! Type descriptors and the aggregate layout engine.
//!
//! ## Modules
//!
//! - [`descriptor`]: field kinds, field and type descriptors
//! - [`catalog`]: an ordered, acyclic set of descriptors resolved for one platform
//! - [`schema`]: declarative descriptor files (`.toml`)
//! - [`layout`]: the layout engine: offsets, sizes and alignments under a packing rule
//! - [`cache`]: per-engine layout memoization

pub mod cache;
pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod layout;
pub mod schema;

// Re-export key types for convenience
pub use catalog::{Catalog, CatalogBuilder, Descriptors, Typedef};
pub use descriptor::{FieldDescriptor, FieldType, PlatformSelect, TypeDescriptor};
pub use error::{LayoutError, Result};
pub use layout::{compute_layout, FieldLayout, Layout, LayoutEngine, Shape};
