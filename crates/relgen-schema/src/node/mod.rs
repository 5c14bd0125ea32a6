//! Definition-tree node kinds.
//!
//! Four node kinds form a strict four-level hierarchy:
//! [`StorageGroup`] → [`Store`] → [`Model`] → [`Field`]. Each node owns its
//! children in declaration order and carries a [`MetadataBag`] of generation
//! hints. Parent linkage is recorded as the parent's name on each child and
//! is filled in by the builder engine.

mod field;
mod group;
mod model;
mod store;

pub use field::{Field, FieldType};
pub use group::StorageGroup;
pub use model::Model;
pub use store::Store;
