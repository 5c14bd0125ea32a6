//! Definition tree and declarative builder for the relgen schema compiler.
//!
//! `relgen-schema` is the front half of relgen: it turns nested builder
//! calls into a validated tree of storage definitions that the code
//! generator (`relgen-codegen`) consumes.
//!
//! # Architecture
//!
//! - **Nodes** — `StorageGroup` → `Store` → `Model` → `Field`, a strict
//!   four-level hierarchy with insertion-ordered children.
//! - **Metadata** — a case-insensitive, namespaced key/value bag on every
//!   node, the single transport for association encodings, storage tags and
//!   feature flags.
//! - **Builder** — an explicit [`DesignBuilder`](build::DesignBuilder)
//!   threaded through nested closures; one builder owns one compilation run
//!   and accumulates structural errors instead of failing fast.
//! - **Validation** — a bottom-up, non-fail-fast walk collecting every
//!   invariant violation into one aggregate report.
//!
//! # Example
//!
//! ```rust
//! use relgen_schema::prelude::*;
//!
//! let mut design = DesignBuilder::new("congo");
//! design.store("mysql", |s| {
//!     s.model("User", |m| {
//!         m.cached();
//!         m.belongs_to("Account");
//!         m.field("name", FieldType::String, |f| {
//!             f.required();
//!         });
//!     });
//! });
//!
//! let group = design.finish().expect("structurally valid");
//! group.validate().expect("invariants hold");
//! ```

pub mod build;
pub mod error;
pub mod metadata;
pub mod node;
mod validate;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::build::{DesignBuilder, DuplicatePolicy};
    pub use crate::error::{SchemaError, ValidationError, ValidationErrors};
    pub use crate::metadata::{keys, MetadataBag, NAMESPACE};
    pub use crate::node::{Field, FieldType, Model, StorageGroup, Store};
}
