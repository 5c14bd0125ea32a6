//! Storage-access code generation for relgen definition trees.
//!
//! Takes a finished [`relgen_schema`] storage group and turns every model
//! into a self-contained Rust source unit: the struct type, a storage
//! trait, and a concrete store with CRUD, parent-scoped and column-filter
//! accessors, plus the optional read-through cache decoration.
//!
//! ```
//! use relgen_codegen::Generator;
//! use relgen_schema::prelude::*;
//!
//! let mut design = DesignBuilder::new("blog");
//! design.store("primary", |s| {
//!     s.model("Post", |m| {
//!         m.belongs_to("User");
//!         m.field("title", FieldType::String, |f| {
//!             f.required();
//!         });
//!     });
//! });
//! let group = design.finish()?;
//!
//! let units = Generator::new(&group)?.units();
//! assert_eq!(units[0].file_name, "post.rs");
//! assert!(units[0].source.contains("pub struct Post"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Generation is deterministic: units are emitted in store/model name
//! order with sorted struct members, so two runs over equal trees produce
//! byte-identical output.

pub mod error;
pub mod generate;
pub mod names;
pub mod plan;
pub mod relation;
pub mod render;

pub use error::{CodegenError, Result};
pub use generate::{Generator, SourceUnit};

/// Commonly used generation types.
pub mod prelude {
    pub use crate::error::{CodegenError, Result};
    pub use crate::generate::{Generator, SourceUnit};
    pub use crate::plan::ModelPlan;
    pub use crate::relation::Relation;
}
