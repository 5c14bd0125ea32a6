//! The model node: one schema entity mapping to a storage table.

use serde::Serialize;

use crate::metadata::{keys, MetadataBag, NAMESPACE};
use crate::node::Field;

/// One schema entity with fields, association hints and feature flags.
///
/// Feature flags (custom table name, dynamic-table mode, caching, roler
/// accessor, composite-key list) live in the metadata bag rather than on the
/// struct, because the bag is the single transport between declaration and
/// generation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Model {
    /// Model name, conventionally PascalCase.
    pub name: String,
    /// Name of the owning [`Store`](crate::node::Store).
    pub store: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Generation hints.
    pub metadata: MetadataBag,
}

impl Model {
    /// Creates an empty model owned by `store`.
    #[must_use]
    pub fn new(name: impl Into<String>, store: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: store.into(),
            fields: Vec::new(),
            metadata: MetadataBag::new(),
        }
    }

    /// Returns the field with the given name, if declared.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the custom table name, if one was declared.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.metadata.lookup(NAMESPACE, keys::TABLE_NAME)
    }

    /// Whether the generated store should offer a read-through cache.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.metadata.flag(keys::CACHED)
    }

    /// Whether generated methods take the table name per call.
    #[must_use]
    pub fn is_dynamic_table(&self) -> bool {
        self.metadata.flag(keys::DYNAMIC_TABLE)
    }

    /// Whether to emit the role accessor.
    #[must_use]
    pub fn is_roler(&self) -> bool {
        self.metadata.flag(keys::ROLER)
    }
}
