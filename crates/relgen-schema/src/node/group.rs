//! The storage group node, root of a definition tree.

use serde::Serialize;

use crate::metadata::MetadataBag;
use crate::node::Store;

/// Top-level named collection of stores; one per compilation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageGroup {
    /// Group name.
    pub name: String,
    /// Stores in declaration order.
    pub stores: Vec<Store>,
    /// Generation hints.
    pub metadata: MetadataBag,
}

impl StorageGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stores: Vec::new(),
            metadata: MetadataBag::new(),
        }
    }

    /// Returns the store with the given name, if declared.
    #[must_use]
    pub fn store(&self, name: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.name == name)
    }

    /// Serializes the group to pretty-printed JSON for inspection.
    ///
    /// # Errors
    ///
    /// Returns the underlying serializer error, which cannot occur for a
    /// well-formed tree.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
