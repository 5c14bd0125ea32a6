//! The store node: one backing data source's schema scope.

use serde::Serialize;

use crate::metadata::MetadataBag;
use crate::node::Model;

/// One backing data source (e.g. one database connection profile).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Store {
    /// Store name.
    pub name: String,
    /// Name of the owning [`StorageGroup`](crate::node::StorageGroup).
    pub group: String,
    /// Models in declaration order.
    pub models: Vec<Model>,
    /// Generation hints.
    pub metadata: MetadataBag,
}

impl Store {
    /// Creates an empty store owned by `group`.
    #[must_use]
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            models: Vec::new(),
            metadata: MetadataBag::new(),
        }
    }

    /// Returns the model with the given name, if declared.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }
}
