//! Structural validation of a definition tree.
//!
//! Walks the tree bottom-up, visiting every node exactly once and
//! collecting every invariant violation — missing names, missing parent
//! linkage — into one [`ValidationErrors`] aggregate. Generation must not
//! run on a tree that failed validation.

use tracing::debug;

use crate::error::ValidationErrors;
use crate::node::{Field, Model, StorageGroup, Store};

impl StorageGroup {
    /// Checks the whole tree, returning every violation at once.
    ///
    /// # Errors
    ///
    /// Returns the aggregate [`ValidationErrors`] when any invariant is
    /// violated anywhere in the tree.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut verr = ValidationErrors::new();
        if self.name.is_empty() {
            verr.add("storage group", "name not defined");
        }
        for store in &self.stores {
            verr.merge(store.check());
        }
        debug!(group = %self.name, problems = verr.len(), "validation complete");
        verr.into_result()
    }
}

impl Store {
    fn check(&self) -> ValidationErrors {
        let mut verr = ValidationErrors::new();
        if self.name.is_empty() {
            verr.add(self.path(), "store name not defined");
        }
        if self.group.is_empty() {
            verr.add(self.path(), "missing storage group parent");
        }
        for model in &self.models {
            verr.merge(model.check());
        }
        verr
    }

    fn path(&self) -> String {
        if self.name.is_empty() {
            "store (unnamed)".to_string()
        } else {
            format!("store '{}'", self.name)
        }
    }
}

impl Model {
    fn check(&self) -> ValidationErrors {
        let mut verr = ValidationErrors::new();
        if self.name.is_empty() {
            verr.add(self.path(), "model name not defined");
        }
        if self.store.is_empty() {
            verr.add(self.path(), "missing store parent");
        }
        for field in &self.fields {
            verr.merge(field.check());
        }
        verr
    }

    fn path(&self) -> String {
        if self.name.is_empty() {
            "model (unnamed)".to_string()
        } else {
            format!("model '{}'", self.name)
        }
    }
}

impl Field {
    fn check(&self) -> ValidationErrors {
        let mut verr = ValidationErrors::new();
        if self.name.is_empty() {
            verr.add(self.path(), "field name not defined");
        }
        if self.model.is_empty() {
            verr.add(self.path(), "missing model parent");
        }
        verr
    }

    fn path(&self) -> String {
        if self.name.is_empty() {
            format!("field (unnamed) of model '{}'", self.model)
        } else {
            format!("field '{}' of model '{}'", self.name, self.model)
        }
    }
}
