//! Namespaced metadata attached to definition nodes.
//!
//! Every node in the definition tree carries a [`MetadataBag`], a string
//! key/value store used to pass generation hints (association encodings,
//! storage tags, feature flags) from the declaration site to the code
//! generator. Keys are namespaced so unrelated producers can share the same
//! node without colliding, and all comparisons are case-insensitive.

use std::collections::BTreeMap;

use serde::Serialize;

/// The namespace under which relgen stores its own hints.
pub const NAMESPACE: &str = "relgen";

/// Well-known short keys in the relgen namespace.
pub mod keys {
    /// Comma-separated list of belongs-to parents.
    pub const BELONGS_TO: &str = "belongsto";
    /// Comma-separated list of has-many children.
    pub const HAS_MANY: &str = "hasmany";
    /// Comma-separated list of has-one children.
    pub const HAS_ONE: &str = "hasone";
    /// Comma-separated `alias:Remote:join_table` triplets.
    pub const MANY_TO_MANY: &str = "many2many";
    /// Custom table name override.
    pub const TABLE_NAME: &str = "tablename";
    /// Dynamic-table mode flag.
    pub const DYNAMIC_TABLE: &str = "dyntable";
    /// Read-through cache flag.
    pub const CACHED: &str = "cached";
    /// Role accessor flag.
    pub const ROLER: &str = "roler";
    /// Comma-separated composite primary key field names.
    pub const PRIMARY_KEYS: &str = "primarykeys";
    /// Primary-key persistence tag override (model level).
    pub const PK_TAG: &str = "pktag";
    /// Raw persistence-layer column tag (field level).
    pub const DB_TAG: &str = "dbtag";
    /// Raw constraint tag (field level).
    pub const SQL_TAG: &str = "sqltag";
    /// Marks a string field as a formatted timestamp.
    pub const TIMESTAMP: &str = "timestamp";
    /// Suppresses the generated bookkeeping timestamp members.
    pub const SKIP_TIMESTAMPS: &str = "skipts";
}

/// Case-insensitive, namespaced key/value store.
///
/// Fully-qualified keys have the form `namespace#key` and are normalized to
/// lowercase on insertion, so a key either matches exactly one stored form
/// or none. Backed by a `BTreeMap` to keep snapshots deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataBag {
    entries: BTreeMap<String, String>,
}

impl MetadataBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under the fully-qualified `key` (`namespace#key`).
    ///
    /// Later sets overwrite earlier ones.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Looks up the short `key` inside `namespace`, case-insensitively.
    #[must_use]
    pub fn lookup(&self, namespace: &str, key: &str) -> Option<&str> {
        let needle = format!("{namespace}#{key}").to_ascii_lowercase();
        self.entries.get(&needle).map(String::as_str)
    }

    /// Returns whether the short `key` is present in the relgen namespace.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.lookup(NAMESPACE, key).is_some()
    }

    /// Stores `value` under the relgen namespace.
    pub fn set_relgen(&mut self, key: &str, value: impl Into<String>) {
        self.set(format!("{NAMESPACE}#{key}"), value);
    }

    /// Appends `value` to a comma-separated list under the relgen namespace.
    pub fn append_relgen(&mut self, key: &str, value: &str) {
        let next = match self.lookup(NAMESPACE, key) {
            Some(existing) => format!("{existing},{value}"),
            None => value.to_string(),
        };
        self.set_relgen(key, next);
    }

    /// Returns whether the bag holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut bag = MetadataBag::new();
        bag.set("Relgen#TableName", "accounts");

        assert_eq!(bag.lookup("relgen", "tablename"), Some("accounts"));
        assert_eq!(bag.lookup("RELGEN", "TABLENAME"), Some("accounts"));
        assert_eq!(bag.lookup("relgen", "missing"), None);
    }

    #[test]
    fn namespaces_do_not_collide() {
        let mut bag = MetadataBag::new();
        bag.set("relgen#cached", "true");
        bag.set("other#cached", "false");

        assert_eq!(bag.lookup("relgen", "cached"), Some("true"));
        assert_eq!(bag.lookup("other", "cached"), Some("false"));
    }

    #[test]
    fn later_sets_overwrite() {
        let mut bag = MetadataBag::new();
        bag.set_relgen(keys::TABLE_NAME, "a");
        bag.set_relgen(keys::TABLE_NAME, "b");

        assert_eq!(bag.lookup(NAMESPACE, keys::TABLE_NAME), Some("b"));
    }

    #[test]
    fn append_builds_comma_list() {
        let mut bag = MetadataBag::new();
        bag.append_relgen(keys::BELONGS_TO, "Account");
        bag.append_relgen(keys::BELONGS_TO, "Project");

        assert_eq!(
            bag.lookup(NAMESPACE, keys::BELONGS_TO),
            Some("Account,Project")
        );
    }
}
