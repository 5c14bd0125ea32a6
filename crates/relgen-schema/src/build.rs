//! Declarative design registration.
//!
//! A [`DesignBuilder`] owns one compilation run. Builder calls nest
//! strictly — group → store → model → field — and each level hands the
//! caller's closure a typed builder for the next level, so attaching a node
//! to the wrong parent is a compile error rather than a runtime report.
//! The builder keeps a context-frame stack mirroring the nesting, used to
//! qualify structural-error messages, and accumulates those errors instead
//! of failing fast; [`DesignBuilder::finish`] surfaces them all at once.
//!
//! Two independent builders never share state, so independent compilations
//! may run concurrently on different threads.

use tracing::debug;

use crate::error::{SchemaError, StructuralError};
use crate::metadata::keys;
use crate::node::{Field, FieldType, Model, StorageGroup, Store};

/// What to do when a node is re-declared under the same parent.
///
/// The reference behavior silently discarded a re-declared model's field
/// closure (first declaration wins); that is [`DuplicatePolicy::Ignore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Record a structural error naming the duplicate. The default.
    #[default]
    Error,
    /// Keep the first declaration; the duplicate's closure is not evaluated.
    Ignore,
    /// Evaluate the duplicate's closure on a fresh node and replace.
    Replace,
}

/// One entry of the builder's context stack.
#[derive(Debug)]
struct Frame {
    kind: &'static str,
    name: String,
}

/// State shared by all nested builders of one run.
#[derive(Debug)]
struct Registrar {
    policy: DuplicatePolicy,
    context: Vec<Frame>,
    errors: Vec<StructuralError>,
}

impl Registrar {
    fn path(&self) -> String {
        self.context
            .iter()
            .map(|f| format!("{} '{}'", f.kind, f.name))
            .collect::<Vec<_>>()
            .join(" > ")
    }

    fn push(&mut self, kind: &'static str, name: &str) {
        self.context.push(Frame {
            kind,
            name: name.to_string(),
        });
    }

    fn pop(&mut self) {
        self.context.pop();
    }

    fn report(&mut self, message: impl Into<String>) {
        self.errors.push(StructuralError {
            path: self.path(),
            message: message.into(),
        });
    }

    /// Applies the duplicate policy for a re-declared `kind` named `name`.
    /// Returns whether the caller should evaluate the declaration's closure.
    fn on_duplicate(&mut self, kind: &'static str, name: &str) -> bool {
        match self.policy {
            DuplicatePolicy::Error => {
                self.report(format!("{kind} '{name}' already declared"));
                false
            }
            DuplicatePolicy::Ignore => false,
            DuplicatePolicy::Replace => true,
        }
    }
}

/// Root builder for one storage group; one per compilation run.
#[derive(Debug)]
pub struct DesignBuilder {
    group: StorageGroup,
    registrar: Registrar,
}

impl DesignBuilder {
    /// Starts a design rooted at a storage group named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let group = StorageGroup::new(name);
        let mut registrar = Registrar {
            policy: DuplicatePolicy::default(),
            context: Vec::new(),
            errors: Vec::new(),
        };
        registrar.push("group", &group.name);
        Self { group, registrar }
    }

    /// Sets the duplicate-declaration policy for this run.
    #[must_use]
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.registrar.policy = policy;
        self
    }

    /// Declares a store and evaluates its nested declarations.
    pub fn store(&mut self, name: &str, decl: impl FnOnce(&mut StoreBuilder)) -> &mut Self {
        let existing = self.group.stores.iter().position(|s| s.name == name);
        if existing.is_some() && !self.registrar.on_duplicate("store", name) {
            return self;
        }

        self.registrar.push("store", name);
        let mut builder = StoreBuilder {
            node: Store::new(name, self.group.name.clone()),
            registrar: &mut self.registrar,
        };
        decl(&mut builder);
        let node = builder.node;
        self.registrar.pop();

        match existing {
            Some(idx) => self.group.stores[idx] = node,
            None => self.group.stores.push(node),
        }
        self
    }

    /// Sets a raw metadata entry on the group.
    pub fn meta(&mut self, key: &str, value: &str) -> &mut Self {
        self.group.metadata.set(key, value);
        self
    }

    /// Finishes the run, surfacing every structural error at once.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Structural`] when any builder invocation was
    /// invalid under the configured policy.
    pub fn finish(self) -> Result<StorageGroup, SchemaError> {
        if !self.registrar.errors.is_empty() {
            return Err(SchemaError::Structural(self.registrar.errors));
        }
        debug!(
            group = %self.group.name,
            stores = self.group.stores.len(),
            "design registration complete"
        );
        Ok(self.group)
    }
}

/// Builder for one store's nested declarations.
#[derive(Debug)]
pub struct StoreBuilder<'a> {
    node: Store,
    registrar: &'a mut Registrar,
}

impl StoreBuilder<'_> {
    /// Declares a model and evaluates its nested declarations.
    pub fn model(&mut self, name: &str, decl: impl FnOnce(&mut ModelBuilder)) -> &mut Self {
        let existing = self.node.models.iter().position(|m| m.name == name);
        if existing.is_some() && !self.registrar.on_duplicate("model", name) {
            return self;
        }

        self.registrar.push("model", name);
        let mut builder = ModelBuilder {
            node: Model::new(name, self.node.name.clone()),
            registrar: &mut *self.registrar,
        };
        decl(&mut builder);
        let node = builder.node;
        self.registrar.pop();

        match existing {
            Some(idx) => self.node.models[idx] = node,
            None => self.node.models.push(node),
        }
        self
    }

    /// Sets a raw metadata entry on the store.
    pub fn meta(&mut self, key: &str, value: &str) -> &mut Self {
        self.node.metadata.set(key, value);
        self
    }
}

/// Builder for one model's fields, associations and feature flags.
///
/// Associations and flags write through to the model's metadata bag as the
/// encoded strings the derivation engine parses, so the bag stays the single
/// transport between declaration and generation.
#[derive(Debug)]
pub struct ModelBuilder<'a> {
    node: Model,
    registrar: &'a mut Registrar,
}

impl ModelBuilder<'_> {
    /// Declares a field of the given semantic type.
    pub fn field(
        &mut self,
        name: &str,
        field_type: FieldType,
        decl: impl FnOnce(&mut FieldBuilder),
    ) -> &mut Self {
        let existing = self.node.fields.iter().position(|f| f.name == name);
        if existing.is_some() && !self.registrar.on_duplicate("field", name) {
            return self;
        }

        self.registrar.push("field", name);
        let mut builder = FieldBuilder {
            node: Field::new(name, field_type, self.node.name.clone()),
        };
        decl(&mut builder);
        let node = builder.node;
        self.registrar.pop();

        match existing {
            Some(idx) => self.node.fields[idx] = node,
            None => self.node.fields.push(node),
        }
        self
    }

    /// Overrides the storage table name.
    pub fn table_name(&mut self, name: &str) -> &mut Self {
        self.node.metadata.set_relgen(keys::TABLE_NAME, name);
        self
    }

    /// Generated methods take the target table name per call.
    pub fn dynamic_table(&mut self) -> &mut Self {
        self.node.metadata.set_relgen(keys::DYNAMIC_TABLE, "true");
        self
    }

    /// Enables the eventually-consistent read-through cache.
    pub fn cached(&mut self) -> &mut Self {
        self.node.metadata.set_relgen(keys::CACHED, "true");
        self
    }

    /// Emits a `role()` accessor on the generated struct.
    pub fn roler(&mut self) -> &mut Self {
        self.node.metadata.set_relgen(keys::ROLER, "true");
        self
    }

    /// Declares a composite primary key over the named fields.
    pub fn primary_keys(&mut self, fields: &[&str]) -> &mut Self {
        self.node
            .metadata
            .set_relgen(keys::PRIMARY_KEYS, fields.join(","));
        self
    }

    /// Overrides the persistence tag attached to the primary key.
    pub fn primary_key_tag(&mut self, tag: &str) -> &mut Self {
        self.node.metadata.set_relgen(keys::PK_TAG, tag);
        self
    }

    /// Suppresses the generated bookkeeping timestamp members.
    pub fn skip_timestamps(&mut self) -> &mut Self {
        self.node.metadata.set_relgen(keys::SKIP_TIMESTAMPS, "true");
        self
    }

    /// Declares a belongs-to association with `parent`.
    pub fn belongs_to(&mut self, parent: &str) -> &mut Self {
        self.node.metadata.append_relgen(keys::BELONGS_TO, parent);
        self
    }

    /// Declares a has-many association with `child`.
    pub fn has_many(&mut self, child: &str) -> &mut Self {
        self.node.metadata.append_relgen(keys::HAS_MANY, child);
        self
    }

    /// Declares a has-one association with `child`.
    pub fn has_one(&mut self, child: &str) -> &mut Self {
        self.node.metadata.append_relgen(keys::HAS_ONE, child);
        self
    }

    /// Declares a many-to-many association through `join_table`.
    pub fn many_to_many(&mut self, alias: &str, remote: &str, join_table: &str) -> &mut Self {
        self.node
            .metadata
            .append_relgen(keys::MANY_TO_MANY, &format!("{alias}:{remote}:{join_table}"));
        self
    }

    /// Sets a raw metadata entry on the model.
    pub fn meta(&mut self, key: &str, value: &str) -> &mut Self {
        self.node.metadata.set(key, value);
        self
    }
}

/// Builder for one field's tags and hints.
#[derive(Debug)]
pub struct FieldBuilder {
    node: Field,
}

impl FieldBuilder {
    /// Marks the field required (clears the "omit empty" flag).
    pub fn required(&mut self) -> &mut Self {
        self.node.required = true;
        self
    }

    /// Attaches doc text carried into the generated member.
    pub fn description(&mut self, text: &str) -> &mut Self {
        self.node.description = Some(text.to_string());
        self
    }

    /// Raw persistence-layer column tag.
    pub fn db_tag(&mut self, tag: &str) -> &mut Self {
        self.node.metadata.set_relgen(keys::DB_TAG, tag);
        self
    }

    /// Raw constraint tag.
    pub fn sql_tag(&mut self, tag: &str) -> &mut Self {
        self.node.metadata.set_relgen(keys::SQL_TAG, tag);
        self
    }

    /// Marks a string field as holding a formatted timestamp.
    pub fn timestamp_format(&mut self) -> &mut Self {
        self.node.metadata.set_relgen(keys::TIMESTAMP, "true");
        self
    }

    /// Sets a raw metadata entry on the field.
    pub fn meta(&mut self, key: &str, value: &str) -> &mut Self {
        self.node.metadata.set(key, value);
        self
    }
}
