//! The field node: one schema attribute of a model.

use serde::Serialize;

use crate::metadata::{keys, MetadataBag, NAMESPACE};

/// Semantic type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldType {
    /// UTF-8 text.
    String,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Boolean.
    Boolean,
    /// Point in time.
    Timestamp,
    /// Reference to another declared type by name.
    Object(String),
}

impl Default for FieldType {
    fn default() -> Self {
        Self::String
    }
}

/// One schema attribute of a [`Model`](crate::node::Model).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Field {
    /// Field name as declared (the wire name).
    pub name: String,
    /// Semantic type.
    pub field_type: FieldType,
    /// Name of the owning model.
    pub model: String,
    /// Whether the field is required (absence of this sets "omit empty").
    pub required: bool,
    /// Optional doc text carried into the generated member.
    pub description: Option<String>,
    /// Storage tags and format hints.
    pub metadata: MetadataBag,
}

impl Field {
    /// Creates a field owned by `model`.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type,
            model: model.into(),
            required: false,
            description: None,
            metadata: MetadataBag::new(),
        }
    }

    /// Raw persistence-layer column tag, if declared.
    #[must_use]
    pub fn db_tag(&self) -> Option<&str> {
        self.metadata.lookup(NAMESPACE, keys::DB_TAG)
    }

    /// Raw constraint tag, if declared.
    #[must_use]
    pub fn sql_tag(&self) -> Option<&str> {
        self.metadata.lookup(NAMESPACE, keys::SQL_TAG)
    }

    /// Whether the field holds a formatted timestamp.
    ///
    /// True for [`FieldType::Timestamp`] and for string fields carrying the
    /// timestamp format hint.
    #[must_use]
    pub fn is_time(&self) -> bool {
        self.field_type == FieldType::Timestamp
            || (self.field_type == FieldType::String && self.metadata.flag(keys::TIMESTAMP))
    }
}
