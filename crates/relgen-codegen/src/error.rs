//! Error types for derivation and code generation.

use relgen_schema::error::ValidationErrors;

/// Errors that can occur while deriving facts or emitting source units.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The tree failed validation; generation never ran.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// An association metadata encoding could not be parsed.
    #[error("model '{model}': malformed association encoding '{raw}'")]
    MalformedRelation {
        /// Owning model.
        model: String,
        /// The offending raw metadata segment.
        raw: String,
    },

    /// A composite-key hint named a field the model does not declare.
    #[error("model '{model}': unknown primary key field '{field}'")]
    UnknownPrimaryKey {
        /// Owning model.
        model: String,
        /// The missing field name.
        field: String,
    },

    /// More than one field claimed the `id` name (differing only in case).
    #[error("model '{model}': multiple fields named 'id' (case-insensitive)")]
    AmbiguousPrimaryKey {
        /// Owning model.
        model: String,
    },

    /// The roler flag was set without an optional string `role` field.
    #[error("model '{model}': roler flag requires an optional string field named 'role'")]
    MissingRoleField {
        /// Owning model.
        model: String,
    },

    /// Writing a generated unit failed; aborts the whole run.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, CodegenError>;
