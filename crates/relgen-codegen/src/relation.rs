//! Association descriptors.
//!
//! Associations travel from the declaration site to the generator as
//! comma-separated, colon-delimited strings in the model's metadata bag
//! (the bag is the only channel between the two). This module parses those
//! encodings exactly once, into a tagged [`Relation`], and rejects
//! malformed input with an error naming the owning model and the raw
//! segment instead of indexing out of bounds.

use relgen_schema::metadata::{keys, NAMESPACE};
use relgen_schema::node::Model;

use crate::error::{CodegenError, Result};

/// A declared relationship between two models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// This model belongs to `parent`; gains a `<parent>_id` column.
    BelongsTo {
        /// Parent model name as declared.
        parent: String,
    },
    /// This model owns many `child` rows.
    HasMany {
        /// Child model name as declared.
        child: String,
    },
    /// This model owns at most one `child` row.
    HasOne {
        /// Child model name as declared.
        child: String,
    },
    /// Many-to-many through a join table.
    ManyToMany {
        /// Local member name for the collection.
        alias: String,
        /// Remote model name as declared.
        remote: String,
        /// Join table name.
        join_table: String,
    },
}

impl Relation {
    /// Parses every association encoding on `model`, in a fixed kind order
    /// (belongs-to, has-many, has-one, many-to-many) so output is
    /// deterministic regardless of metadata iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::MalformedRelation`] for any segment with the
    /// wrong shape, naming the model and the offending raw string.
    pub fn parse_all(model: &Model) -> Result<Vec<Self>> {
        let mut relations = Vec::new();
        for name in list(model, keys::BELONGS_TO)? {
            relations.push(Self::BelongsTo { parent: name });
        }
        for name in list(model, keys::HAS_MANY)? {
            relations.push(Self::HasMany { child: name });
        }
        for name in list(model, keys::HAS_ONE)? {
            relations.push(Self::HasOne { child: name });
        }
        if let Some(raw) = model.metadata.lookup(NAMESPACE, keys::MANY_TO_MANY) {
            for segment in raw.split(',') {
                relations.push(parse_many_to_many(&model.name, segment)?);
            }
        }
        Ok(relations)
    }
}

/// Splits a comma-separated list of bare model names.
fn list(model: &Model, key: &str) -> Result<Vec<String>> {
    let Some(raw) = model.metadata.lookup(NAMESPACE, key) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(|segment| {
            let name = segment.trim();
            if name.is_empty() || name.contains(':') {
                Err(CodegenError::MalformedRelation {
                    model: model.name.clone(),
                    raw: segment.to_string(),
                })
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

/// Parses one `alias:Remote:join_table` triplet.
fn parse_many_to_many(model: &str, segment: &str) -> Result<Relation> {
    let malformed = || CodegenError::MalformedRelation {
        model: model.to_string(),
        raw: segment.to_string(),
    };

    let mut pieces = segment.trim().split(':');
    let alias = pieces.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
    let remote = pieces.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
    let join_table = pieces.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
    if pieces.next().is_some() {
        return Err(malformed());
    }

    Ok(Relation::ManyToMany {
        alias: alias.to_string(),
        remote: remote.to_string(),
        join_table: join_table.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(key: &str, value: &str) -> Model {
        let mut model = Model::new("Proposal", "db");
        model.metadata.set_relgen(key, value);
        model
    }

    #[test]
    fn parses_each_shape() {
        let mut model = Model::new("Proposal", "db");
        model.metadata.set_relgen(keys::BELONGS_TO, "User");
        model.metadata.set_relgen(keys::HAS_MANY, "Vote,Comment");
        model.metadata.set_relgen(keys::HAS_ONE, "Summary");
        model
            .metadata
            .set_relgen(keys::MANY_TO_MANY, "reviewers:Reviewer:proposal_reviewers");

        let relations = Relation::parse_all(&model).unwrap();
        assert_eq!(
            relations,
            vec![
                Relation::BelongsTo { parent: "User".into() },
                Relation::HasMany { child: "Vote".into() },
                Relation::HasMany { child: "Comment".into() },
                Relation::HasOne { child: "Summary".into() },
                Relation::ManyToMany {
                    alias: "reviewers".into(),
                    remote: "Reviewer".into(),
                    join_table: "proposal_reviewers".into(),
                },
            ]
        );
    }

    #[test]
    fn no_metadata_means_no_relations() {
        let model = Model::new("Plain", "db");
        assert!(Relation::parse_all(&model).unwrap().is_empty());
    }

    #[test]
    fn wrong_segment_count_is_a_parse_error() {
        let model = model_with(keys::MANY_TO_MANY, "reviewers:Reviewer");
        let err = Relation::parse_all(&model).unwrap_err();
        match err {
            CodegenError::MalformedRelation { model, raw } => {
                assert_eq!(model, "Proposal");
                assert_eq!(raw, "reviewers:Reviewer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn too_many_segments_is_a_parse_error() {
        let model = model_with(keys::MANY_TO_MANY, "a:B:t:extra");
        assert!(matches!(
            Relation::parse_all(&model),
            Err(CodegenError::MalformedRelation { .. })
        ));
    }

    #[test]
    fn empty_name_in_list_is_a_parse_error() {
        let model = model_with(keys::BELONGS_TO, "User,,Account");
        assert!(matches!(
            Relation::parse_all(&model),
            Err(CodegenError::MalformedRelation { .. })
        ));
    }

    #[test]
    fn colon_in_bare_list_is_a_parse_error() {
        let model = model_with(keys::HAS_MANY, "Vote:oops");
        assert!(matches!(
            Relation::parse_all(&model),
            Err(CodegenError::MalformedRelation { .. })
        ));
    }
}
