//! Per-model derivation.
//!
//! Before rendering, every model is reduced to a [`ModelPlan`]: primary
//! keys (synthesized when absent), time-valued members, association
//! members, and final identifier casing. Plans are derived once per
//! generation run and cached by the generator, since casing derivation is
//! deterministic but not free to recompute; the tree itself is never
//! mutated.

use relgen_schema::metadata::{keys, NAMESPACE};
use relgen_schema::node::{Field, FieldType, Model};
use tracing::debug;

use crate::error::{CodegenError, Result};
use crate::names;
use crate::relation::Relation;

/// Default persistence tag attached to derived primary keys.
pub const DEFAULT_PK_TAG: &str = "primary_key";

/// One generated struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPlan {
    /// Rust member name (snake_case, time members suffixed `_time`).
    pub name: String,
    /// Declared (wire) name, used for serde renames.
    pub wire: String,
    /// Backing column name when the member is a persisted scalar.
    pub column: Option<String>,
    /// Rendered Rust type, including any `Option`/`Vec` wrapper.
    pub rust_type: String,
    /// Whether the member is optional ("omit empty" in the wire form).
    pub optional: bool,
    /// Raw constraint tag carried through as a comment.
    pub sql_tag: Option<String>,
    /// Doc text for the member.
    pub description: Option<String>,
    /// Join table, for many-to-many collection members.
    pub m2m_join: Option<String>,
}

/// One primary-key component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkPlan {
    /// Member name.
    pub member: String,
    /// Rust type of the key component.
    pub rust_type: String,
    /// Persistence tag attached to the column.
    pub tag: String,
}

/// Everything the renderer needs to know about one model.
#[derive(Debug, Clone)]
pub struct ModelPlan {
    /// Model name as declared.
    pub model_name: String,
    /// Generated type name (PascalCase).
    pub type_name: String,
    /// Target table: custom override or pluralized snake_case name.
    pub table: String,
    /// Custom table name, when declared.
    pub custom_table: Option<String>,
    /// Read-through cache enabled.
    pub cached: bool,
    /// Table name supplied per call.
    pub dynamic_table: bool,
    /// Emit the role accessor.
    pub roler: bool,
    /// Emit the bookkeeping timestamp members.
    pub timestamps: bool,
    /// The `id` member was synthesized (no field named `id` was declared),
    /// so its column is auto-assigned by the store and never written.
    pub id_synthesized: bool,
    /// Declared members plus the primary key, sorted by member name.
    pub fields: Vec<MemberPlan>,
    /// Foreign-key members from belongs-to relations, declaration order.
    pub foreign_keys: Vec<MemberPlan>,
    /// Child members from has-many/has-one relations, declaration order.
    pub children: Vec<MemberPlan>,
    /// Collection members from many-to-many relations, declaration order.
    pub many_to_many: Vec<MemberPlan>,
    /// Primary-key components, declaration order.
    pub primary_keys: Vec<PkPlan>,
    /// Base names of time-valued members, sorted lexicographically.
    pub time_fields: Vec<String>,
    /// Parsed association descriptors.
    pub relations: Vec<Relation>,
}

impl ModelPlan {
    /// Derives the plan for `model`.
    ///
    /// # Errors
    ///
    /// Returns a [`CodegenError`] for malformed association encodings, a
    /// composite-key hint naming an undeclared field, more than one field
    /// claiming the `id` name, or a roler flag without a usable `role`
    /// field.
    pub fn derive(model: &Model) -> Result<Self> {
        let type_name = names::to_pascal(&model.name);
        let pk_tag = model
            .metadata
            .lookup(NAMESPACE, keys::PK_TAG)
            .unwrap_or(DEFAULT_PK_TAG)
            .to_string();

        let mut fields = Vec::new();
        let mut time_fields = Vec::new();
        let mut declared_id = None;
        for field in &model.fields {
            if field.name.eq_ignore_ascii_case("id") {
                if declared_id.is_some() {
                    return Err(CodegenError::AmbiguousPrimaryKey {
                        model: model.name.clone(),
                    });
                }
                declared_id = Some(field);
            } else {
                fields.push(member_from_field(field, &mut time_fields));
            }
        }

        // A field named id (any casing) is the primary key; otherwise an
        // integer id is synthesized.
        let id_member = match declared_id {
            Some(field) => {
                let mut member = member_from_field(field, &mut time_fields);
                member.name = "id".to_string();
                member.wire = "id".to_string();
                member.column = member.column.map(|_| "id".to_string());
                member.optional = false;
                member
            }
            None => MemberPlan {
                name: "id".to_string(),
                wire: "id".to_string(),
                column: Some("id".to_string()),
                rust_type: "i64".to_string(),
                optional: false,
                sql_tag: None,
                description: None,
                m2m_join: None,
            },
        };
        let id_tag = declared_id
            .and_then(Field::db_tag)
            .map_or_else(|| pk_tag.clone(), ToString::to_string);
        let id_type = id_member.rust_type.clone();
        let id_synthesized = declared_id.is_none();
        fields.push(id_member);
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        time_fields.sort();

        if model.is_roler()
            && !fields
                .iter()
                .any(|m| m.name == "role" && m.rust_type == "Option<String>")
        {
            return Err(CodegenError::MissingRoleField {
                model: model.name.clone(),
            });
        }

        let primary_keys = match model.metadata.lookup(NAMESPACE, keys::PRIMARY_KEYS) {
            Some(list) => {
                let mut pks = Vec::new();
                for raw in list.split(',') {
                    let member_name = names::to_snake(raw.trim());
                    let member = fields
                        .iter()
                        .find(|m| m.name == member_name)
                        .ok_or_else(|| CodegenError::UnknownPrimaryKey {
                            model: model.name.clone(),
                            field: raw.trim().to_string(),
                        })?;
                    pks.push(PkPlan {
                        member: member.name.clone(),
                        rust_type: member.rust_type.clone(),
                        tag: pk_tag.clone(),
                    });
                }
                pks
            }
            None => vec![PkPlan {
                member: "id".to_string(),
                rust_type: id_type,
                tag: id_tag,
            }],
        };

        let relations = Relation::parse_all(model)?;
        let mut foreign_keys = Vec::new();
        let mut children = Vec::new();
        let mut many_to_many = Vec::new();
        for relation in &relations {
            match relation {
                Relation::BelongsTo { parent } => {
                    let name = format!("{}_id", names::to_snake(parent));
                    foreign_keys.push(relation_member(name.clone(), Some(name), "i64", false));
                }
                Relation::HasMany { child } => {
                    let name = names::pluralize(&names::to_snake(child));
                    let ty = format!("Vec<{}>", names::to_pascal(child));
                    children.push(relation_member(name, None, &ty, false));
                }
                Relation::HasOne { child } => {
                    let base = names::to_snake(child);
                    let ty = format!("Option<{}>", names::to_pascal(child));
                    children.push(relation_member(base.clone(), None, &ty, true));
                    let fk = format!("{base}_id");
                    children.push(relation_member(fk.clone(), Some(fk), "Option<i64>", true));
                }
                Relation::ManyToMany {
                    alias,
                    remote,
                    join_table,
                } => {
                    let name = names::to_snake(alias);
                    let ty = format!("Vec<{}>", names::to_pascal(remote));
                    let mut member = relation_member(name, None, &ty, false);
                    member.m2m_join = Some(join_table.clone());
                    many_to_many.push(member);
                }
            }
        }
        // Declared fields win over relation-derived members of the same name.
        let declared: Vec<_> = fields.iter().map(|m| m.name.clone()).collect();
        foreign_keys.retain(|m| !declared.contains(&m.name));
        children.retain(|m| !declared.contains(&m.name));
        many_to_many.retain(|m| !declared.contains(&m.name));

        let plan = Self {
            model_name: model.name.clone(),
            type_name,
            table: model
                .table_name()
                .map_or_else(|| names::pluralize(&names::to_snake(&model.name)), ToString::to_string),
            custom_table: model.table_name().map(ToString::to_string),
            cached: model.is_cached(),
            dynamic_table: model.is_dynamic_table(),
            roler: model.is_roler(),
            timestamps: !model.metadata.flag(keys::SKIP_TIMESTAMPS),
            id_synthesized,
            fields,
            foreign_keys,
            children,
            many_to_many,
            primary_keys,
            time_fields,
            relations,
        };
        debug!(
            model = %plan.model_name,
            members = plan.fields.len(),
            relations = plan.relations.len(),
            "derived model plan"
        );
        Ok(plan)
    }

    /// Persisted scalar columns, in member order (used for filter methods
    /// and column lists).
    #[must_use]
    pub fn scalar_columns(&self) -> Vec<&MemberPlan> {
        self.fields.iter().filter(|m| m.column.is_some()).collect()
    }

    /// Whether `member` is part of the primary key.
    #[must_use]
    pub fn is_primary_key(&self, member: &str) -> bool {
        self.primary_keys.iter().any(|pk| pk.member == member)
    }
}

fn member_from_field(field: &Field, time_fields: &mut Vec<String>) -> MemberPlan {
    let base = names::to_snake(&field.name);
    let (name, scalar_type) = if field.is_time() {
        time_fields.push(base.clone());
        (format!("{base}_time"), "chrono::DateTime<chrono::Utc>".to_string())
    } else {
        let ty = match &field.field_type {
            FieldType::String => "String".to_string(),
            FieldType::Integer => "i64".to_string(),
            FieldType::Float => "f64".to_string(),
            FieldType::Boolean => "bool".to_string(),
            FieldType::Timestamp => "chrono::DateTime<chrono::Utc>".to_string(),
            FieldType::Object(target) => names::to_pascal(target),
        };
        (base.clone(), ty)
    };

    let is_column = !matches!(field.field_type, FieldType::Object(_));
    let optional = !field.required;
    let rust_type = if optional {
        format!("Option<{scalar_type}>")
    } else {
        scalar_type
    };

    MemberPlan {
        name,
        wire: field.name.clone(),
        column: is_column.then(|| field.db_tag().map_or(base, ToString::to_string)),
        rust_type,
        optional,
        sql_tag: field.sql_tag().map(ToString::to_string),
        description: field.description.clone(),
        m2m_join: None,
    }
}

fn relation_member(name: String, column: Option<String>, ty: &str, optional: bool) -> MemberPlan {
    MemberPlan {
        wire: name.clone(),
        name,
        column,
        rust_type: ty.to_string(),
        optional,
        sql_tag: None,
        description: None,
        m2m_join: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgen_schema::prelude::*;

    fn plan_for(decl: impl FnOnce(&mut relgen_schema::build::ModelBuilder)) -> ModelPlan {
        let mut design = DesignBuilder::new("g");
        design.store("db", |s| {
            s.model("User", decl);
        });
        let group = design.finish().unwrap();
        ModelPlan::derive(group.store("db").unwrap().model("User").unwrap()).unwrap()
    }

    #[test]
    fn synthesizes_integer_id_when_absent() {
        let plan = plan_for(|m| {
            m.field("name", FieldType::String, |_| {});
        });

        let id = plan.fields.iter().find(|f| f.name == "id").unwrap();
        assert_eq!(id.rust_type, "i64");
        assert!(!id.optional);
        assert!(plan.id_synthesized);
        assert_eq!(
            plan.primary_keys,
            vec![PkPlan {
                member: "id".into(),
                rust_type: "i64".into(),
                tag: DEFAULT_PK_TAG.into(),
            }]
        );
    }

    #[test]
    fn declared_id_is_normalized_and_kept() {
        let plan = plan_for(|m| {
            m.field("ID", FieldType::String, |f| {
                f.required();
            });
        });

        assert_eq!(plan.primary_keys.len(), 1);
        assert_eq!(plan.primary_keys[0].member, "id");
        assert_eq!(plan.primary_keys[0].rust_type, "String");
        assert!(!plan.id_synthesized);
        // Only one id member despite the odd casing.
        assert_eq!(plan.fields.iter().filter(|f| f.name == "id").count(), 1);
    }

    #[test]
    fn two_id_fields_differing_in_case_are_rejected() {
        let mut design = DesignBuilder::new("g");
        design.store("db", |s| {
            s.model("User", |m| {
                m.field("id", FieldType::Integer, |_| {});
                m.field("ID", FieldType::String, |_| {});
            });
        });
        let group = design.finish().unwrap();
        let err = ModelPlan::derive(group.store("db").unwrap().model("User").unwrap()).unwrap_err();

        assert!(matches!(
            err,
            CodegenError::AmbiguousPrimaryKey { ref model } if model == "User"
        ));
    }

    #[test]
    fn roler_without_role_field_is_rejected() {
        let mut design = DesignBuilder::new("g");
        design.store("db", |s| {
            s.model("User", |m| {
                m.roler();
                m.field("name", FieldType::String, |_| {});
            });
            s.model("Member", |m| {
                m.roler();
                // Required, so the member is a bare String: still rejected.
                m.field("role", FieldType::String, |f| {
                    f.required();
                });
            });
        });
        let group = design.finish().unwrap();
        let store = group.store("db").unwrap();

        for model in ["User", "Member"] {
            let err = ModelPlan::derive(store.model(model).unwrap()).unwrap_err();
            assert!(matches!(err, CodegenError::MissingRoleField { .. }));
        }
    }

    #[test]
    fn roler_with_optional_role_field_is_accepted() {
        let plan = plan_for(|m| {
            m.roler();
            m.field("role", FieldType::String, |_| {});
        });
        assert!(plan.roler);
    }

    #[test]
    fn explicit_db_tag_overrides_default_pk_tag() {
        let plan = plan_for(|m| {
            m.field("id", FieldType::Integer, |f| {
                f.db_tag("primaryKey;autoIncrement");
            });
        });

        assert_eq!(plan.primary_keys[0].tag, "primaryKey;autoIncrement");
    }

    #[test]
    fn composite_key_hint_selects_members() {
        let plan = plan_for(|m| {
            m.primary_keys(&["order_id", "product_id"]);
            m.field("order_id", FieldType::Integer, |f| {
                f.required();
            });
            m.field("product_id", FieldType::Integer, |f| {
                f.required();
            });
        });

        let members: Vec<_> = plan.primary_keys.iter().map(|pk| pk.member.as_str()).collect();
        assert_eq!(members, vec!["order_id", "product_id"]);
    }

    #[test]
    fn composite_key_with_unknown_field_fails() {
        let mut design = DesignBuilder::new("g");
        design.store("db", |s| {
            s.model("User", |m| {
                m.primary_keys(&["missing"]);
                m.field("name", FieldType::String, |_| {});
            });
        });
        let group = design.finish().unwrap();
        let err = ModelPlan::derive(group.store("db").unwrap().model("User").unwrap()).unwrap_err();

        assert!(matches!(
            err,
            CodegenError::UnknownPrimaryKey { ref field, .. } if field == "missing"
        ));
    }

    #[test]
    fn time_fields_are_suffixed_and_sorted() {
        let plan = plan_for(|m| {
            m.field("updated", FieldType::Timestamp, |_| {});
            m.field("born", FieldType::String, |f| {
                f.timestamp_format();
            });
        });

        assert_eq!(plan.time_fields, vec!["born", "updated"]);
        assert!(plan.fields.iter().any(|f| f.name == "born_time"));
        assert!(plan.fields.iter().any(|f| f.name == "updated_time"));
        assert!(plan.fields.iter().all(|f| f.name != "updated"));
    }

    #[test]
    fn belongs_to_adds_integer_foreign_key() {
        let plan = plan_for(|m| {
            m.belongs_to("Account");
            m.field("name", FieldType::String, |_| {});
        });

        assert_eq!(plan.foreign_keys.len(), 1);
        let fk = &plan.foreign_keys[0];
        assert_eq!(fk.name, "account_id");
        assert_eq!(fk.rust_type, "i64");
        assert_eq!(fk.column.as_deref(), Some("account_id"));
    }

    #[test]
    fn has_one_adds_child_and_nullable_fk() {
        let plan = plan_for(|m| {
            m.has_one("Profile");
        });

        let names: Vec<_> = plan.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["profile", "profile_id"]);
        assert_eq!(plan.children[1].rust_type, "Option<i64>");
    }

    #[test]
    fn has_many_adds_pluralized_collection() {
        let plan = plan_for(|m| {
            m.has_many("Category");
        });

        assert_eq!(plan.children[0].name, "categories");
        assert_eq!(plan.children[0].rust_type, "Vec<Category>");
    }

    #[test]
    fn custom_table_name_wins_over_pluralization() {
        let plan = plan_for(|m| {
            m.table_name("people_records");
        });
        assert_eq!(plan.table, "people_records");

        let plain = plan_for(|_| {});
        assert_eq!(plain.table, "users");
    }

    #[test]
    fn fields_are_sorted_by_name() {
        let plan = plan_for(|m| {
            m.field("zeta", FieldType::String, |_| {});
            m.field("alpha", FieldType::String, |_| {});
        });

        let names: Vec<_> = plan.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "id", "zeta"]);
    }
}
