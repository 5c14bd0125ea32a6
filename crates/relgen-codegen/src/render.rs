//! Source-unit rendering.
//!
//! One self-contained Rust source unit per model: struct type, storage
//! trait, concrete store implementation, association accessors, and the
//! optional cache decoration. All emission orders are fixed (fields sorted
//! by name, relation blocks in declaration order), so re-rendering the same
//! plan is byte-identical.

use crate::names;
use crate::plan::{MemberPlan, ModelPlan, PkPlan};

const BOOKKEEPING: &[&str] = &["created_at", "updated_at", "deleted_at"];

/// Renders the complete source unit for one model plan.
#[must_use]
pub fn render_model(plan: &ModelPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "// Code generated by relgen for model {}. DO NOT EDIT.\n\n",
        plan.model_name
    ));
    out.push_str("use serde::{Deserialize, Serialize};\nuse sqlx::SqlitePool;\n");
    if plan.cached {
        out.push_str("use relgen_runtime::ReadCache;\n");
    }
    out.push('\n');

    render_struct(plan, &mut out);
    render_inherent_impl(plan, &mut out);
    render_storage_trait(plan, &mut out);
    render_store(plan, &mut out);
    out
}

// ================================================================
// Struct
// ================================================================

fn render_struct(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    out.push_str(&format!("/// {ty} storage type.\n"));
    out.push_str("#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]\n");
    out.push_str(&format!("pub struct {ty} {{\n"));

    for member in &plan.fields {
        render_member(member, out);
    }
    if plan.timestamps {
        out.push_str("\n    // Timestamps\n");
        for name in BOOKKEEPING {
            out.push_str(&format!(
                "    pub {name}: Option<chrono::DateTime<chrono::Utc>>,\n"
            ));
        }
    }
    if !plan.foreign_keys.is_empty() {
        out.push_str("\n    // Foreign keys\n");
        for member in &plan.foreign_keys {
            render_member(member, out);
        }
    }
    if !plan.children.is_empty() {
        out.push_str("\n    // Children\n");
        for member in &plan.children {
            render_member(member, out);
        }
    }
    for member in &plan.many_to_many {
        let join = member.m2m_join.as_deref().unwrap_or_default();
        out.push_str(&format!("\n    // Many-to-many via `{join}`\n"));
        render_member(member, out);
    }
    out.push_str("}\n\n");
}

fn render_member(member: &MemberPlan, out: &mut String) {
    if let Some(desc) = &member.description {
        out.push_str(&format!("    /// {desc}\n"));
    }
    if let Some(tag) = &member.sql_tag {
        out.push_str(&format!("    // sql: {tag}\n"));
    }
    if member.optional {
        out.push_str(&format!(
            "    #[serde(rename = \"{}\", skip_serializing_if = \"Option::is_none\")]\n",
            member.wire
        ));
    } else if member.wire != member.name {
        out.push_str(&format!("    #[serde(rename = \"{}\")]\n", member.wire));
    }
    match &member.column {
        Some(column) if column != &member.name => {
            out.push_str(&format!("    #[sqlx(rename = \"{column}\")]\n"));
        }
        Some(_) => {}
        None => out.push_str("    #[sqlx(skip)]\n"),
    }
    out.push_str(&format!("    pub {}: {},\n", member.name, member.rust_type));
}

// ================================================================
// Inherent impl: table name, role, time accessors
// ================================================================

fn render_inherent_impl(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    let mut body = String::new();

    if let Some(table) = &plan.custom_table {
        body.push_str(&format!(
            "    /// Storage table targeted by this model.\n    #[must_use]\n    pub fn table_name() -> &'static str {{\n        \"{table}\"\n    }}\n"
        ));
    }
    if plan.roler {
        body.push_str(
            "    /// Role carried by this record.\n    #[must_use]\n    pub fn role(&self) -> Option<&str> {\n        self.role.as_deref()\n    }\n",
        );
    }
    for base in &plan.time_fields {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&format!(
            "    /// RFC 3339 rendering of `{base}`.\n    #[must_use]\n    pub fn {base}(&self) -> Option<String> {{\n        self.{base}_time.map(|t| t.to_rfc3339())\n    }}\n"
        ));
    }

    if !body.is_empty() {
        out.push_str(&format!("impl {ty} {{\n{body}}}\n\n"));
    }
}

// ================================================================
// Signatures shared by trait and impl
// ================================================================

fn table_param(plan: &ModelPlan) -> &'static str {
    if plan.dynamic_table {
        ", table: &str"
    } else {
        ""
    }
}

fn pk_param_ty(pk: &PkPlan) -> &str {
    if pk.rust_type == "String" {
        "&str"
    } else {
        &pk.rust_type
    }
}

fn pk_params(plan: &ModelPlan) -> String {
    plan.primary_keys
        .iter()
        .map(|pk| format!("{}: {}", pk.member, pk_param_ty(pk)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn pk_where(plan: &ModelPlan) -> String {
    plan.primary_keys
        .iter()
        .map(|pk| format!("{} = ?", pk.member))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn pk_binds(plan: &ModelPlan, indent: &str) -> String {
    plan.primary_keys
        .iter()
        .map(|pk| format!("{indent}.bind({})\n", pk.member))
        .collect()
}

fn pk_model_binds(plan: &ModelPlan, indent: &str) -> String {
    plan.primary_keys
        .iter()
        .map(|pk| format!("{indent}.bind(&model.{})\n", pk.member))
        .collect()
}

/// Cache key from bare pk parameters.
fn key_expr(plan: &ModelPlan) -> String {
    if let [pk] = plan.primary_keys.as_slice() {
        format!("{}.to_string()", pk.member)
    } else {
        let fmt = vec!["{}"; plan.primary_keys.len()].join(":");
        let args = plan
            .primary_keys
            .iter()
            .map(|pk| pk.member.clone())
            .collect::<Vec<_>>()
            .join(", ");
        format!("format!(\"{fmt}\", {args})")
    }
}

/// Cache key from a `model` value.
fn model_key_expr(plan: &ModelPlan) -> String {
    if let [pk] = plan.primary_keys.as_slice() {
        format!("model.{}.to_string()", pk.member)
    } else {
        let fmt = vec!["{}"; plan.primary_keys.len()].join(":");
        let args = plan
            .primary_keys
            .iter()
            .map(|pk| format!("model.{}", pk.member))
            .collect::<Vec<_>>()
            .join(", ");
        format!("format!(\"{fmt}\", {args})")
    }
}

/// Builds the query-string expression for a SQL template containing the
/// `{table}` placeholder.
fn query_expr(plan: &ModelPlan, sql: &str) -> String {
    if plan.dynamic_table {
        format!("&format!(\"{sql}\")")
    } else {
        format!("\"{}\"", sql.replace("{table}", &plan.table))
    }
}

/// Same, targeting a join table instead of the model table.
fn join_query_expr(plan: &ModelPlan, sql: &str, join_table: &str) -> String {
    if plan.dynamic_table {
        format!("&format!(\"{sql}\")")
    } else {
        format!("\"{}\"", sql.replace("{table}", join_table))
    }
}

/// Columns written by `add`/`update`: every persisted scalar in struct
/// emission order, plus bookkeeping timestamps. Declared and composite key
/// columns are written like any other; only the synthesized `id` is left
/// to the store's auto-assignment.
fn write_columns(plan: &ModelPlan) -> Vec<(String, String)> {
    let mut cols = Vec::new();
    for member in plan
        .fields
        .iter()
        .chain(&plan.foreign_keys)
        .chain(&plan.children)
    {
        if let Some(column) = &member.column {
            if member.name == "id" && plan.id_synthesized {
                continue;
            }
            cols.push((column.clone(), member.name.clone()));
        }
    }
    if plan.timestamps {
        for name in BOOKKEEPING {
            cols.push(((*name).to_string(), (*name).to_string()));
        }
    }
    cols
}

fn filter_param_ty(member: &MemberPlan) -> &'static str {
    let base = member
        .rust_type
        .strip_prefix("Option<")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(&member.rust_type);
    match base {
        "String" => "&str",
        "i64" => "i64",
        "f64" => "f64",
        "bool" => "bool",
        _ => "chrono::DateTime<chrono::Utc>",
    }
}

// ================================================================
// Storage trait
// ================================================================

fn render_storage_trait(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    let tbl = table_param(plan);
    let pks = pk_params(plan);

    out.push_str(&format!(
        "/// Storage contract for `{ty}`, usable in place of the concrete\n/// store for testability.\n"
    ));
    out.push_str("#[allow(async_fn_in_trait)]\n");
    out.push_str(&format!("pub trait {ty}Storage {{\n"));
    out.push_str("    /// Underlying connection pool.\n    fn pool(&self) -> &SqlitePool;\n\n");
    out.push_str(&format!(
        "    async fn list(&self{tbl}) -> sqlx::Result<Vec<{ty}>>;\n"
    ));
    out.push_str(&format!(
        "    async fn one(&self{tbl}, {pks}) -> sqlx::Result<{ty}>;\n"
    ));
    out.push_str(&format!(
        "    async fn add(&self{tbl}, model: {ty}) -> sqlx::Result<{ty}>;\n"
    ));
    out.push_str(&format!(
        "    async fn update(&self{tbl}, model: {ty}) -> sqlx::Result<()>;\n"
    ));
    out.push_str(&format!(
        "    async fn delete(&self{tbl}, {pks}) -> sqlx::Result<()>;\n"
    ));

    for relation in &plan.relations {
        if let crate::relation::Relation::BelongsTo { parent } = relation {
            let suffix = names::to_snake(parent);
            out.push_str(&format!(
                "    async fn list_by_{suffix}(&self{tbl}, parent_id: i64) -> sqlx::Result<Vec<{ty}>>;\n"
            ));
            out.push_str(&format!(
                "    async fn one_by_{suffix}(&self{tbl}, parent_id: i64, {pks}) -> sqlx::Result<{ty}>;\n"
            ));
        }
    }
    for member in plan.scalar_columns() {
        let name = &member.name;
        let value_ty = filter_param_ty(member);
        out.push_str(&format!(
            "    async fn list_by_{name}_eq(&self{tbl}, value: {value_ty}) -> sqlx::Result<Vec<{ty}>>;\n"
        ));
        out.push_str(&format!(
            "    async fn list_by_{name}_like(&self{tbl}, value: {value_ty}) -> sqlx::Result<Vec<{ty}>>;\n"
        ));
    }
    for relation in &plan.relations {
        if let crate::relation::Relation::ManyToMany { alias, remote, .. } = relation {
            let local = names::to_snake(&plan.type_name);
            let remote_snake = names::to_snake(remote);
            let remote_ty = names::to_pascal(remote);
            let list_name = names::to_snake(alias);
            out.push_str(&format!(
                "    async fn add_{remote_snake}(&self{tbl}, {local}_id: i64, {remote_snake}_id: i64) -> sqlx::Result<()>;\n"
            ));
            out.push_str(&format!(
                "    async fn delete_{remote_snake}(&self{tbl}, {local}_id: i64, {remote_snake}_id: i64) -> sqlx::Result<()>;\n"
            ));
            out.push_str(&format!(
                "    async fn list_{list_name}(&self{tbl}, {local}_id: i64) -> sqlx::Result<Vec<{remote_ty}>>;\n"
            ));
        }
    }
    out.push_str("}\n\n");
}

// ================================================================
// Concrete store
// ================================================================

fn render_store(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;

    out.push_str(&format!("/// Concrete `{ty}` store"));
    if plan.cached {
        out.push_str(" with an eventually consistent read-through cache.\n///\n/// Mutations refresh or evict the cache on a detached task; a read that\n/// races a write may observe a stale entry until that task completes.\n");
    } else {
        out.push_str(".\n");
    }
    out.push_str("#[derive(Debug, Clone)]\n");
    out.push_str(&format!("pub struct {ty}Store {{\n    pool: SqlitePool,\n"));
    if plan.cached {
        out.push_str(&format!("    cache: ReadCache<{ty}>,\n"));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl {ty}Store {{\n    /// Creates a store bound to `pool`.\n    #[must_use]\n    pub fn new(pool: SqlitePool) -> Self {{\n"));
    if plan.cached {
        out.push_str("        Self {\n            pool,\n            cache: ReadCache::new(),\n        }\n");
    } else {
        out.push_str("        Self { pool }\n");
    }
    out.push_str("    }\n}\n\n");

    out.push_str(&format!("impl {ty}Storage for {ty}Store {{\n"));
    out.push_str("    fn pool(&self) -> &SqlitePool {\n        &self.pool\n    }\n\n");
    render_list(plan, out);
    render_one(plan, out);
    render_add(plan, out);
    render_update(plan, out);
    render_delete(plan, out);
    render_belongs_to(plan, out);
    render_filters(plan, out);
    render_many_to_many(plan, out);
    out.push_str("}\n");
}

fn render_list(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    let tbl = table_param(plan);
    let q = query_expr(plan, "SELECT * FROM {table}");
    out.push_str(&format!(
        "    async fn list(&self{tbl}) -> sqlx::Result<Vec<{ty}>> {{\n        sqlx::query_as::<_, {ty}>({q})\n            .fetch_all(&self.pool)\n            .await\n    }}\n\n"
    ));
}

fn render_one(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    let tbl = table_param(plan);
    let pks = pk_params(plan);
    let q = query_expr(plan, &format!("SELECT * FROM {{table}} WHERE {}", pk_where(plan)));
    let binds = pk_binds(plan, "            ");

    if plan.cached {
        let key = key_expr(plan);
        out.push_str(&format!(
            "    async fn one(&self{tbl}, {pks}) -> sqlx::Result<{ty}> {{\n        let key = {key};\n        if let Some(hit) = self.cache.get(&key).await {{\n            return Ok(hit);\n        }}\n        let obj = sqlx::query_as::<_, {ty}>({q})\n{binds}            .fetch_one(&self.pool)\n            .await?;\n        self.cache.spawn_set(key, obj.clone());\n        Ok(obj)\n    }}\n\n"
        ));
    } else {
        out.push_str(&format!(
            "    async fn one(&self{tbl}, {pks}) -> sqlx::Result<{ty}> {{\n        sqlx::query_as::<_, {ty}>({q})\n{binds}            .fetch_one(&self.pool)\n            .await\n    }}\n\n"
        ));
    }
}

fn render_add(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    let tbl = table_param(plan);
    let cols = write_columns(plan);
    let col_list = cols
        .iter()
        .map(|(c, _)| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; cols.len()].join(", ");
    let q = query_expr(
        plan,
        &format!("INSERT INTO {{table}} ({col_list}) VALUES ({placeholders})"),
    );
    let binds: String = cols
        .iter()
        .map(|(_, member)| format!("            .bind(&model.{member})\n"))
        .collect();

    out.push_str(&format!(
        "    async fn add(&self{tbl}, model: {ty}) -> sqlx::Result<{ty}> {{\n        sqlx::query({q})\n{binds}            .execute(&self.pool)\n            .await?;\n"
    ));
    if plan.cached {
        let key = model_key_expr(plan);
        out.push_str(&format!(
            "        self.cache.spawn_set({key}, model.clone());\n"
        ));
    }
    out.push_str("        Ok(model)\n    }\n\n");
}

fn render_update(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    let tbl = table_param(plan);
    let cols = write_columns(plan);
    let assignments = cols
        .iter()
        .map(|(c, _)| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let q = query_expr(
        plan,
        &format!("UPDATE {{table}} SET {assignments} WHERE {}", pk_where(plan)),
    );
    let binds: String = cols
        .iter()
        .map(|(_, member)| format!("            .bind(&model.{member})\n"))
        .collect();
    let pk_binds = pk_model_binds(plan, "            ");

    out.push_str(&format!(
        "    async fn update(&self{tbl}, model: {ty}) -> sqlx::Result<()> {{\n        sqlx::query({q})\n{binds}{pk_binds}            .execute(&self.pool)\n            .await?;\n"
    ));
    if plan.cached {
        // Refresh from storage on a detached task; failures are logged and
        // swallowed by the cache, not surfaced to this caller.
        let refetch_q = if plan.dynamic_table {
            format!(
                "&format!(\"SELECT * FROM {{table}} WHERE {}\")",
                pk_where(plan)
            )
        } else {
            format!(
                "\"SELECT * FROM {} WHERE {}\"",
                plan.table,
                pk_where(plan)
            )
        };
        let locals: String = plan
            .primary_keys
            .iter()
            .map(|pk| format!("        let {m} = model.{m}.clone();\n", m = pk.member))
            .collect();
        let task_binds: String = plan
            .primary_keys
            .iter()
            .map(|pk| format!("                .bind({})\n", pk.member))
            .collect();
        let key = key_expr(plan);
        let table_local = if plan.dynamic_table {
            "        let table = table.to_string();\n"
        } else {
            ""
        };
        out.push_str(&format!(
            "        let pool = self.pool.clone();\n{locals}{table_local}        self.cache.spawn_refresh({key}, async move {{\n            sqlx::query_as::<_, {ty}>({refetch_q})\n{task_binds}                .fetch_one(&pool)\n                .await\n        }});\n"
        ));
    }
    out.push_str("        Ok(())\n    }\n\n");
}

fn render_delete(plan: &ModelPlan, out: &mut String) {
    let tbl = table_param(plan);
    let pks = pk_params(plan);
    let q = query_expr(plan, &format!("DELETE FROM {{table}} WHERE {}", pk_where(plan)));
    let binds = pk_binds(plan, "            ");

    out.push_str(&format!(
        "    async fn delete(&self{tbl}, {pks}) -> sqlx::Result<()> {{\n        sqlx::query({q})\n{binds}            .execute(&self.pool)\n            .await?;\n"
    ));
    if plan.cached {
        let key = key_expr(plan);
        out.push_str(&format!("        self.cache.spawn_evict({key});\n"));
    }
    out.push_str("        Ok(())\n    }\n\n");
}

fn render_belongs_to(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    let tbl = table_param(plan);
    let pks = pk_params(plan);

    for relation in &plan.relations {
        let crate::relation::Relation::BelongsTo { parent } = relation else {
            continue;
        };
        let suffix = names::to_snake(parent);
        let fk = format!("{suffix}_id");
        let list_q = query_expr(plan, &format!("SELECT * FROM {{table}} WHERE {fk} = ?"));
        out.push_str(&format!(
            "    async fn list_by_{suffix}(&self{tbl}, parent_id: i64) -> sqlx::Result<Vec<{ty}>> {{\n        sqlx::query_as::<_, {ty}>({list_q})\n            .bind(parent_id)\n            .fetch_all(&self.pool)\n            .await\n    }}\n\n"
        ));

        let one_q = query_expr(
            plan,
            &format!("SELECT * FROM {{table}} WHERE {fk} = ? AND {}", pk_where(plan)),
        );
        let binds = pk_binds(plan, "            ");
        if plan.cached {
            let key = key_expr(plan);
            out.push_str(&format!(
                "    async fn one_by_{suffix}(&self{tbl}, parent_id: i64, {pks}) -> sqlx::Result<{ty}> {{\n        let key = {key};\n        if let Some(hit) = self.cache.get(&key).await {{\n            return Ok(hit);\n        }}\n        let obj = sqlx::query_as::<_, {ty}>({one_q})\n            .bind(parent_id)\n{binds}            .fetch_one(&self.pool)\n            .await?;\n        self.cache.spawn_set(key, obj.clone());\n        Ok(obj)\n    }}\n\n"
            ));
        } else {
            out.push_str(&format!(
                "    async fn one_by_{suffix}(&self{tbl}, parent_id: i64, {pks}) -> sqlx::Result<{ty}> {{\n        sqlx::query_as::<_, {ty}>({one_q})\n            .bind(parent_id)\n{binds}            .fetch_one(&self.pool)\n            .await\n    }}\n\n"
            ));
        }
    }
}

fn render_filters(plan: &ModelPlan, out: &mut String) {
    let ty = &plan.type_name;
    let tbl = table_param(plan);

    for member in plan.scalar_columns() {
        let name = &member.name;
        let column = member.column.as_deref().unwrap_or(name);
        let value_ty = filter_param_ty(member);
        let eq_q = query_expr(plan, &format!("SELECT * FROM {{table}} WHERE {column} = ?"));
        let like_q = query_expr(plan, &format!("SELECT * FROM {{table}} WHERE {column} LIKE ?"));
        out.push_str(&format!(
            "    async fn list_by_{name}_eq(&self{tbl}, value: {value_ty}) -> sqlx::Result<Vec<{ty}>> {{\n        sqlx::query_as::<_, {ty}>({eq_q})\n            .bind(value)\n            .fetch_all(&self.pool)\n            .await\n    }}\n\n"
        ));
        out.push_str(&format!(
            "    async fn list_by_{name}_like(&self{tbl}, value: {value_ty}) -> sqlx::Result<Vec<{ty}>> {{\n        sqlx::query_as::<_, {ty}>({like_q})\n            .bind(value)\n            .fetch_all(&self.pool)\n            .await\n    }}\n\n"
        ));
    }
}

fn render_many_to_many(plan: &ModelPlan, out: &mut String) {
    let tbl = table_param(plan);
    let local = names::to_snake(&plan.type_name);

    for relation in &plan.relations {
        let crate::relation::Relation::ManyToMany {
            alias,
            remote,
            join_table,
        } = relation
        else {
            continue;
        };
        let remote_snake = names::to_snake(remote);
        let remote_ty = names::to_pascal(remote);
        let remote_table = names::pluralize(&remote_snake);
        let list_name = names::to_snake(alias);
        let local_fk = format!("{local}_id");
        let remote_fk = format!("{remote_snake}_id");

        let add_q = join_query_expr(
            plan,
            &format!("INSERT INTO {{table}} ({local_fk}, {remote_fk}) VALUES (?, ?)"),
            join_table,
        );
        out.push_str(&format!(
            "    async fn add_{remote_snake}(&self{tbl}, {local_fk}: i64, {remote_fk}: i64) -> sqlx::Result<()> {{\n        sqlx::query({add_q})\n            .bind({local_fk})\n            .bind({remote_fk})\n            .execute(&self.pool)\n            .await?;\n        Ok(())\n    }}\n\n"
        ));

        let del_q = join_query_expr(
            plan,
            &format!("DELETE FROM {{table}} WHERE {local_fk} = ? AND {remote_fk} = ?"),
            join_table,
        );
        out.push_str(&format!(
            "    async fn delete_{remote_snake}(&self{tbl}, {local_fk}: i64, {remote_fk}: i64) -> sqlx::Result<()> {{\n        sqlx::query({del_q})\n            .bind({local_fk})\n            .bind({remote_fk})\n            .execute(&self.pool)\n            .await?;\n        Ok(())\n    }}\n\n"
        ));

        let list_q = join_query_expr(
            plan,
            &format!(
                "SELECT r.* FROM {remote_table} r INNER JOIN {{table}} j ON j.{remote_fk} = r.id WHERE j.{local_fk} = ?"
            ),
            join_table,
        );
        out.push_str(&format!(
            "    async fn list_{list_name}(&self{tbl}, {local_fk}: i64) -> sqlx::Result<Vec<{remote_ty}>> {{\n        sqlx::query_as::<_, {remote_ty}>({list_q})\n            .bind({local_fk})\n            .fetch_all(&self.pool)\n            .await\n    }}\n\n"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ModelPlan;
    use relgen_schema::prelude::*;

    fn render_for(decl: impl FnOnce(&mut relgen_schema::build::ModelBuilder)) -> String {
        let mut design = DesignBuilder::new("g");
        design.store("db", |s| {
            s.model("User", decl);
        });
        let group = design.finish().unwrap();
        let plan = ModelPlan::derive(group.store("db").unwrap().model("User").unwrap()).unwrap();
        render_model(&plan)
    }

    #[test]
    fn struct_members_are_sorted_and_tagged() {
        let source = render_for(|m| {
            m.field("zeta", FieldType::String, |_| {});
            m.field("alpha", FieldType::String, |f| {
                f.required();
                f.sql_tag("not null");
            });
        });

        let alpha = source.find("pub alpha: String").unwrap();
        let id = source.find("pub id: i64").unwrap();
        let zeta = source.find("pub zeta: Option<String>").unwrap();
        assert!(alpha < id && id < zeta);
        assert!(source.contains("// sql: not null"));
        assert!(source.contains("skip_serializing_if = \"Option::is_none\""));
    }

    #[test]
    fn belongs_to_generates_parent_accessors() {
        let source = render_for(|m| {
            m.belongs_to("Account");
            m.field("name", FieldType::String, |_| {});
        });

        assert!(source.contains("pub account_id: i64"));
        assert!(source.contains("async fn list_by_account(&self, parent_id: i64)"));
        assert!(source.contains("async fn one_by_account(&self, parent_id: i64, id: i64)"));
        assert!(source.contains("WHERE account_id = ?"));
    }

    #[test]
    fn dynamic_table_threads_a_table_parameter() {
        let source = render_for(|m| {
            m.dynamic_table();
            m.field("name", FieldType::String, |_| {});
        });

        assert!(source.contains("async fn list(&self, table: &str)"));
        assert!(source.contains("async fn one(&self, table: &str, id: i64)"));
        assert!(source.contains("&format!(\"SELECT * FROM {table}\")"));
        assert!(!source.contains("FROM users"));
    }

    #[test]
    fn cached_store_decorates_reads_and_writes() {
        let source = render_for(|m| {
            m.cached();
            m.field("name", FieldType::String, |_| {});
        });

        assert!(source.contains("use relgen_runtime::ReadCache;"));
        assert!(source.contains("cache: ReadCache<User>"));
        assert!(source.contains("if let Some(hit) = self.cache.get(&key).await"));
        assert!(source.contains("self.cache.spawn_set"));
        assert!(source.contains("self.cache.spawn_refresh"));
        assert!(source.contains("self.cache.spawn_evict"));
    }

    #[test]
    fn uncached_store_has_no_cache_plumbing() {
        let source = render_for(|m| {
            m.field("name", FieldType::String, |_| {});
        });

        assert!(!source.contains("cache"));
    }

    #[test]
    fn many_to_many_generates_accessor_triplet() {
        let source = render_for(|m| {
            m.many_to_many("reviewers", "Reviewer", "user_reviewers");
        });

        assert!(source.contains("async fn add_reviewer(&self, user_id: i64, reviewer_id: i64)"));
        assert!(source.contains("async fn delete_reviewer(&self, user_id: i64, reviewer_id: i64)"));
        assert!(source.contains("async fn list_reviewers(&self, user_id: i64)"));
        assert!(source.contains("INSERT INTO user_reviewers (user_id, reviewer_id)"));
        assert!(source.contains("pub reviewers: Vec<Reviewer>"));
    }

    #[test]
    fn custom_table_and_roler_emit_accessors() {
        let source = render_for(|m| {
            m.table_name("people");
            m.roler();
            m.field("role", FieldType::String, |_| {});
        });

        assert!(source.contains("pub fn table_name() -> &'static str"));
        assert!(source.contains("\"people\""));
        assert!(source.contains("pub fn role(&self) -> Option<&str>"));
        assert!(source.contains("FROM people"));
    }

    #[test]
    fn time_fields_get_suffixed_members_and_accessors() {
        let source = render_for(|m| {
            m.field("published", FieldType::Timestamp, |_| {});
        });

        assert!(source.contains("pub published_time: Option<chrono::DateTime<chrono::Utc>>"));
        assert!(source.contains("pub fn published(&self) -> Option<String>"));
        assert!(source.contains("to_rfc3339"));
    }

    #[test]
    fn skip_timestamps_drops_bookkeeping_members() {
        let with = render_for(|m| {
            m.field("name", FieldType::String, |_| {});
        });
        let without = render_for(|m| {
            m.skip_timestamps();
            m.field("name", FieldType::String, |_| {});
        });

        assert!(with.contains("pub created_at"));
        assert!(!without.contains("pub created_at"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let build = || {
            render_for(|m| {
                m.cached();
                m.belongs_to("Account");
                m.field("zeta", FieldType::String, |_| {});
                m.field("alpha", FieldType::Integer, |_| {});
            })
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn add_skips_only_the_synthesized_id_column() {
        let source = render_for(|m| {
            m.field("name", FieldType::String, |_| {});
        });

        assert!(source.contains(
            "INSERT INTO users (name, created_at, updated_at, deleted_at) VALUES (?, ?, ?, ?)"
        ));
    }

    #[test]
    fn add_writes_a_declared_id_column() {
        let source = render_for(|m| {
            m.field("id", FieldType::String, |f| {
                f.required();
            });
            m.field("name", FieldType::String, |_| {});
        });

        assert!(source.contains(
            "INSERT INTO users (id, name, created_at, updated_at, deleted_at) VALUES (?, ?, ?, ?, ?)"
        ));
        assert!(source.contains(".bind(&model.id)"));
    }

    #[test]
    fn add_writes_composite_key_columns() {
        let source = render_for(|m| {
            m.primary_keys(&["order_id", "product_id"]);
            m.field("order_id", FieldType::Integer, |f| {
                f.required();
            });
            m.field("product_id", FieldType::Integer, |f| {
                f.required();
            });
            m.field("qty", FieldType::Integer, |_| {});
        });

        assert!(source.contains(
            "INSERT INTO users (order_id, product_id, qty, created_at, updated_at, deleted_at)"
        ));
        assert!(source.contains(".bind(&model.order_id)"));
        assert!(source.contains(".bind(&model.product_id)"));
    }

    #[test]
    fn composite_key_threads_through_signatures() {
        let source = render_for(|m| {
            m.primary_keys(&["order_id", "product_id"]);
            m.field("order_id", FieldType::Integer, |f| {
                f.required();
            });
            m.field("product_id", FieldType::Integer, |f| {
                f.required();
            });
        });

        assert!(source.contains("async fn one(&self, order_id: i64, product_id: i64)"));
        assert!(source.contains("WHERE order_id = ? AND product_id = ?"));
    }
}
