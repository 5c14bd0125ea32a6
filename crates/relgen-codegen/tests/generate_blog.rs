//! End-to-end generation over a realistic blog design.

use relgen_codegen::Generator;
use relgen_schema::prelude::*;

fn blog_design() -> StorageGroup {
    let mut design = DesignBuilder::new("blog");
    design.store("primary", |s| {
        s.model("User", |m| {
            m.cached();
            m.roler();
            m.has_many("Post");
            m.field("email", FieldType::String, |f| {
                f.required();
                f.description("Login address.");
            });
            m.field("role", FieldType::String, |_| {});
            m.field("last_seen", FieldType::Timestamp, |_| {});
        });
        s.model("Post", |m| {
            m.belongs_to("User");
            m.many_to_many("reviewers", "User", "post_reviewers");
            m.field("title", FieldType::String, |f| {
                f.required();
            });
            m.field("body", FieldType::String, |_| {});
            m.field("published", FieldType::Boolean, |f| {
                f.db_tag("is_published");
            });
        });
        s.model("AuditEntry", |m| {
            m.dynamic_table();
            m.skip_timestamps();
            m.field("action", FieldType::String, |f| {
                f.required();
            });
        });
    });
    design.finish().expect("blog design is well-formed")
}

fn unit_source<'a>(units: &'a [relgen_codegen::SourceUnit], model: &str) -> &'a str {
    &units
        .iter()
        .find(|u| u.model == model)
        .unwrap_or_else(|| panic!("no unit for {model}"))
        .source
}

#[test]
fn emits_one_unit_per_model_in_name_order() {
    let generator = Generator::new(&blog_design()).unwrap();
    let units = generator.units();

    let models: Vec<_> = units.iter().map(|u| u.model.as_str()).collect();
    assert_eq!(models, vec!["AuditEntry", "Post", "User"]);
    let files: Vec<_> = units.iter().map(|u| u.file_name.as_str()).collect();
    assert_eq!(files, vec!["audit_entry.rs", "post.rs", "user.rs"]);
}

#[test]
fn repeated_generation_is_byte_identical() {
    let first = Generator::new(&blog_design()).unwrap().units();
    let second = Generator::new(&blog_design()).unwrap().units();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.source, b.source, "unit {} drifted between runs", a.model);
    }
}

#[test]
fn cached_model_gets_cache_plumbing() {
    let units = Generator::new(&blog_design()).unwrap().units();
    let user = unit_source(&units, "User");

    assert!(user.contains("use relgen_runtime::ReadCache;"));
    assert!(user.contains("cache: ReadCache<User>"));
    assert!(user.contains("if let Some(hit) = self.cache.get(&key).await"));
    assert!(user.contains("self.cache.spawn_set"));
    assert!(user.contains("self.cache.spawn_refresh"));
    assert!(user.contains("self.cache.spawn_evict"));
    // Role accessor from the roler marker.
    assert!(user.contains("pub fn role(&self) -> Option<&str>"));
    // Time field renamed with accessor.
    assert!(user.contains("pub last_seen_time: Option<chrono::DateTime<chrono::Utc>>"));
    assert!(user.contains("pub fn last_seen(&self) -> Option<String>"));
}

#[test]
fn belongs_to_produces_fk_and_parent_scoped_reads() {
    let units = Generator::new(&blog_design()).unwrap().units();
    let post = unit_source(&units, "Post");

    assert!(post.contains("pub user_id: i64"));
    assert!(post.contains("async fn list_by_user(&self, parent_id: i64) -> sqlx::Result<Vec<Post>>"));
    assert!(post.contains("async fn one_by_user(&self, parent_id: i64, id: i64) -> sqlx::Result<Post>"));
    assert!(post.contains("WHERE user_id = ?"));
}

#[test]
fn many_to_many_produces_join_table_accessors() {
    let units = Generator::new(&blog_design()).unwrap().units();
    let post = unit_source(&units, "Post");

    assert!(post.contains("pub reviewers: Vec<User>"));
    assert!(post.contains("async fn add_user(&self, post_id: i64, user_id: i64)"));
    assert!(post.contains("async fn delete_user(&self, post_id: i64, user_id: i64)"));
    assert!(post.contains("async fn list_reviewers(&self, post_id: i64)"));
    assert!(post.contains("INSERT INTO post_reviewers (post_id, user_id)"));
}

#[test]
fn db_tag_renames_the_backing_column() {
    let units = Generator::new(&blog_design()).unwrap().units();
    let post = unit_source(&units, "Post");

    assert!(post.contains("#[sqlx(rename = \"is_published\")]"));
    assert!(post.contains("pub published: Option<bool>"));
    assert!(post.contains("async fn list_by_published_eq(&self, value: bool)"));
    assert!(post.contains("WHERE is_published = ?"));
}

#[test]
fn dynamic_table_model_takes_table_per_call() {
    let units = Generator::new(&blog_design()).unwrap().units();
    let audit = unit_source(&units, "AuditEntry");

    assert!(audit.contains("async fn list(&self, table: &str)"));
    assert!(audit.contains("async fn add(&self, table: &str, model: AuditEntry)"));
    assert!(audit.contains("&format!(\"SELECT * FROM {table}\")"));
    assert!(!audit.contains("FROM audit_entries"));
    // skip_timestamps removed the bookkeeping members.
    assert!(!audit.contains("pub created_at"));
}

#[test]
fn uncached_model_has_no_cache_dependency() {
    let units = Generator::new(&blog_design()).unwrap().units();
    let post = unit_source(&units, "Post");

    assert!(!post.contains("ReadCache"));
    assert!(!post.contains("relgen_runtime"));
}
