//! Example: Blog Storage Generation
//!
//! This example declares a small blog design (users, posts, audit entries)
//! and writes one generated storage unit per model to `./generated/`.
//!
//! Run with: cargo run --example blog_models -p relgen-codegen

use std::path::Path;

use relgen_codegen::Generator;
use relgen_schema::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
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
    let group = design.finish()?;

    let generator = Generator::new(&group)?;
    let paths = generator.write_to_dir(Path::new("generated"))?;
    for path in paths {
        println!("wrote {}", path.display());
    }
    Ok(())
}
