//! Generation driver.
//!
//! [`Generator::new`] runs the whole front half once: full-tree validation
//! (every defect reported, not just the first), then plan derivation for
//! each model. Rendering after that point cannot fail, so callers can
//! re-emit units or write them to disk without re-checking the tree.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use relgen_schema::node::StorageGroup;
use tracing::{debug, info};

use crate::error::Result;
use crate::names;
use crate::plan::ModelPlan;
use crate::render;

/// One generated source unit.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Owning store name.
    pub store: String,
    /// Source model name as declared.
    pub model: String,
    /// File name for on-disk emission (`<snake_model>.rs`).
    pub file_name: String,
    /// Complete Rust source text.
    pub source: String,
}

#[derive(Debug)]
struct PlannedUnit {
    store: String,
    plan: ModelPlan,
}

/// Drives validation, derivation and rendering for one storage group.
#[derive(Debug)]
pub struct Generator {
    plans: Vec<PlannedUnit>,
}

impl Generator {
    /// Validates `group` and derives a plan for every model.
    ///
    /// Units are ordered by store name, then model name, so output order
    /// never depends on declaration order.
    ///
    /// # Errors
    ///
    /// Returns the full set of validation defects if the tree is invalid,
    /// or a derivation error (malformed association, unknown composite-key
    /// field) from the first offending model.
    pub fn new(group: &StorageGroup) -> Result<Self> {
        group.validate()?;

        let mut stores: Vec<_> = group.stores.iter().collect();
        stores.sort_by(|a, b| a.name.cmp(&b.name));

        let mut plans = Vec::new();
        for store in stores {
            let mut models: Vec<_> = store.models.iter().collect();
            models.sort_by(|a, b| a.name.cmp(&b.name));
            for model in models {
                plans.push(PlannedUnit {
                    store: store.name.clone(),
                    plan: ModelPlan::derive(model)?,
                });
            }
        }
        debug!(group = %group.name, models = plans.len(), "derived generation plans");
        Ok(Self { plans })
    }

    /// Renders every unit, in the fixed store/model order.
    #[must_use]
    pub fn units(&self) -> Vec<SourceUnit> {
        self.plans
            .iter()
            .map(|unit| SourceUnit {
                store: unit.store.clone(),
                model: unit.plan.model_name.clone(),
                file_name: format!("{}.rs", names::to_snake(&unit.plan.model_name)),
                source: render::render_model(&unit.plan),
            })
            .collect()
    }

    /// Writes one file per unit under `dir`, creating it if needed.
    ///
    /// Returns the written paths in emission order. Any IO failure aborts
    /// the run; files already written are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CodegenError::Io`] when the directory cannot
    /// be created or a unit cannot be written.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut paths = Vec::new();
        for unit in self.units() {
            let path = dir.join(&unit.file_name);
            fs::write(&path, unit.source)?;
            info!(model = %unit.model, path = %path.display(), "wrote storage unit");
            paths.push(path);
        }
        Ok(paths)
    }

    /// Writes every unit concatenated to `out`, separated by a blank
    /// line. Useful for snapshotting a whole run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CodegenError::Io`] when the sink fails.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        for unit in self.units() {
            out.write_all(unit.source.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
