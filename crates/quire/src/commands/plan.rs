//! Build plan command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quire_config::BuildMode;
use quire_resolve::{PlanOptions, Planner, Resolver};

/// Run the plan command.
pub fn run(
    config: &Path,
    mode: BuildMode,
    source: &Path,
    output: Option<PathBuf>,
    require_layout: bool,
) -> Result<()> {
    tracing::info!("Planning {} build of {}...", mode, source.display());

    let settings = super::load_settings(config)?;
    let resolver = Resolver::new(settings)?;
    let planner = Planner::new(
        &resolver,
        PlanOptions {
            mode,
            require_layout,
        },
    );

    let plan = planner.plan(source)?;
    let json = plan.to_json()?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote plan for {} files to {}", plan.pages.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
