pub mod article;
pub mod init;
pub mod plan;
pub mod render;
pub mod resolve;
pub mod route;

use std::path::Path;

use anyhow::{Context, Result};
use quire_config::{registry, Settings};

/// Load site.toml and install it as the process-wide settings.
pub fn load_settings(config: &Path) -> Result<&'static Settings> {
    let settings = Settings::load(config)
        .with_context(|| format!("Failed to load {}", config.display()))?;
    Ok(registry::install(settings)?)
}
