//! Render one markdown file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quire_resolve::Resolver;

/// Run the render command.
pub fn run(config: &Path, file: &Path) -> Result<()> {
    let settings = super::load_settings(config)?;
    let resolver = Resolver::new(settings)?;

    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let rendered = quire_markdown::render(resolver.resolve_markdown_options(), &source)
        .with_context(|| format!("Failed to render {}", file.display()))?;

    if let Some(title) = rendered.frontmatter.and_then(|f| f.title) {
        tracing::debug!("Rendered \"{}\"", title);
    }

    print!("{}", rendered.html);
    Ok(())
}
