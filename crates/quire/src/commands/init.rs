//! Initialize a site in the current project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quire_config::STARTER_CONFIG;

use super::article::{templates_dir, DEFAULT_ARTICLE_TEMPLATE};

/// Run the init command.
pub fn run(config: &Path, source: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing quire...");

    if !scaffold(config, source, yes)? {
        tracing::warn!("{} already exists. Use --yes to overwrite.", source.display());
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'quire plan' to resolve the build plan.");

    Ok(())
}

/// Write the starter files. Returns false when `source` exists and `yes` is unset.
fn scaffold(config: &Path, source: &Path, yes: bool) -> Result<bool> {
    if source.exists() {
        if !yes {
            return Ok(false);
        }
    } else {
        fs::create_dir_all(source)
            .with_context(|| format!("Failed to create {}", source.display()))?;
    }

    write_file(config, STARTER_CONFIG, yes)?;
    write_file(&source.join("index.html.md"), DEFAULT_INDEX, yes)?;
    write_file(
        &source.join("blog/2024-01-15-hello-world.html.md"),
        DEFAULT_ARTICLE,
        yes,
    )?;

    let layouts = source.join("layouts");
    if !layouts.exists() {
        fs::create_dir_all(&layouts)
            .with_context(|| format!("Failed to create {}", layouts.display()))?;
    }

    let templates = templates_dir(config);
    write_file(
        &templates.join("new_article.md.jinja"),
        DEFAULT_ARTICLE_TEMPLATE,
        yes,
    )?;

    Ok(true)
}

fn write_file(path: &Path, contents: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());
    Ok(())
}

const DEFAULT_INDEX: &str = r#"---
title: Welcome
---

# Welcome

This page is rendered with the default layout.
"#;

const DEFAULT_ARTICLE: &str = r#"---
title: "Hello, World"
date: 2024-01-15
tags: [welcome]
---

The first article. It is published at `/blog/2024/01/15/hello-world.html`.

```ruby
puts "hello"
```
"#;
