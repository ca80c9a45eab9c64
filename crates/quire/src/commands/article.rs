//! Scaffold a new blog article.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use minijinja::{context, Environment};
use quire_resolve::Resolver;

/// Run the article command.
pub fn run(
    config: &Path,
    source: &Path,
    title: &str,
    date: Option<NaiveDate>,
    tags: &[String],
    force: bool,
) -> Result<()> {
    let settings = super::load_settings(config)?;
    let resolver = Resolver::new(settings)?;

    let templates_dir = templates_dir(config);
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let path = create_article(&resolver, source, &templates_dir, title, date, tags, force)?;
    tracing::info!("Created {}", path.display());

    Ok(())
}

/// Directory holding user templates, next to the config file.
pub fn templates_dir(config: &Path) -> PathBuf {
    config
        .parent()
        .map(|dir| dir.join("templates"))
        .unwrap_or_else(|| PathBuf::from("templates"))
}

/// Write a new article under `source` and return its path.
fn create_article(
    resolver: &Resolver<'_>,
    source: &Path,
    templates_dir: &Path,
    title: &str,
    date: NaiveDate,
    tags: &[String],
    force: bool,
) -> Result<PathBuf> {
    let blog = resolver
        .blog_config()
        .context("The blog extension is not activated in the site config")?;

    let relative = resolver.new_article_path(title, date)?;
    let extension = resolver
        .settings()
        .template_extensions
        .first()
        .map(String::as_str)
        .unwrap_or("md");
    let path = source.join(format!("{}.{}", relative, extension));

    if path.exists() && !force {
        bail!("{} already exists. Use --force to overwrite.", path.display());
    }

    let contents = render_article(
        templates_dir,
        &blog.new_article_template_name,
        title,
        date,
        tags,
    )?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

/// Render the new-article template, preferring `templates/<name>.md.jinja`.
fn render_article(
    templates_dir: &Path,
    template_name: &str,
    title: &str,
    date: NaiveDate,
    tags: &[String],
) -> Result<String> {
    let custom = templates_dir.join(format!("{}.md.jinja", template_name));
    let template = if custom.is_file() {
        tracing::debug!("Using article template {}", custom.display());
        fs::read_to_string(&custom)
            .with_context(|| format!("Failed to read {}", custom.display()))?
    } else {
        DEFAULT_ARTICLE_TEMPLATE.to_string()
    };

    let mut env = Environment::new();
    env.add_template_owned(template_name.to_string(), template)
        .with_context(|| format!("Invalid article template {}", template_name))?;

    let rendered = env.get_template(template_name)?.render(context! {
        title => title,
        title_yaml => serde_json::to_string(title)?,
        date => date.to_string(),
        tags => tags,
        tags_yaml => serde_json::to_string(tags)?,
    })?;

    Ok(rendered)
}

/// Built-in new-article template.
pub const DEFAULT_ARTICLE_TEMPLATE: &str = r#"---
title: {{ title_yaml }}
date: {{ date }}
tags: {{ tags_yaml }}
---

Write about {{ title }} here.
"#;
