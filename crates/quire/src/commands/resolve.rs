//! Show the resolved settings for one output path.

use std::path::Path;

use anyhow::Result;
use quire_config::{BuildMode, BuildModeFlags, Layout, MarkdownConfig};
use quire_resolve::{is_minification_active, Resolver};
use serde::Serialize;

/// Settings handed to the renderer for one page.
#[derive(Debug, Serialize)]
struct ResolvedPage<'a> {
    path: &'a str,
    mode: BuildMode,
    rule: Option<&'a Layout>,
    layout: Option<&'a str>,
    markdown: &'a MarkdownConfig,
    minification_active: bool,
    flags: BuildModeFlags,
}

/// Run the resolve command.
pub fn run(config: &Path, mode: BuildMode, path: &str, article: bool, json: bool) -> Result<()> {
    let settings = super::load_settings(config)?;
    let resolver = Resolver::new(settings)?;

    let page = ResolvedPage {
        path,
        mode,
        rule: resolver.resolve_layout(path),
        layout: resolver.effective_layout(path, article)?,
        markdown: resolver.resolve_markdown_options(),
        minification_active: is_minification_active(mode),
        flags: resolver.build_flags(mode),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!("path:     {}", page.path);
    println!(
        "rule:     {}",
        page.rule
            .map(Layout::to_string)
            .unwrap_or_else(|| "none (default applies)".to_string())
    );
    println!("layout:   {}", page.layout.unwrap_or("none"));
    println!(
        "markdown: {:?} ({}, {}, css_class={})",
        page.markdown.engine,
        page.markdown.input_dialect,
        page.markdown.syntax_highlighter,
        page.markdown.css_class()
    );
    println!(
        "minify:   css={} html={} js={} ({:?}) [{} mode]",
        page.flags.minify_css,
        page.flags.minify_html,
        page.flags.minify_js,
        page.flags.js_compressor,
        page.mode
    );

    Ok(())
}
