//! The build configuration resolver.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use quire_config::{BlogConfig, BuildMode, BuildModeFlags, ConfigError, Layout, MarkdownConfig, Settings};
use serde::Serialize;

use crate::glob::GlobPattern;
use crate::route::RoutePattern;
use crate::slug::slugify;

/// Date and title extracted from an article source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogRoute {
    pub date: NaiveDate,
    pub title: String,
}

/// A page rule with its compiled pattern.
#[derive(Debug)]
struct CompiledRule<'a> {
    glob: GlobPattern,
    layout: &'a Layout,
}

/// Blog patterns compiled once at startup.
#[derive(Debug)]
struct CompiledBlog<'a> {
    config: &'a BlogConfig,
    sources: RoutePattern,
    permalink: RoutePattern,
    taglink: RoutePattern,
}

/// Resolves per-page settings from an immutable [`Settings`].
///
/// Page rules are kept in declaration order and the first match wins; a more
/// specific rule declared later never overrides an earlier one.
#[derive(Debug)]
pub struct Resolver<'a> {
    settings: &'a Settings,
    rules: Vec<CompiledRule<'a>>,
    blog: Option<CompiledBlog<'a>>,
}

impl<'a> Resolver<'a> {
    /// Compile the patterns of `settings`.
    pub fn new(settings: &'a Settings) -> Result<Self, ResolveError> {
        let rules = settings
            .pages
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    glob: GlobPattern::new(&rule.pattern)?,
                    layout: &rule.layout,
                })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;

        let blog = match &settings.blog {
            Some(config) => Some(CompiledBlog {
                config,
                sources: RoutePattern::new(&config.source_pattern)?,
                permalink: RoutePattern::new(&config.permalink_pattern)?,
                taglink: RoutePattern::new(&config.tag_link_pattern)?,
            }),
            None => None,
        };

        tracing::debug!(
            "Compiled {} page rules (blog {})",
            rules.len(),
            if blog.is_some() { "active" } else { "inactive" }
        );

        Ok(Self {
            settings,
            rules,
            blog,
        })
    }

    /// The settings this resolver reads from.
    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Layout override of the first page rule matching `output_path`.
    ///
    /// `None` means no rule matched and the framework default applies.
    pub fn resolve_layout(&self, output_path: &str) -> Option<&'a Layout> {
        let rule = self.rules.iter().find(|rule| rule.glob.is_match(output_path))?;
        tracing::debug!("{} matched page rule {}", output_path, rule.glob.as_str());
        Some(rule.layout)
    }

    /// Layout name the renderer should use, or `None` for no layout.
    ///
    /// Page rules come first, then the blog layout for articles, then the
    /// default layout.
    pub fn effective_layout(
        &self,
        output_path: &str,
        is_article: bool,
    ) -> Result<Option<&'a str>, ResolveError> {
        if let Some(layout) = self.resolve_layout(output_path) {
            return Ok(layout.name());
        }

        if is_article {
            if let Some(blog) = &self.blog {
                return Ok(Some(blog.config.layout_name.as_str()));
            }
        }

        match &self.settings.default_layout {
            Some(layout) => Ok(Some(layout.as_str())),
            None => Err(ResolveError::UnresolvedLayout(output_path.to_string())),
        }
    }

    /// The site-wide markdown options.
    pub fn resolve_markdown_options(&self) -> &'a MarkdownConfig {
        &self.settings.markdown
    }

    /// Extract date and title from an article source path.
    pub fn resolve_blog_route(&self, source_path: &str) -> Result<BlogRoute, ResolveError> {
        let blog = self.blog()?;
        let mismatch = || ResolveError::RouteMismatch {
            path: source_path.to_string(),
            pattern: blog.config.source_pattern.clone(),
        };

        let caps = blog.sources.captures(source_path).ok_or_else(mismatch)?;
        let number = |name: &str| caps.get(name).and_then(|v| v.parse::<u32>().ok());

        let (Some(year), Some(month), Some(day)) = (number("year"), number("month"), number("day"))
        else {
            return Err(mismatch());
        };
        let title = caps.get("title").cloned().ok_or_else(mismatch)?;

        let date = i32::try_from(year)
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
            .ok_or_else(|| ResolveError::InvalidDate {
                path: source_path.to_string(),
            })?;

        Ok(BlogRoute { date, title })
    }

    /// Public path of an article.
    pub fn render_permalink(&self, date: NaiveDate, title: &str) -> Result<String, ResolveError> {
        let blog = self.blog()?;
        blog.permalink.render(&date_values(date, title))
    }

    /// Path of the tag page for `tag`.
    pub fn render_tag_link(&self, tag: &str) -> Result<String, ResolveError> {
        let blog = self.blog()?;
        let values = BTreeMap::from([("tag", slugify(tag))]);
        blog.taglink.render(&values)
    }

    /// Source path for a new article; the title is slugified.
    pub fn new_article_path(&self, title: &str, date: NaiveDate) -> Result<String, ResolveError> {
        let blog = self.blog()?;
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(ResolveError::MissingPlaceholder("title".to_string()));
        }
        blog.sources.render(&date_values(date, &slug))
    }

    /// Minification toggles in effect for `mode`.
    pub fn build_flags(&self, mode: BuildMode) -> BuildModeFlags {
        if is_minification_active(mode) {
            self.settings.build
        } else {
            BuildModeFlags::default()
        }
    }

    /// Blog settings, when the blog is activated.
    pub fn blog_config(&self) -> Option<&'a BlogConfig> {
        self.blog.as_ref().map(|blog| blog.config)
    }

    fn blog(&self) -> Result<&CompiledBlog<'a>, ResolveError> {
        self.blog.as_ref().ok_or(ResolveError::BlogNotActive)
    }
}

/// Whether minification runs in `mode`.
pub fn is_minification_active(mode: BuildMode) -> bool {
    mode == BuildMode::Build
}

fn date_values(date: NaiveDate, title: &str) -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("year", format!("{:04}", date.year())),
        ("month", format!("{:02}", date.month())),
        ("day", format!("{:02}", date.day())),
        ("title", title.to_string()),
    ])
}

/// Errors that can occur during resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("`{path}` does not match the blog sources pattern `{pattern}`")]
    RouteMismatch { path: String, pattern: String },

    #[error("`{path}` does not name a valid calendar date")]
    InvalidDate { path: String },

    #[error("No layout for `{0}` and no default layout configured")]
    UnresolvedLayout(String),

    #[error("Blog extension is not activated")]
    BlogNotActive,

    #[error("Missing value for {{{0}}}")]
    MissingPlaceholder(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ResolveError {
    /// Whether the error only means "this file is not a blog article".
    pub fn is_route_mismatch(&self) -> bool {
        matches!(
            self,
            Self::RouteMismatch { .. } | Self::InvalidDate { .. } | Self::BlogNotActive
        )
    }
}
