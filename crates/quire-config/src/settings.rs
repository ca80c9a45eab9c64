//! Loading, building and validating the site rule set.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::blog::BlogConfig;
use crate::build::BuildModeFlags;
use crate::markdown::{AutoprefixerConfig, MarkdownConfig};
use crate::page::{Layout, PageRule};

/// The complete rule set of a site (site.toml).
///
/// Optional sections model extensions: a `[blog]` or `[autoprefixer]` table
/// being present is what activates the extension.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Layout used when no page rule matches; `false` in TOML for none
    #[serde(
        deserialize_with = "layout_or_false",
        serialize_with = "serialize_layout_or_false"
    )]
    pub default_layout: Option<String>,

    /// Source suffixes stripped to obtain output paths
    pub template_extensions: Vec<String>,

    pub markdown: MarkdownConfig,

    pub autoprefixer: Option<AutoprefixerConfig>,

    pub blog: Option<BlogConfig>,

    /// Page rules in declaration order
    #[serde(rename = "page")]
    pub pages: Vec<PageRule>,

    /// Toggles applied in build mode only
    pub build: BuildModeFlags,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_layout: Some("layout".to_string()),
            template_extensions: vec![
                "md".to_string(),
                "markdown".to_string(),
                "erb".to_string(),
            ],
            markdown: MarkdownConfig::default(),
            autoprefixer: None,
            blog: None,
            pages: Vec::new(),
            build: BuildModeFlags::default(),
        }
    }
}

impl Settings {
    /// Start a typed builder from default settings.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file.
    ///
    /// A missing file yields the default settings; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No {} found, using default settings", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let settings = Self::from_toml(&content)?;

        tracing::info!(
            "Loaded {} page rules from {}",
            settings.pages.len(),
            path.display()
        );

        Ok(settings)
    }

    /// Check patterns and extension settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(layout) = &self.default_layout {
            if layout.trim().is_empty() {
                return Err(ConfigError::InvalidPattern {
                    pattern: layout.clone(),
                    message: "default layout name must not be empty".to_string(),
                });
            }
        }

        for rule in &self.pages {
            if rule.pattern.trim().is_empty() {
                return Err(ConfigError::InvalidPattern {
                    pattern: rule.pattern.clone(),
                    message: "page pattern is empty".to_string(),
                });
            }
        }

        if let Some(blog) = &self.blog {
            blog.validate()?;
        }

        if let Some(ext) = self
            .template_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains(['.', '/']))
        {
            return Err(ConfigError::InvalidPattern {
                pattern: ext.clone(),
                message: "template extensions are bare suffixes like `md`".to_string(),
            });
        }

        Ok(())
    }
}

fn layout_or_false<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Layout::deserialize(deserializer)?.name().map(str::to_string))
}

fn serialize_layout_or_false<S>(layout: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match layout {
        Some(name) => serializer.serialize_str(name),
        None => serializer.serialize_bool(false),
    }
}

/// Declarative builder mirroring the sections of site.toml.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Set the markdown options.
    pub fn markdown(mut self, config: MarkdownConfig) -> Self {
        self.settings.markdown = config;
        self
    }

    /// Activate the autoprefixer and adjust its options.
    pub fn activate_autoprefixer(mut self, configure: impl FnOnce(&mut AutoprefixerConfig)) -> Self {
        let mut config = AutoprefixerConfig::default();
        configure(&mut config);
        self.settings.autoprefixer = Some(config);
        self
    }

    /// Activate the blog and adjust its options.
    pub fn activate_blog(mut self, configure: impl FnOnce(&mut BlogConfig)) -> Self {
        let mut config = BlogConfig::default();
        configure(&mut config);
        self.settings.blog = Some(config);
        self
    }

    /// Append a page rule. Rules are evaluated in the order they are added.
    pub fn page(mut self, pattern: impl Into<String>, layout: Layout) -> Self {
        self.settings.pages.push(PageRule::new(pattern, layout));
        self
    }

    /// Adjust the build-mode toggles.
    pub fn configure_build(mut self, configure: impl FnOnce(&mut BuildModeFlags)) -> Self {
        configure(&mut self.settings.build);
        self
    }

    /// Set the framework default layout.
    pub fn default_layout(mut self, layout: Option<&str>) -> Self {
        self.settings.default_layout = layout.map(str::to_string);
        self
    }

    /// Validate and finish.
    pub fn build(self) -> Result<Settings, ConfigError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

/// Errors that can occur when loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Unknown placeholder {{{placeholder}}} in `{pattern}`")]
    UnknownPlaceholder { pattern: String, placeholder: String },

    #[error("Unknown build mode: {0} (expected dev or build)")]
    UnknownBuildMode(String),

    #[error("Settings are already installed")]
    AlreadyInstalled,
}

/// Starter site.toml written by `quire init`.
pub const STARTER_CONFIG: &str = r#"# quire site configuration

# Layout used when no page rule matches
default_layout = "layout"

[markdown]
engine = "kramdown"
input = "GFM"
syntax_highlighter = "rouge"

[markdown.syntax_highlighter_opts]
css_class = "highlight"

[autoprefixer]
browsers = "last 2 versions"

[blog]
sources = "blog/{year}-{month}-{day}-{title}.html"
permalink = "blog/{year}/{month}/{day}/{title}.html"
layout = "blog"
taglink = "tags/{tag}.html"
tag_template = "tag"
new_article_template = "new_article"

# Per-page layout changes, first match wins
[[page]]
pattern = "/*.xml"
layout = false

[[page]]
pattern = "/*.json"
layout = false

[[page]]
pattern = "/*.txt"
layout = false

[[page]]
pattern = "/blog/*"
layout = "blog_article"

# Only applied with --mode build
[build]
minify_css = true
minify_html = true
minify_javascript = true
js_compressor = "terser"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::JsCompressor;
    use crate::markdown::MarkdownEngine;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn starter_from_builder() -> Settings {
        let mut markdown = MarkdownConfig {
            engine: MarkdownEngine::Kramdown,
            input_dialect: "GFM".to_string(),
            syntax_highlighter: "rouge".to_string(),
            ..Default::default()
        };
        markdown
            .highlighter_options
            .insert("css_class".to_string(), "highlight".to_string());

        Settings::builder()
            .markdown(markdown)
            .activate_autoprefixer(|prefix| prefix.browsers = vec!["last 2 versions".to_string()])
            .activate_blog(|blog| {
                blog.source_pattern = "blog/{year}-{month}-{day}-{title}.html".to_string();
                blog.permalink_pattern = "blog/{year}/{month}/{day}/{title}.html".to_string();
                blog.layout_name = "blog".to_string();
                blog.tag_link_pattern = "tags/{tag}.html".to_string();
                blog.tag_template_name = "tag".to_string();
                blog.new_article_template_name = "new_article".to_string();
            })
            .page("/*.xml", Layout::Disabled)
            .page("/*.json", Layout::Disabled)
            .page("/*.txt", Layout::Disabled)
            .page("/blog/*", Layout::named("blog_article"))
            .configure_build(|build| {
                build.minify_css = true;
                build.minify_html = true;
                build.minify_js = true;
                build.js_compressor = JsCompressor::Terser;
            })
            .build()
            .unwrap()
    }

    #[test]
    fn starter_config_matches_builder() {
        let parsed = Settings::from_toml(STARTER_CONFIG).unwrap();
        assert_eq!(parsed, starter_from_builder());
    }

    #[test]
    fn keeps_page_rule_order() {
        let settings = Settings::from_toml(STARTER_CONFIG).unwrap();
        let patterns: Vec<_> = settings.pages.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/*.xml", "/*.json", "/*.txt", "/blog/*"]);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.blog.is_none());
        assert!(settings.pages.is_empty());
    }

    #[test]
    fn rejects_unknown_sections() {
        let result = Settings::from_toml("[proxy]\npath = \"/x.html\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn rejects_misspelled_section_keys() {
        for config in [
            "[blog]\npermalinks = \"{year}/{title}.html\"\n",
            "[[page]]\npattern = \"/*.xml\"\nlayout = false\npriority = 1\n",
            "[markdown]\nengin = \"redcarpet\"\n",
            "[build]\nminify_cs = true\n",
        ] {
            let result = Settings::from_toml(config);
            assert!(
                matches!(result, Err(ConfigError::ParseError(_))),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn rejects_empty_page_pattern() {
        let result = Settings::builder().page("", Layout::Disabled).build();
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn default_layout_can_be_switched_off() {
        let settings = Settings::from_toml("default_layout = false\n").unwrap();
        assert_eq!(settings.default_layout, None);

        let text = toml::to_string(&settings).unwrap();
        assert!(text.contains("default_layout = false"));
        assert_eq!(Settings::from_toml(&text).unwrap(), settings);
    }

    #[test]
    fn rejects_empty_default_layout() {
        assert!(Settings::from_toml("default_layout = \"\"\n").is_err());
        assert!(Settings::from_toml("default_layout = true\n").is_err());

        let result = Settings::builder().default_layout(Some(" ")).build();
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn rejects_dotted_template_extension() {
        let result = Settings::from_toml("template_extensions = [\".md\"]\n");
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn loads_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, STARTER_CONFIG).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.pages.len(), 4);
        assert!(settings.blog.is_some());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp = tempdir().unwrap();
        let settings = Settings::load(&temp.path().join("site.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
