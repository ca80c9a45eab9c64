//! Markdown and stylesheet pipeline options.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Markdown engine the external renderer should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownEngine {
    #[default]
    Kramdown,
    Redcarpet,
    Commonmark,
}

/// Site-wide markdown options. There is no per-page variation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Markdown engine
    pub engine: MarkdownEngine,

    /// Input dialect, e.g. "GFM"
    #[serde(rename = "input")]
    pub input_dialect: String,

    /// Syntax highlighter name, e.g. "rouge"
    pub syntax_highlighter: String,

    /// Options passed through to the syntax highlighter
    #[serde(rename = "syntax_highlighter_opts")]
    pub highlighter_options: BTreeMap<String, String>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            engine: MarkdownEngine::Kramdown,
            input_dialect: "GFM".to_string(),
            syntax_highlighter: "rouge".to_string(),
            highlighter_options: BTreeMap::new(),
        }
    }
}

impl MarkdownConfig {
    /// CSS class wrapped around highlighted code.
    pub fn css_class(&self) -> &str {
        self.highlighter_options
            .get("css_class")
            .map(String::as_str)
            .unwrap_or("highlight")
    }
}

/// Options for the external CSS autoprefixer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoprefixerConfig {
    /// Browserslist queries
    #[serde(deserialize_with = "string_or_list")]
    pub browsers: Vec<String>,
}

impl Default for AutoprefixerConfig {
    fn default() -> Self {
        Self {
            browsers: vec!["last 2 versions".to_string()],
        }
    }
}

/// Accept either `browsers = "last 2 versions"` or a list of queries.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(query) => query
            .split(',')
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
            .collect(),
        OneOrMany::Many(queries) => queries,
    })
}
