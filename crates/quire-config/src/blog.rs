//! Blog extension settings.

use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;

/// Placeholders a dated article source path must carry.
pub const ROUTE_PLACEHOLDERS: [&str; 4] = ["year", "month", "day", "title"];

/// Blog routing and template names. Present only when the blog is activated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Source path pattern, e.g. `blog/{year}-{month}-{day}-{title}.html`
    #[serde(rename = "sources")]
    pub source_pattern: String,

    /// Output path pattern using the same placeholders
    #[serde(rename = "permalink")]
    pub permalink_pattern: String,

    /// Layout wrapped around articles
    #[serde(rename = "layout")]
    pub layout_name: String,

    /// Tag page path pattern with a `{tag}` placeholder
    #[serde(rename = "taglink")]
    pub tag_link_pattern: String,

    /// Template rendering tag pages
    #[serde(rename = "tag_template")]
    pub tag_template_name: String,

    /// Template used to scaffold new articles
    #[serde(rename = "new_article_template")]
    pub new_article_template_name: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            source_pattern: "{year}-{month}-{day}-{title}.html".to_string(),
            permalink_pattern: "{year}/{month}/{day}/{title}.html".to_string(),
            layout_name: "layout".to_string(),
            tag_link_pattern: "tags/{tag}.html".to_string(),
            tag_template_name: "tag".to_string(),
            new_article_template_name: "new_article".to_string(),
        }
    }
}

impl BlogConfig {
    /// Check that every pattern is well formed and uses known placeholders.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = placeholders(&self.source_pattern)?;
        for required in ROUTE_PLACEHOLDERS {
            if !source.contains(&required) {
                return Err(ConfigError::InvalidPattern {
                    pattern: self.source_pattern.clone(),
                    message: format!("missing {{{}}} placeholder", required),
                });
            }
        }

        for name in placeholders(&self.permalink_pattern)? {
            if !ROUTE_PLACEHOLDERS.contains(&name) {
                return Err(ConfigError::UnknownPlaceholder {
                    pattern: self.permalink_pattern.clone(),
                    placeholder: name.to_string(),
                });
            }
        }

        let tag = placeholders(&self.tag_link_pattern)?;
        if let Some(name) = tag.iter().find(|name| **name != "tag") {
            return Err(ConfigError::UnknownPlaceholder {
                pattern: self.tag_link_pattern.clone(),
                placeholder: name.to_string(),
            });
        }
        if tag.is_empty() {
            return Err(ConfigError::InvalidPattern {
                pattern: self.tag_link_pattern.clone(),
                message: "missing {tag} placeholder".to_string(),
            });
        }

        Ok(())
    }
}

/// List the `{name}` placeholders of a pattern in order of appearance.
pub fn placeholders(pattern: &str) -> Result<Vec<&str>, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        message: message.to_string(),
    };

    if pattern.trim().is_empty() {
        return Err(invalid("pattern is empty"));
    }

    let mut names = Vec::new();
    let mut rest = pattern;

    while let Some(open) = rest.find(['{', '}']) {
        if rest.as_bytes()[open] == b'}' {
            return Err(invalid("unmatched `}`"));
        }

        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(invalid("unclosed `{`"));
        };

        let name = &after[..close];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
            return Err(invalid("placeholder names must be lowercase words"));
        }

        names.push(name);
        rest = &after[close + 1..];
    }

    Ok(names)
}
