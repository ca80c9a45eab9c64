//! Frontmatter extraction and parsing.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Parsed frontmatter from a markdown source.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Frontmatter {
    /// Display title
    pub title: Option<String>,

    /// Publication date, overriding the one in the file name
    #[serde(deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,

    /// Tags, as a list or a comma-separated string
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,

    /// Unpublished articles are left out of production builds
    pub published: bool,

    /// Summary for feeds and SEO
    pub description: Option<String>,
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: None,
            date: None,
            tags: Vec::new(),
            published: true,
            description: None,
        }
    }
}

/// Extract frontmatter from markdown content.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    let frontmatter: Frontmatter = if yaml_content.is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
    };

    Ok((Some(frontmatter), remaining.trim_start()))
}

/// Accept `2024-01-15` as well as `2024-01-15 10:30 UTC`; the time is dropped.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid date `{}`: {}", raw, e)))
}

fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    let tags = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(csv)) => csv.split(',').map(str::to_string).collect(),
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| scalar(item).ok_or_else(|| D::Error::custom("tags must be scalars")))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => vec![scalar(other).ok_or_else(|| D::Error::custom("tags must be a list"))?],
    };

    Ok(tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}
