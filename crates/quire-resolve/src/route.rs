//! Placeholder patterns such as `blog/{year}-{month}-{day}-{title}.html`.

use std::collections::BTreeMap;

use regex::Regex;

use crate::resolver::ResolveError;

/// A piece of a route pattern.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled route pattern that can both match paths and render them.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
    regex: Regex,
}

impl RoutePattern {
    /// Compile a pattern. Each placeholder may appear only once.
    pub fn new(pattern: &str) -> Result<Self, ResolveError> {
        let invalid = |message: String| ResolveError::InvalidPattern {
            pattern: pattern.to_string(),
            message,
        };

        // Reject malformed braces up front with the config crate's rules.
        quire_config::placeholders(pattern)?;

        let trimmed = pattern.trim_start_matches('/');
        let mut segments = Vec::new();
        let mut rest = trimmed;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| invalid("unclosed `{`".to_string()))?;
            segments.push(Segment::Placeholder(after[..close].to_string()));
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        let mut seen = Vec::new();
        let mut expr = String::from("^");
        for segment in &segments {
            match segment {
                Segment::Literal(text) => expr.push_str(&regex::escape(text)),
                Segment::Placeholder(name) => {
                    if seen.contains(&name) {
                        return Err(invalid(format!("{{{}}} appears more than once", name)));
                    }
                    seen.push(name);
                    expr.push_str(&format!("(?P<{}>{})", name, placeholder_expr(name)));
                }
            }
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a path, returning the value captured for each placeholder.
    pub fn captures(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let path = path.trim().replace('\\', "/");
        let caps = self.regex.captures(path.trim_start_matches('/'))?;

        Some(
            self.placeholders()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Substitute values into the pattern.
    pub fn render(&self, values: &BTreeMap<&str, String>) -> Result<String, ResolveError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values
                        .get(name.as_str())
                        .ok_or_else(|| ResolveError::MissingPlaceholder(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// What a placeholder may match.
fn placeholder_expr(name: &str) -> &'static str {
    match name {
        "year" => r"\d{4}",
        "month" | "day" => r"\d{2}",
        _ => r"[^/]+",
    }
}
