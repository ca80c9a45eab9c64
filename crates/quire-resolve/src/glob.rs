//! Glob patterns for page rules.
//!
//! Patterns are matched against output paths with `wax`. Both are taken
//! relative to the site root, so a leading `/` is optional:
//! - `*` matches a run of characters other than `/`
//! - a trailing `/*` segment matches anything below that directory
//! - `**` matches across segments (`a/**/b` also matches `a/b`)
//! - `?` matches a single character other than `/`

use wax::{Glob, Pattern};

use crate::resolver::ResolveError;

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    glob: Glob<'static>,
}

impl GlobPattern {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> Result<Self, ResolveError> {
        let expression = rewrite(pattern);
        if expression.is_empty() {
            return Err(ResolveError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "pattern is empty".to_string(),
            });
        }

        let glob = Glob::new(&expression)
            .map_err(|e| ResolveError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?
            .into_owned();

        Ok(Self {
            source: pattern.to_string(),
            glob,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether an output path matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.glob.is_match(normalize(path).as_str())
    }
}

/// Normalise an output path to forward slashes, relative to the site root.
pub(crate) fn normalize(path: &str) -> String {
    path.trim().replace('\\', "/").trim_start_matches('/').to_string()
}

/// Root-relative wax expression for a page pattern.
///
/// A trailing `/*` selects a whole subtree and becomes `/**`.
fn rewrite(pattern: &str) -> String {
    let mut rooted = format!("/{}", pattern.trim().trim_start_matches('/'));
    if rooted.ends_with("/*") && !rooted.ends_with("/**") {
        rooted.push('*');
    }
    rooted[1..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob(pattern: &str) -> GlobPattern {
        GlobPattern::new(pattern).unwrap()
    }

    #[test]
    fn star_stays_within_a_segment() {
        let xml = glob("/*.xml");
        assert!(xml.is_match("/feed.xml"));
        assert!(xml.is_match("sitemap.xml"));
        assert!(!xml.is_match("/feeds/atom.xml"));
        assert!(!xml.is_match("/feed.xml.html"));
    }

    #[test]
    fn trailing_star_spans_segments() {
        let blog = glob("/blog/*");
        assert!(blog.is_match("/blog/index.html"));
        assert!(blog.is_match("blog/2024/01/15/hello-world.html"));
        assert!(!blog.is_match("/blogroll.html"));
        assert!(!blog.is_match("/posts/blog/a.html"));

        let everything = glob("/*");
        assert!(everything.is_match("/a/b/c.html"));
    }

    #[test]
    fn double_star_spans_segments() {
        let css = glob("/assets/**/*.css");
        assert!(css.is_match("/assets/site.css"));
        assert!(css.is_match("/assets/vendor/normalize.css"));
        assert!(!css.is_match("/assets/site.js"));

        let any = glob("**/*.txt");
        assert!(any.is_match("/a/b/c.txt"));
        assert!(any.is_match("/c.txt"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        let page = glob("/page?.html");
        assert!(page.is_match("/page1.html"));
        assert!(!page.is_match("/page10.html"));
        assert!(!page.is_match("/page/.html"));
    }

    #[test]
    fn matches_literal_characters() {
        let exact = glob("/path/to/file.html");
        assert!(exact.is_match("/path/to/file.html"));
        assert!(!exact.is_match("/path/to/fileXhtml"));

        let plus = glob("/c++/*.md");
        assert!(plus.is_match("/c++/notes.md"));
    }

    #[test]
    fn normalizes_separators() {
        assert_eq!(normalize("blog\\post.html"), "blog/post.html");
        assert_eq!(normalize("//about.html"), "about.html");
    }

    #[test]
    fn rewrites_trailing_star_only() {
        assert_eq!(rewrite("/blog/*"), "blog/**");
        assert_eq!(rewrite("/blog/**"), "blog/**");
        assert_eq!(rewrite("/*.xml"), "*.xml");
        assert_eq!(rewrite("/*"), "**");
        assert_eq!(rewrite("/"), "");
    }

    #[test]
    fn rejects_empty_pattern() {
        assert!(matches!(
            GlobPattern::new(" "),
            Err(ResolveError::InvalidPattern { .. })
        ));
        assert!(matches!(
            GlobPattern::new("/"),
            Err(ResolveError::InvalidPattern { .. })
        ));
    }
}
