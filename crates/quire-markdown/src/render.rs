//! Markdown rendering driven by [`MarkdownConfig`].

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use quire_config::MarkdownConfig;

use crate::codeblock::{language_from_info, wrap_code};
use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A rendered markdown document.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Rendered HTML body
    pub html: String,
}

/// Parser extensions for the configured input dialect.
pub fn markdown_options(config: &MarkdownConfig) -> Options {
    match config.input_dialect.to_lowercase().as_str() {
        "gfm" => {
            Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
        }
        "kramdown" => {
            Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_HEADING_ATTRIBUTES
                | Options::ENABLE_SMART_PUNCTUATION
        }
        _ => Options::empty(),
    }
}

/// Render a markdown source, frontmatter included.
pub fn render(config: &MarkdownConfig, source: &str) -> Result<Rendered, FrontmatterError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    Ok(Rendered {
        frontmatter,
        html: render_body(config, content),
    })
}

/// Render markdown without frontmatter handling.
pub fn render_body(config: &MarkdownConfig, content: &str) -> String {
    let css_class = config.css_class();
    let mut events = Vec::new();
    let mut code: Option<(Option<String>, String)> = None; // (language, source)

    for event in Parser::new_ext(content, markdown_options(config)) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match &kind {
                    CodeBlockKind::Fenced(info) => language_from_info(info).map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                code = Some((language, String::new()));
            }

            Event::Text(text) if code.is_some() => {
                if let Some((_, source)) = code.as_mut() {
                    source.push_str(&text);
                }
            }

            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, source)) = code.take() {
                    events.push(Event::Html(
                        wrap_code(css_class, language.as_deref(), &source).into(),
                    ));
                }
            }

            other => events.push(other),
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gfm() -> MarkdownConfig {
        MarkdownConfig::default()
    }

    #[test]
    fn renders_gfm_extensions() {
        let html = render_body(&gfm(), "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n");

        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn commonmark_dialect_disables_extensions() {
        let config = MarkdownConfig {
            input_dialect: "commonmark".to_string(),
            ..Default::default()
        };

        let html = render_body(&config, "~~kept~~\n");

        assert!(!html.contains("<del>"));
    }

    #[test]
    fn wraps_code_blocks_with_highlighter_class() {
        let mut config = gfm();
        config
            .highlighter_options
            .insert("css_class".to_string(), "code-hl".to_string());

        let html = render_body(&config, "```rust\nfn main() {}\n```\n");

        assert!(html.contains(r#"<pre class="code-hl"><code class="language-rust">fn main() {}"#));
    }

    #[test]
    fn renders_document_with_frontmatter() {
        let source = "---\ntitle: Post\ntags: [a]\n---\n# Heading\n\nBody text.\n";

        let rendered = render(&gfm(), source).unwrap();

        assert_eq!(
            rendered.frontmatter.and_then(|f| f.title),
            Some("Post".to_string())
        );
        assert!(rendered.html.contains("<h1>Heading</h1>"));
        assert!(rendered.html.contains("<p>Body text.</p>"));
    }

    #[test]
    fn propagates_frontmatter_errors() {
        let result = render(&gfm(), "---\ntitle: x\n");
        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }
}
