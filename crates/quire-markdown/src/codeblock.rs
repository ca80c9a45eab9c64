//! Fenced code block wrapping for the external highlighter.

/// Language named by a code fence info string, if any.
///
/// Supports `rust`, `rust,ignore` and `{.rust}` styles.
pub fn language_from_info(info: &str) -> Option<&str> {
    let first = info.split_whitespace().next()?;
    let first = first.split(',').next().unwrap_or(first);
    let lang = first.trim_start_matches('{').trim_start_matches('.').trim_end_matches('}');

    if lang.is_empty() {
        None
    } else {
        Some(lang)
    }
}

/// Wrap code in the markup the highlighter styles with `css_class`.
pub fn wrap_code(css_class: &str, language: Option<&str>, source: &str) -> String {
    let code_attr = match language {
        Some(lang) => format!(r#" class="language-{}""#, escape_html(&lang.to_lowercase())),
        None => String::new(),
    };

    format!(
        "<pre class=\"{}\"><code{}>{}</code></pre>\n",
        escape_html(css_class),
        code_attr,
        escape_html(source)
    )
}

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
