//! Markdown front end for quire.
//!
//! Extracts article frontmatter and renders markdown with the options chosen in
//! the site's `[markdown]` section. Highlighting itself is left to the
//! configured highlighter; this crate only emits the wrapper it expects.

pub mod codeblock;
pub mod frontmatter;
pub mod render;

pub use frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
pub use render::{markdown_options, render, render_body, Rendered};
