//! Site rule set for quire.
//!
//! This crate holds the declarative configuration a site is built from:
//! markdown options, the blog extension, per-page layout rules and the
//! build-mode toggles. Settings are loaded once at startup, validated, and
//! installed in a process-wide registry that is read-only afterwards.

pub mod blog;
pub mod build;
pub mod markdown;
pub mod page;
pub mod registry;
pub mod settings;

pub use blog::{placeholders, BlogConfig};
pub use build::{BuildMode, BuildModeFlags, JsCompressor};
pub use markdown::{AutoprefixerConfig, MarkdownConfig, MarkdownEngine};
pub use page::{Layout, PageRule};
pub use settings::{ConfigError, Settings, SettingsBuilder, STARTER_CONFIG};
