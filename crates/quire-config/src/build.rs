//! Build modes and production-only toggles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;

/// Which kind of output the site is being generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Fast, unminified output for local preview
    #[default]
    Dev,
    /// Production output with minification
    Build,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" | "server" => Ok(Self::Dev),
            "build" | "production" => Ok(Self::Build),
            other => Err(ConfigError::UnknownBuildMode(other.to_string())),
        }
    }
}

/// JavaScript compressor used when JS minification is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsCompressor {
    #[default]
    None,
    Terser,
    Uglifier,
}

/// Minification toggles. Only honoured in [`BuildMode::Build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildModeFlags {
    pub minify_css: bool,
    pub minify_html: bool,
    #[serde(alias = "minify_javascript")]
    pub minify_js: bool,
    pub js_compressor: JsCompressor,
}
