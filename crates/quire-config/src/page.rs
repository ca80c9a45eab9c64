//! Per-page layout rules.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Layout override carried by a page rule.
///
/// In TOML a named layout is a string and `false` disables the layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Wrap the page in the named layout
    Named(String),
    /// Render the page without any layout
    Disabled,
}

impl Layout {
    /// Create a named layout.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Layout name, or `None` when disabled.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Disabled => None,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(Self::Disabled),
            Raw::Flag(true) => Err(D::Error::custom(
                "layout = true is not a layout; use a layout name or false",
            )),
            Raw::Name(name) if name.trim().is_empty() => {
                Err(D::Error::custom("layout name must not be empty"))
            }
            Raw::Name(name) => Ok(Self::Named(name)),
        }
    }
}

impl Serialize for Layout {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Named(name) => serializer.serialize_str(name),
            Self::Disabled => serializer.serialize_bool(false),
        }
    }
}

/// A glob pattern paired with the layout it selects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PageRule {
    /// Glob matched against output paths
    pub pattern: String,

    /// Layout override for matching pages
    pub layout: Layout,
}

impl PageRule {
    pub fn new(pattern: impl Into<String>, layout: Layout) -> Self {
        Self {
            pattern: pattern.into(),
            layout,
        }
    }
}
