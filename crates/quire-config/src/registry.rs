//! Process-wide settings, written once before any resolution happens.

use std::sync::OnceLock;

use crate::settings::{ConfigError, Settings};

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Install the settings for the rest of the process.
///
/// Fails with [`ConfigError::AlreadyInstalled`] on every call after the first.
pub fn install(settings: Settings) -> Result<&'static Settings, ConfigError> {
    let mut fresh = false;
    let installed = SETTINGS.get_or_init(|| {
        fresh = true;
        settings
    });

    if fresh {
        tracing::debug!("Installed site settings");
        Ok(installed)
    } else {
        Err(ConfigError::AlreadyInstalled)
    }
}
