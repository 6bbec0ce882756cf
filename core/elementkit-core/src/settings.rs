//! Framework-wide settings.
//!
//! Settings are loaded once per host environment and handed to the
//! `ComponentRegistry`. Missing or unreadable files fall back to defaults via
//! `load_settings_or_default`; `load_settings` reports the failure instead.

use std::path::Path;

use fs_err as fs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{ElementError, Result};

/// Slot names that are globally deprecated unless settings override them.
pub static DEFAULT_DEPRECATED_SLOTS: Lazy<Vec<String>> = Lazy::new(|| {
    ["body", "plain-text", "wrapper"]
        .iter()
        .map(|s| s.to_string())
        .collect()
});

pub const DEFAULT_DIAGNOSTIC_HISTORY_LIMIT: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameworkSettings {
    /// Slot names whose use produces a `deprecated` finding in every contract.
    #[serde(default = "default_deprecated_slots")]
    pub deprecated_slots: Vec<String>,

    /// Skip registration when the document holds no instance of the tag.
    #[serde(default = "default_true")]
    pub lazy_registration: bool,

    /// Maximum number of entries retained by a diagnostics channel.
    #[serde(default = "default_history_limit")]
    pub diagnostic_history_limit: usize,
}

fn default_deprecated_slots() -> Vec<String> {
    DEFAULT_DEPRECATED_SLOTS.clone()
}

fn default_true() -> bool {
    true
}

fn default_history_limit() -> usize {
    DEFAULT_DIAGNOSTIC_HISTORY_LIMIT
}

impl Default for FrameworkSettings {
    fn default() -> Self {
        Self {
            deprecated_slots: default_deprecated_slots(),
            lazy_registration: true,
            diagnostic_history_limit: DEFAULT_DIAGNOSTIC_HISTORY_LIMIT,
        }
    }
}

impl FrameworkSettings {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| ElementError::Json {
            context: "framework settings".to_string(),
            source,
        })
    }
}

/// Loads settings from a JSON file.
pub fn load_settings(path: &Path) -> Result<FrameworkSettings> {
    if !path.exists() {
        return Err(ElementError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ElementError::Io {
        context: format!("reading settings {}", path.display()),
        source,
    })?;
    FrameworkSettings::from_json_str(&content)
}

/// Loads settings, returning defaults if the file is absent or malformed.
pub fn load_settings_or_default(path: Option<&Path>) -> FrameworkSettings {
    let Some(path) = path else {
        return FrameworkSettings::default();
    };
    match load_settings(path) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Falling back to default settings");
            FrameworkSettings::default()
        }
    }
}
