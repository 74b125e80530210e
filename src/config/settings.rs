//! Editor configuration consumed by the hybrid engine
//!
//! This module defines the `EditorConfig` struct that the host hands to the
//! engine, with serde support for JSON. Persisting it is the host's job.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, ResultExt};

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    /// Resolve to a concrete dark/light choice.
    ///
    /// `System` defers to the host's current appearance.
    pub fn is_dark(&self, system_prefers_dark: bool) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::System => system_prefers_dark,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration the engine reads but never owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory of the open file, used to resolve relative asset paths
    pub base_dir: PathBuf,
    /// Disable the hybrid pipeline and behave as an undecorated text surface
    pub plain_text_mode: bool,
    /// Color theme passed explicitly to every render call
    pub theme: Theme,
    /// Window in which a repeated identical table operation is dropped
    pub table_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::new(),
            plain_text_mode: false,
            theme: Theme::default(),
            table_debounce_ms: Self::DEFAULT_TABLE_DEBOUNCE_MS,
        }
    }
}

impl EditorConfig {
    pub const DEFAULT_TABLE_DEBOUNCE_MS: u64 = 100;
    pub const MAX_TABLE_DEBOUNCE_MS: u64 = 1000;

    /// Build a configuration for a document opened from `path`.
    ///
    /// The base directory is the file's parent; a bare file name yields an
    /// empty base directory.
    pub fn for_document(path: impl AsRef<Path>) -> Self {
        let base_dir = path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            base_dir,
            ..Self::default()
        }
    }

    /// Base directory as the string form used for path resolution.
    pub fn base_dir_str(&self) -> String {
        self.base_dir.to_string_lossy().into_owned()
    }

    /// Sanitize values to be within valid ranges.
    pub fn sanitize(&mut self) {
        self.table_debounce_ms = self.table_debounce_ms.min(Self::MAX_TABLE_DEBOUNCE_MS);
    }

    /// Deserialize from JSON and sanitize.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    /// Like `from_json_sanitized`, falling back to defaults on invalid input.
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json_sanitized(json)
            .map_err(Error::from)
            .unwrap_or_warn_default(Self::default(), "Invalid editor configuration")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
