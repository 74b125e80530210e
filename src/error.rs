//! Centralized error handling for hybridmark
//!
//! This module provides a unified error type that covers the failure cases of
//! the engine: asset loading, configuration parsing, clipboard access, widget
//! rendering and stale document ranges.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the engine.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Asset Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// A referenced asset does not exist
    AssetNotFound { path: PathBuf },

    /// A referenced asset exists but could not be read
    AssetRead { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Editor Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Clipboard could not be accessed or written
    Clipboard(String),

    /// A widget failed to render
    Render { widget: &'static str, message: String },

    /// An edit referenced a range outside the current document
    InvalidRange { from: usize, to: usize, len: usize },

    /// Generic application error with a message
    Application(String),
}

impl Error {
    /// Build an asset error from an I/O failure, classifying `NotFound`.
    pub fn asset(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        if err.kind() == io::ErrorKind::NotFound {
            Error::AssetNotFound { path }
        } else {
            Error::AssetRead { path, source: err }
        }
    }

    /// Build a render error for the named widget.
    pub fn render(widget: &'static str, message: impl Into<String>) -> Self {
        Error::Render {
            widget,
            message: message.into(),
        }
    }
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Asset Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::AssetNotFound { path } => {
                write!(f, "Asset not found: '{}'", path.display())
            }
            Error::AssetRead { path, source } => {
                write!(f, "Failed to read asset '{}': {}", path.display(), source)
            }

            // Configuration Errors
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }

            // Editor Errors
            Error::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
            Error::Render { widget, message } => {
                write!(f, "Failed to render {} widget: {}", widget, message)
            }
            Error::InvalidRange { from, to, len } => {
                write!(
                    f,
                    "Range {}..{} is outside the document (length {})",
                    from, to, len
                )
            }

            // Application Errors
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::AssetRead { source, .. } => Some(source),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::AssetNotFound { .. }
            | Error::Clipboard(_)
            | Error::Render { .. }
            | Error::InvalidRange { .. }
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_creation() {
        let io_err = io::Error::new(io::ErrorKind::Other, "test error");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_asset_error_classifies_not_found() {
        let err = Error::asset(
            "/img/missing.png",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, Error::AssetNotFound { .. }));

        let err = Error::asset(
            "/img/locked.png",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, Error::AssetRead { .. }));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_result: std::result::Result<String, _> = serde_json::from_str("invalid json");
        let err = Error::from(json_result.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_display_asset_not_found() {
        let err = Error::AssetNotFound {
            path: PathBuf::from("/docs/a.png"),
        };
        assert_eq!(err.to_string(), "Asset not found: '/docs/a.png'");
    }

    #[test]
    fn test_display_render_error() {
        let err = Error::render("table", "bad cell");
        let msg = format!("{}", err);
        assert!(msg.contains("table"));
        assert!(msg.contains("bad cell"));
    }

    #[test]
    fn test_display_invalid_range() {
        let err = Error::InvalidRange {
            from: 4,
            to: 9,
            len: 5,
        };
        assert!(err.to_string().contains("4..9"));
    }

    #[test]
    fn test_error_source_read() {
        use std::error::Error as StdError;
        let err = Error::AssetRead {
            path: PathBuf::from("x"),
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source_none_for_simple_variants() {
        use std::error::Error as StdError;
        assert!(Error::Application("test".to_string()).source().is_none());
        assert!(Error::Clipboard("x".to_string()).source().is_none());
    }

    #[test]
    fn test_unwrap_or_warn_default_ok() {
        let result: super::Result<i32> = Ok(42);
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 42);
    }

    #[test]
    fn test_unwrap_or_warn_default_err() {
        let result: super::Result<i32> = Err(Error::Application("test".to_string()));
        assert_eq!(result.unwrap_or_warn_default(0, "test context"), 0);
    }
}
