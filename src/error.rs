//! Centralized error handling for QBank
//!
//! This module provides a unified error type that covers all error scenarios
//! in the application: user-facing validation, file I/O and configuration.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the application.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Errors (shown to the user, no state change)
    // ─────────────────────────────────────────────────────────────────────────
    /// Selected file is not an image
    UnsupportedImageType { mime: String },

    /// Selected image exceeds the upload limit
    ImageTooLarge { size: u64, max: u64 },

    /// Image URL was empty after trimming
    EmptyImageUrl,

    /// Question form is missing required fields
    IncompleteQuestion { missing: Vec<&'static str> },

    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to read a selected file
    FileRead { path: PathBuf, source: io::Error },

    /// Opened file is not a stored question
    QuestionParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic application error with a message
    Application(String),
}

impl Error {
    /// Whether this error is a validation failure meant to be shown to the
    /// author rather than logged as a fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedImageType { .. }
                | Error::ImageTooLarge { .. }
                | Error::EmptyImageUrl
                | Error::IncompleteQuestion { .. }
        )
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
            // Validation Errors
            Error::UnsupportedImageType { mime } => {
                write!(f, "Please select an image file (got '{}')", mime)
            }
            Error::ImageTooLarge { size, max } => {
                write!(
                    f,
                    "The image must be at most {} MB ({} bytes selected)",
                    max / (1024 * 1024),
                    size
                )
            }
            Error::EmptyImageUrl => write!(f, "Please enter an image URL"),
            Error::IncompleteQuestion { missing } => {
                write!(f, "Please fill in all required fields: {}", missing.join(", "))
            }

            // File I/O Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::QuestionParse { path, source } => {
                write!(f, "'{}' is not a question file: {}", path.display(), source)
            }

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
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
            Error::FileRead { source, .. } => Some(source),
            Error::QuestionParse { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::UnsupportedImageType { .. }
            | Error::ImageTooLarge { .. }
            | Error::EmptyImageUrl
            | Error::IncompleteQuestion { .. }
            | Error::ConfigDirNotFound
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
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test error");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_file_read_error() {
        let path = PathBuf::from("/tmp/figure.png");
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = Error::FileRead {
            path: path.clone(),
            source: io_err,
        };
        assert!(matches!(&err, Error::FileRead { path: p, .. } if *p == path));
        assert!(err.to_string().contains("figure.png"));
    }

    #[test]
    fn test_question_parse_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::QuestionParse {
            path: PathBuf::from("/tmp/questao.json"),
            source,
        };
        assert!(!err.is_validation());
        assert!(err.to_string().contains("questao.json"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_classification() {
        assert!(Error::EmptyImageUrl.is_validation());
        assert!(Error::UnsupportedImageType {
            mime: "text/plain".to_string()
        }
        .is_validation());
        assert!(Error::ImageTooLarge { size: 10, max: 5 }.is_validation());
        assert!(Error::IncompleteQuestion {
            missing: vec!["subject"]
        }
        .is_validation());
        assert!(!Error::ConfigDirNotFound.is_validation());
        assert!(!Error::Application("x".to_string()).is_validation());
    }

    #[test]
    fn test_display_image_too_large() {
        let err = Error::ImageTooLarge {
            size: 6 * 1024 * 1024,
            max: 5 * 1024 * 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("5 MB"));
        assert!(msg.contains("6291456"));
    }

    #[test]
    fn test_display_incomplete_question() {
        let err = Error::IncompleteQuestion {
            missing: vec!["subject", "statement"],
        };
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields: subject, statement"
        );
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_result: std::result::Result<String, _> = serde_json::from_str("invalid json");
        let err = Error::from(json_result.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_display_config_dir_not_found() {
        let err = Error::ConfigDirNotFound;
        assert_eq!(err.to_string(), "Configuration directory not found");
    }

    #[test]
    fn test_error_source() {
        use std::error::Error as StdError;
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "not found"));
        assert!(err.source().is_some());
        assert!(Error::EmptyImageUrl.source().is_none());
    }

    #[test]
    fn test_unwrap_or_warn_default() {
        let ok: super::Result<i32> = Ok(42);
        assert_eq!(ok.unwrap_or_warn_default(0, "test context"), 42);

        let err: super::Result<i32> = Err(Error::Application("test".to_string()));
        assert_eq!(err.unwrap_or_warn_default(7, "test context"), 7);
    }
}
