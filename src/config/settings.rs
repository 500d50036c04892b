//! User settings and preferences for QBank
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Statement Reconciliation
// ─────────────────────────────────────────────────────────────────────────────

/// How edits made in the plain-text view are written back into the markup.
///
/// - `Replace`: the edited text becomes the whole statement. Images present
///   in the previous markup are dropped.
/// - `PreserveImages`: only the changed span of text is spliced into the
///   markup; image elements outside that span are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    #[default]
    Replace,
    PreserveImages,
}

impl Reconciliation {
    /// Get a display label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            Reconciliation::Replace => "Replace statement",
            Reconciliation::PreserveImages => "Keep images",
        }
    }

    /// Get all available modes.
    pub fn all() -> &'static [Reconciliation] {
        &[Reconciliation::Replace, Reconciliation::PreserveImages]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 760.0,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Statement Editor
    // ─────────────────────────────────────────────────────────────────────────
    /// How plain-text edits are reconciled with embedded images
    pub reconciliation: Reconciliation,

    /// Largest accepted image upload, in bytes
    pub max_upload_bytes: u64,

    /// Font size for the statement editor (in points)
    pub font_size: f32,

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────
    /// Directory the image picker opened last
    pub last_image_directory: Option<PathBuf>,

    /// Name recorded as the author of new questions
    pub author_name: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Window State
    // ─────────────────────────────────────────────────────────────────────────
    /// Window size
    pub window_size: WindowSize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reconciliation: Reconciliation::default(),
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
            font_size: 14.0,

            last_image_directory: None,
            author_name: String::new(),

            window_size: WindowSize::default(),
        }
    }
}

impl Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Default upload limit (5 MiB).
    pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
    /// Largest upload limit a config file may request (50 MiB).
    pub const MAX_UPLOAD_BYTES_CEILING: u64 = 50 * 1024 * 1024;
    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 72.0;
    /// Minimum window dimension.
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    /// Maximum window dimension.
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);

        // A zero limit would reject every upload
        if self.max_upload_bytes == 0 {
            self.max_upload_bytes = Self::DEFAULT_MAX_UPLOAD_BYTES;
        } else if self.max_upload_bytes > Self::MAX_UPLOAD_BYTES_CEILING {
            self.max_upload_bytes = Self::MAX_UPLOAD_BYTES_CEILING;
        }

        self.author_name = self.author_name.trim().to_string();
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.reconciliation, Reconciliation::Replace);
        assert_eq!(settings.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(settings.font_size, 14.0);
        assert!(settings.last_image_directory.is_none());
        assert_eq!(settings.window_size.width, 960.0);
    }

    #[test]
    fn test_reconciliation_serialization() {
        assert_eq!(
            serde_json::to_string(&Reconciliation::Replace).unwrap(),
            "\"replace\""
        );
        assert_eq!(
            serde_json::to_string(&Reconciliation::PreserveImages).unwrap(),
            "\"preserve_images\""
        );
        assert_eq!(
            serde_json::from_str::<Reconciliation>("\"preserve_images\"").unwrap(),
            Reconciliation::PreserveImages
        );
    }

    #[test]
    fn test_reconciliation_labels() {
        assert_eq!(Reconciliation::all().len(), 2);
        for mode in Reconciliation::all() {
            assert!(!mode.label().is_empty());
        }
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let original = Settings {
            reconciliation: Reconciliation::PreserveImages,
            author_name: "Ana".to_string(),
            last_image_directory: Some(PathBuf::from("/home/ana/figures")),
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&original).unwrap();
        let deserialized: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_settings_deserialize_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"reconciliation": "replace", "theme": "dark"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.reconciliation, Reconciliation::Replace);
    }

    #[test]
    fn test_sanitize_upload_limit() {
        let mut settings = Settings::default();
        settings.max_upload_bytes = 0;
        settings.sanitize();
        assert_eq!(settings.max_upload_bytes, Settings::DEFAULT_MAX_UPLOAD_BYTES);

        settings.max_upload_bytes = u64::MAX;
        settings.sanitize();
        assert_eq!(settings.max_upload_bytes, Settings::MAX_UPLOAD_BYTES_CEILING);
    }

    #[test]
    fn test_sanitize_font_and_window() {
        let json = r#"{"font_size": 4.0, "window_size": {"width": 50.0, "height": 99999.0}}"#;
        let settings = Settings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.font_size, Settings::MIN_FONT_SIZE);
        assert_eq!(settings.window_size.width, Settings::MIN_WINDOW_SIZE);
        assert_eq!(settings.window_size.height, Settings::MAX_WINDOW_SIZE);
    }

    #[test]
    fn test_sanitize_trims_author() {
        let mut settings = Settings::default();
        settings.author_name = "  Ana  ".to_string();
        settings.sanitize();
        assert_eq!(settings.author_name, "Ana");
    }
}
