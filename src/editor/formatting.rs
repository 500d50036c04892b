//! Statement Formatting Operations
//!
//! Wraps a selection of the plain-text view in emphasis tags. Selections are
//! character indices, as reported by the text area.
//!
//! # Usage
//! ```ignore
//! use crate::editor::formatting::wrap_selection;
//! use crate::markup::Emphasis;
//!
//! let result = wrap_selection("Hello world", 0, 5, Emphasis::Bold);
//! assert_eq!(result.text, "<strong>Hello</strong> world");
//! ```

use crate::markup::Emphasis;
use crate::string_utils::char_index_to_byte_index;

// ─────────────────────────────────────────────────────────────────────────────
// Command Metadata
// ─────────────────────────────────────────────────────────────────────────────

impl Emphasis {
    /// All emphasis kinds, in toolbar order.
    pub fn all() -> &'static [Emphasis] {
        &[Emphasis::Bold, Emphasis::Italic, Emphasis::Underline]
    }

    /// Get the keyboard shortcut label for this command.
    pub fn shortcut_label(&self) -> &'static str {
        match self {
            Self::Bold => "Ctrl+B",
            Self::Italic => "Ctrl+I",
            Self::Underline => "Ctrl+U",
        }
    }

    /// Get the icon for this command (for toolbar).
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Bold => "B",
            Self::Italic => "I",
            Self::Underline => "U",
        }
    }

    /// Get the tooltip text for this command.
    pub fn tooltip(&self) -> String {
        let name = match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Underline => "Underline",
        };
        format!("{} ({})", name, self.shortcut_label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Format Result
// ─────────────────────────────────────────────────────────────────────────────

/// Result of applying a formatting command to the plain-text view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    /// The plain text after formatting
    pub text: String,
    /// Character range covering the wrapped text, tags included
    pub selection: Option<(usize, usize)>,
    /// Whether anything was wrapped
    pub applied: bool,
}

impl FormatResult {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            selection: None,
            applied: false,
        }
    }
}

/// Wrap the characters `start..end` of `text` in the tags of `kind`.
///
/// Indices may come in either order and are clamped to the text. An empty
/// selection leaves the text untouched.
pub fn wrap_selection(text: &str, start: usize, end: usize, kind: Emphasis) -> FormatResult {
    let char_count = text.chars().count();
    let (start, end) = if start > end {
        (end, start)
    } else {
        (start, end)
    };
    let (start, end) = (start.min(char_count), end.min(char_count));

    if start == end {
        return FormatResult::unchanged(text);
    }

    let byte_start = char_index_to_byte_index(text, start);
    let byte_end = char_index_to_byte_index(text, end);
    let selected = &text[byte_start..byte_end];

    let new_text = format!(
        "{}{}{}{}{}",
        &text[..byte_start],
        kind.open_tag(),
        selected,
        kind.close_tag(),
        &text[byte_end..]
    );
    let wrapped_len =
        kind.open_tag().chars().count() + (end - start) + kind.close_tag().chars().count();

    FormatResult {
        text: new_text,
        selection: Some((start, start + wrapped_len)),
        applied: true,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_with_selection() {
        let result = wrap_selection("Hello world", 0, 5, Emphasis::Bold);
        assert_eq!(result.text, "<strong>Hello</strong> world");
        assert_eq!(result.selection, Some((0, 22)));
        assert!(result.applied);
    }

    #[test]
    fn test_italic_and_underline() {
        assert_eq!(
            wrap_selection("Hello world", 6, 11, Emphasis::Italic).text,
            "Hello <em>world</em>"
        );
        assert_eq!(
            wrap_selection("Hello world", 6, 11, Emphasis::Underline).text,
            "Hello <u>world</u>"
        );
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let result = wrap_selection("Hello", 3, 3, Emphasis::Bold);
        assert_eq!(result.text, "Hello");
        assert!(!result.applied);
        assert!(result.selection.is_none());
    }

    #[test]
    fn test_reversed_selection() {
        let result = wrap_selection("Hello world", 5, 0, Emphasis::Bold);
        assert_eq!(result.text, "<strong>Hello</strong> world");
    }

    #[test]
    fn test_selection_clamped_to_text() {
        let result = wrap_selection("abc", 1, 99, Emphasis::Underline);
        assert_eq!(result.text, "a<u>bc</u>");
        assert_eq!(wrap_selection("abc", 50, 99, Emphasis::Bold).text, "abc");
    }

    #[test]
    fn test_multibyte_selection() {
        let result = wrap_selection("Qual é a função?", 9, 15, Emphasis::Bold);
        assert_eq!(result.text, "Qual é a <strong>função</strong>?");
    }

    #[test]
    fn test_command_metadata() {
        assert_eq!(Emphasis::Bold.shortcut_label(), "Ctrl+B");
        assert_eq!(Emphasis::all().len(), 3);
        let tooltip = Emphasis::Underline.tooltip();
        assert!(tooltip.contains("Underline"));
        assert!(tooltip.contains("Ctrl+U"));
    }
}
