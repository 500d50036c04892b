//! UTF-8 Safe String Utilities
//!
//! Selections coming from the text area are character indices, while the
//! markup is edited by byte offset.

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte() {
        let s = "Olá, 世界";
        assert_eq!(char_index_to_byte_index(s, 0), 0);
        assert_eq!(char_index_to_byte_index(s, 3), 4);
        assert_eq!(char_index_to_byte_index(s, 6), 9);
        assert_eq!(char_index_to_byte_index(s, 100), s.len());
    }

    #[test]
    fn test_char_to_byte_ascii() {
        assert_eq!(char_index_to_byte_index("Hello", 2), 2);
        assert_eq!(char_index_to_byte_index("", 0), 0);
    }
}
