//! Statement Markup Tokenizer
//!
//! Splits a statement into the four element kinds of the dialect: text,
//! emphasis tags, line breaks and image elements. Every token carries the
//! byte range it covers, and the ranges of all tokens tile the input exactly,
//! so callers can rewrite one element without touching any other byte.
//!
//! A `<` that does not start a recognized tag is ordinary text, as is an
//! unterminated tag.

use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Emphasis Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Inline emphasis supported by the statement dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emphasis {
    /// `<strong>` (also accepts `<b>`)
    Bold,
    /// `<em>` (also accepts `<i>`)
    Italic,
    /// `<u>`
    Underline,
}

impl Emphasis {
    /// Tag written when wrapping a selection.
    pub fn open_tag(&self) -> &'static str {
        match self {
            Self::Bold => "<strong>",
            Self::Italic => "<em>",
            Self::Underline => "<u>",
        }
    }

    /// Closing counterpart of [`Emphasis::open_tag`].
    pub fn close_tag(&self) -> &'static str {
        match self {
            Self::Bold => "</strong>",
            Self::Italic => "</em>",
            Self::Underline => "</u>",
        }
    }

    fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "strong" | "b" => Some(Self::Bold),
            "em" | "i" => Some(Self::Italic),
            "u" => Some(Self::Underline),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokens
// ─────────────────────────────────────────────────────────────────────────────

/// One attribute of an image element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name
    pub name: String,
    /// Value with character references decoded
    pub value: String,
    /// Byte range of the whole `name="value"` text
    pub span: Range<usize>,
    /// Byte range of the raw value, without quotes (`None` for bare attributes)
    pub value_span: Option<Range<usize>>,
    /// Whether the value was enclosed in quotes
    pub quoted: bool,
}

/// A parsed `<img ...>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    pub attributes: Vec<Attribute>,
}

impl ImageTag {
    /// Look up an attribute by (lowercase) name. The first occurrence wins.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Value of an attribute, or `""` when absent.
    pub fn value(&self, name: &str) -> &str {
        self.attribute(name).map(|a| a.value.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    EmphasisOpen(Emphasis),
    EmphasisClose(Emphasis),
    LineBreak,
    Image(ImageTag),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn image(&self) -> Option<&ImageTag> {
        match &self.kind {
            TokenKind::Image(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn is_line_break(&self) -> bool {
        matches!(self.kind, TokenKind::LineBreak)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokenizer
// ─────────────────────────────────────────────────────────────────────────────

/// Tokenize a statement.
///
/// Adjacent text is merged into a single `Text` token.
pub fn tokenize(markup: &str) -> Vec<Token> {
    let bytes = markup.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == b'<' {
            if let Some((kind, end)) = parse_tag(markup, pos) {
                if text_start < pos {
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        span: text_start..pos,
                    });
                }
                tokens.push(Token {
                    kind,
                    span: pos..end,
                });
                pos = end;
                text_start = end;
                continue;
            }
        }
        pos += 1;
    }

    if text_start < markup.len() {
        tokens.push(Token {
            kind: TokenKind::Text,
            span: text_start..markup.len(),
        });
    }

    tokens
}

/// Try to parse a recognized tag starting at `start` (which holds `<`).
///
/// Returns the token kind and the byte offset just past the closing `>`.
fn parse_tag(markup: &str, start: usize) -> Option<(TokenKind, usize)> {
    let bytes = markup.as_bytes();
    let mut i = start + 1;

    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    // Name must end at whitespace, '/', '>' or end of input
    if let Some(&next) = bytes.get(i) {
        if !(next.is_ascii_whitespace() || next == b'/' || next == b'>') {
            return None;
        }
    }
    let name = markup[name_start..i].to_ascii_lowercase();

    if closing {
        let emphasis = Emphasis::from_tag_name(&name)?;
        let i = skip_whitespace(bytes, i);
        return (bytes.get(i) == Some(&b'>'))
            .then(|| (TokenKind::EmphasisClose(emphasis), i + 1));
    }

    if name == "br" {
        let (_, end) = parse_attributes(markup, i)?;
        return Some((TokenKind::LineBreak, end));
    }

    if name == "img" {
        let (attributes, end) = parse_attributes(markup, i)?;
        return Some((TokenKind::Image(ImageTag { attributes }), end));
    }

    let emphasis = Emphasis::from_tag_name(&name)?;
    let (_, end) = parse_attributes(markup, i)?;
    Some((TokenKind::EmphasisOpen(emphasis), end))
}

/// Parse attributes up to and including the closing `>`.
///
/// A `>` inside a quoted value does not end the tag. Returns `None` when the
/// tag is never closed.
fn parse_attributes(markup: &str, mut i: usize) -> Option<(Vec<Attribute>, usize)> {
    let bytes = markup.as_bytes();
    let mut attributes = Vec::new();

    loop {
        i = skip_whitespace(bytes, i);
        let &byte = bytes.get(i)?;
        match byte {
            b'>' => return Some((attributes, i + 1)),
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == attr_start {
            // Stray '=' with no name
            i += 1;
            continue;
        }
        let name = markup[attr_start..i].to_ascii_lowercase();

        let after_name = skip_whitespace(bytes, i);
        if bytes.get(after_name) != Some(&b'=') {
            attributes.push(Attribute {
                name,
                value: String::new(),
                span: attr_start..i,
                value_span: None,
                quoted: false,
            });
            continue;
        }

        i = skip_whitespace(bytes, after_name + 1);
        let &first = bytes.get(i)?;
        let (value_span, quoted) = if first == b'"' || first == b'\'' {
            let value_start = i + 1;
            let len = markup[value_start..].find(first as char)?;
            i = value_start + len + 1;
            (value_start..value_start + len, true)
        } else {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                i += 1;
            }
            (value_start..i, false)
        };

        attributes.push(Attribute {
            name,
            value: decode_entities(&markup[value_span.clone()]),
            span: attr_start..i,
            value_span: Some(value_span),
            quoted,
        });
    }
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

// ─────────────────────────────────────────────────────────────────────────────
// Character References
// ─────────────────────────────────────────────────────────────────────────────

/// Decode the character references the serializer produces.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
