//! Pure operations over statement markup.
//!
//! None of these functions keep state: each takes the canonical markup and
//! either derives a view from it or returns a rewritten copy. Rewrites touch
//! only the bytes of the targeted element.

use super::image::{size_digits_span, ImageDescriptor, SizeProperty};
use super::tokenizer::{tokenize, Token, TokenKind};
use std::ops::Range;

/// Derive the image descriptors of a statement, in document order.
pub fn extract_images(markup: &str) -> Vec<ImageDescriptor> {
    tokenize(markup)
        .iter()
        .filter_map(Token::image)
        .map(ImageDescriptor::from_tag)
        .collect()
}

/// Position in `tokens` of the image with document-order `index`.
fn image_token_position(tokens: &[Token], index: usize) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.image().is_some())
        .nth(index)
        .map(|(pos, _)| pos)
}

/// Rewrite the size of the image at `index`.
///
/// An out-of-range index returns the markup unchanged, as does a request for
/// the size the image already reports. Existing declarations keep their
/// position and spacing; only their digits change.
pub fn set_image_size(markup: &str, index: usize, width: u32, height: u32) -> String {
    let tokens = tokenize(markup);
    let Some(pos) = image_token_position(&tokens, index) else {
        return markup.to_string();
    };
    let token = &tokens[pos];
    let Some(tag) = token.image() else {
        return markup.to_string();
    };

    let current = ImageDescriptor::from_tag(tag);
    if current.width == width && current.height == height {
        return markup.to_string();
    }

    let style = tag.attribute("style");
    let (range, replacement) = match style {
        Some(attr) if attr.quoted => {
            // Quoted values are replaced in place
            let span = attr.value_span.clone().unwrap_or(attr.span.end..attr.span.end);
            let rewritten = rewrite_style(&markup[span.clone()], width, height);
            (span, rewritten)
        }
        Some(attr) => {
            let raw = attr
                .value_span
                .clone()
                .map(|span| &markup[span])
                .unwrap_or("");
            let rewritten = rewrite_style(raw, width, height);
            (attr.span.clone(), format!(r#"style="{}""#, rewritten))
        }
        None => {
            let at = token.span.start + "<img".len();
            (
                at..at,
                format!(r#" style="width: {}px; height: {}px;""#, width, height),
            )
        }
    };

    splice(markup, range, &replacement)
}

/// Replace the pixel values of the width/height declarations in a style
/// value, appending any declaration that is missing.
fn rewrite_style(style: &str, width: u32, height: u32) -> String {
    let mut replacements: Vec<(Range<usize>, u32)> = Vec::new();
    let mut missing = Vec::new();

    for (property, value) in [(SizeProperty::Width, width), (SizeProperty::Height, height)] {
        match size_digits_span(style, property) {
            Some(span) => replacements.push((span, value)),
            None => missing.push(format!("{}: {}px;", property.name(), value)),
        }
    }

    // Apply from the back so earlier ranges stay valid
    replacements.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut out = style.to_string();
    for (span, value) in replacements {
        out.replace_range(span, &value.to_string());
    }

    if missing.is_empty() {
        return out;
    }

    let mut result = out.trim_end().to_string();
    if !result.is_empty() {
        if !result.ends_with(';') {
            result.push(';');
        }
        result.push(' ');
    }
    result.push_str(&missing.join(" "));
    result
}

/// Remove the image at `index`, together with at most one line break
/// directly before it and one directly after it.
///
/// An out-of-range index returns the markup unchanged.
pub fn delete_image(markup: &str, index: usize) -> String {
    let tokens = tokenize(markup);
    let Some(pos) = image_token_position(&tokens, index) else {
        return markup.to_string();
    };

    let mut range = tokens[pos].span.clone();
    if pos > 0 && tokens[pos - 1].is_line_break() {
        range.start = tokens[pos - 1].span.start;
    }
    if let Some(next) = tokens.get(pos + 1) {
        if next.is_line_break() {
            range.end = next.span.end;
        }
    }

    splice(markup, range, "")
}

/// Plain-text view of a statement: images removed, line breaks as `\n`.
///
/// Emphasis tags stay visible.
pub fn strip_images(markup: &str) -> String {
    let mut plain = String::with_capacity(markup.len());
    for token in tokenize(markup) {
        match token.kind {
            TokenKind::Image(_) => {}
            TokenKind::LineBreak => plain.push('\n'),
            _ => plain.push_str(&markup[token.span]),
        }
    }
    plain
}

fn splice(markup: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(markup.len() + replacement.len());
    out.push_str(&markup[..range.start]);
    out.push_str(replacement);
    out.push_str(&markup[range.end..]);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Plain-Text Projection
// ─────────────────────────────────────────────────────────────────────────────

/// Which markup offset to pick when several map to the same plain offset
/// (images are invisible in the plain view).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Earliest offset, before any images at that point
    Before,
    /// Latest offset, after any images at that point
    After,
}

#[derive(Debug, Clone)]
struct Segment {
    /// First plain-text character covered
    plain_start: usize,
    /// Characters contributed to the plain view (0 for images)
    plain_len: usize,
    markup: Range<usize>,
    line_break: bool,
}

/// Maps character offsets of the plain-text view back to byte offsets of
/// the markup it was derived from.
#[derive(Debug, Clone)]
pub struct PlainTextProjection<'a> {
    markup: &'a str,
    segments: Vec<Segment>,
}

impl<'a> PlainTextProjection<'a> {
    pub fn new(markup: &'a str) -> Self {
        let mut segments = Vec::new();
        let mut plain_pos = 0;
        for token in tokenize(markup) {
            let (plain_len, line_break) = match token.kind {
                TokenKind::Image(_) => (0, false),
                TokenKind::LineBreak => (1, true),
                _ => (markup[token.span.clone()].chars().count(), false),
            };
            segments.push(Segment {
                plain_start: plain_pos,
                plain_len,
                markup: token.span,
                line_break,
            });
            plain_pos += plain_len;
        }
        Self { markup, segments }
    }

    /// Markup byte offset for plain character offset `char_offset`.
    ///
    /// Offsets past the end map to the end of the markup.
    pub fn to_markup_offset(&self, char_offset: usize, bias: Bias) -> usize {
        let mut found = None;
        for segment in &self.segments {
            let end = segment.plain_start + segment.plain_len;
            if char_offset < segment.plain_start {
                break;
            }
            if char_offset > end {
                continue;
            }
            let offset = self.offset_within(segment, char_offset - segment.plain_start, bias);
            match bias {
                Bias::Before => return offset,
                Bias::After => found = Some(offset),
            }
        }
        found.unwrap_or(self.markup.len())
    }

    fn offset_within(&self, segment: &Segment, chars_in: usize, bias: Bias) -> usize {
        if segment.plain_len == 0 {
            return match bias {
                Bias::Before => segment.markup.start,
                Bias::After => segment.markup.end,
            };
        }
        if segment.line_break {
            return if chars_in == 0 {
                segment.markup.start
            } else {
                segment.markup.end
            };
        }
        let text = &self.markup[segment.markup.clone()];
        segment.markup.start + crate::string_utils::char_index_to_byte_index(text, chars_in)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
