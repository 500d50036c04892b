//! Image descriptors and the image element serializer.

use super::tokenizer::{escape_attribute, ImageTag};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Width used when an image element carries no usable `width` declaration.
pub const DEFAULT_IMAGE_WIDTH: u32 = 300;
/// Height used when an image element carries no usable `height` declaration.
pub const DEFAULT_IMAGE_HEIGHT: u32 = 200;

/// Structured view of one image element in a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// Stable identifier from `data-id` (empty if the element has none)
    pub id: String,
    /// Remote URL or embedded `data:` payload, as written in `src`
    pub src: String,
    /// Width in pixels, always > 0
    pub width: u32,
    /// Height in pixels, always > 0
    pub height: u32,
}

impl ImageDescriptor {
    pub(crate) fn from_tag(tag: &ImageTag) -> Self {
        let style = tag.value("style");
        Self {
            id: tag.value("data-id").to_string(),
            src: tag.value("src").to_string(),
            width: declared_size(style, SizeProperty::Width).unwrap_or(DEFAULT_IMAGE_WIDTH),
            height: declared_size(style, SizeProperty::Height).unwrap_or(DEFAULT_IMAGE_HEIGHT),
        }
    }

    /// Whether the source is an embedded payload rather than a URL.
    pub fn is_embedded(&self) -> bool {
        self.src.starts_with("data:")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Size Declarations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SizeProperty {
    Width,
    Height,
}

impl SizeProperty {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }

    fn pattern(&self) -> &'static Regex {
        static WIDTH: OnceLock<Regex> = OnceLock::new();
        static HEIGHT: OnceLock<Regex> = OnceLock::new();
        // Leading boundary keeps `max-width` / `min-height` from matching
        let cell = match self {
            Self::Width => &WIDTH,
            Self::Height => &HEIGHT,
        };
        cell.get_or_init(|| {
            Regex::new(&format!(r"(?i)(?:^|[^\w-]){}:\s*(\d+)px", self.name()))
                .expect("size pattern is valid")
        })
    }
}

/// Byte range of the pixel digits of a declaration inside `style`.
pub(crate) fn size_digits_span(style: &str, property: SizeProperty) -> Option<Range<usize>> {
    property
        .pattern()
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.range())
}

/// Declared pixel size, or `None` when absent, zero or out of range.
fn declared_size(style: &str, property: SizeProperty) -> Option<u32> {
    let span = size_digits_span(style, property)?;
    style[span].parse::<u32>().ok().filter(|&px| px > 0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Serialization
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize one image element in the statement dialect.
pub fn render_image_tag(src: &str, alt: &str, width: u32, height: u32, id: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}" style="width: {}px; height: {}px;" data-id="{}" />"#,
        escape_attribute(src),
        escape_attribute(alt),
        width,
        height,
        escape_attribute(id)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Identifier Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Issues `img-{millis}` identifiers that never repeat within one editor,
/// even when two images are inserted in the same millisecond.
#[derive(Debug, Default)]
pub struct ImageIdGenerator {
    last: u64,
}

impl ImageIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identifier based on the current wall clock.
    pub fn next_id(&mut self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.next_id_at(now)
    }

    /// Next identifier for a given timestamp in milliseconds.
    pub fn next_id_at(&mut self, now_millis: u64) -> String {
        let value = now_millis.max(self.last + 1);
        self.last = value;
        format!("img-{}", value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::tokenizer::tokenize;

    fn descriptor(markup: &str) -> ImageDescriptor {
        let tokens = tokenize(markup);
        ImageDescriptor::from_tag(tokens[0].image().unwrap())
    }

    #[test]
    fn test_reads_declared_size() {
        let d = descriptor(r#"<img src="a.png" style="width: 320px; height: 190px;" data-id="img-7">"#);
        assert_eq!(d.width, 320);
        assert_eq!(d.height, 190);
        assert_eq!(d.id, "img-7");
        assert_eq!(d.src, "a.png");
    }

    #[test]
    fn test_compact_style_is_accepted() {
        let d = descriptor(r#"<img src="a.png" style="height:50px;width:40px">"#);
        assert_eq!((d.width, d.height), (40, 50));
    }

    #[test]
    fn test_missing_style_defaults() {
        let d = descriptor(r#"<img src="a.png">"#);
        assert_eq!((d.width, d.height), (DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT));
        assert!(d.id.is_empty());
    }

    #[test]
    fn test_malformed_sizes_default() {
        let d = descriptor(r#"<img src="a.png" style="width: abcpx; height: 0px;">"#);
        assert_eq!((d.width, d.height), (300, 200));

        let d = descriptor(r#"<img src="a.png" style="width: 99999999999px; height: 12em;">"#);
        assert_eq!((d.width, d.height), (300, 200));
    }

    #[test]
    fn test_max_width_is_not_width() {
        let d = descriptor(r#"<img src="a.png" style="max-width: 10px; min-height: 5px;">"#);
        assert_eq!((d.width, d.height), (300, 200));
    }

    #[test]
    fn test_embedded_source() {
        let d = descriptor(r#"<img src="data:image/png;base64,AAAA">"#);
        assert!(d.is_embedded());
        assert!(!descriptor(r#"<img src="http://x/y.png">"#).is_embedded());
    }

    #[test]
    fn test_render_image_tag_format() {
        assert_eq!(
            render_image_tag("x.png", "Imagem", 300, 200, "img-1"),
            r#"<img src="x.png" alt="Imagem" style="width: 300px; height: 200px;" data-id="img-1" />"#
        );
    }

    #[test]
    fn test_render_escapes_quotes() {
        let tag = render_image_tag("a\"b.png", "x", 1, 1, "img-1");
        assert_eq!(descriptor(&tag).src, "a\"b.png");
    }

    #[test]
    fn test_id_generator_is_strictly_increasing() {
        let mut ids = ImageIdGenerator::new();
        assert_eq!(ids.next_id_at(1000), "img-1000");
        assert_eq!(ids.next_id_at(1000), "img-1001");
        assert_eq!(ids.next_id_at(999), "img-1002");
        assert_eq!(ids.next_id_at(5000), "img-5000");
    }

    #[test]
    fn test_id_generator_wall_clock() {
        let mut ids = ImageIdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a.starts_with("img-"));
        assert_ne!(a, b);
    }
}
