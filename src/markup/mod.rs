//! Statement markup model
//!
//! A question statement is stored as one markup string in a small, fixed
//! dialect: text, `<strong>`/`<em>`/`<u>` emphasis, `<br>` line breaks and
//! image elements of the form
//!
//! ```text
//! <img src="..." alt="..." style="width: 300px; height: 200px;" data-id="img-1700000000000" />
//! ```
//!
//! This module never owns a statement. It tokenizes the string, derives
//! image descriptors and the plain-text view from it, and returns rewritten
//! copies for image mutations.
//!
//! # Example
//! ```ignore
//! use crate::markup::{extract_images, set_image_size, strip_images};
//!
//! let markup = r#"Veja:<br><img src="x.png" style="width: 300px; height: 200px;" data-id="img-1" /><br>"#;
//! assert_eq!(extract_images(markup)[0].width, 300);
//! let resized = set_image_size(markup, 0, 320, 190);
//! assert_eq!(strip_images(&resized), "Veja:\n\n");
//! ```

mod image;
mod ops;
mod tokenizer;

pub use image::{
    render_image_tag, ImageDescriptor, ImageIdGenerator, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH,
};
pub use ops::{
    delete_image, extract_images, set_image_size, strip_images, Bias, PlainTextProjection,
};
pub use tokenizer::{decode_entities, tokenize, Emphasis, TokenKind};
