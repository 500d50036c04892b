//! Statement editor state
//!
//! `StatementEditor` owns the canonical markup of a question statement and a
//! cached list of the image descriptors derived from it. Every write goes
//! through the editor so the two never disagree.

use super::formatting::{wrap_selection, FormatResult};
use super::upload::{FileSelection, UploadLimits};
use crate::config::{Reconciliation, Settings};
use crate::error::{Error, Result};
use crate::markup::{
    self, render_image_tag, Bias, Emphasis, ImageDescriptor, ImageIdGenerator,
    PlainTextProjection, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH,
};
use log::{debug, warn};

/// Alt text for images inserted from a URL.
const URL_IMAGE_ALT: &str = "Imagem";

/// Where a click landed, relative to the image previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Inside the bounds of the image at this index
    Image(usize),
    /// Outside every image
    Outside,
}

#[derive(Debug)]
pub struct StatementEditor {
    markup: String,
    /// Always equal to `markup::extract_images(&markup)`
    images: Vec<ImageDescriptor>,
    selected: Option<usize>,
    revision: u64,
    reconciliation: Reconciliation,
    limits: UploadLimits,
    ids: ImageIdGenerator,
}

impl Default for StatementEditor {
    fn default() -> Self {
        Self::new("")
    }
}

impl StatementEditor {
    pub fn new(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let images = markup::extract_images(&markup);
        Self {
            markup,
            images,
            selected: None,
            revision: 0,
            reconciliation: Reconciliation::default(),
            limits: UploadLimits::default(),
            ids: ImageIdGenerator::new(),
        }
    }

    /// Create an editor configured from user settings.
    pub fn with_settings(markup: impl Into<String>, settings: &Settings) -> Self {
        let mut editor = Self::new(markup);
        editor.reconciliation = settings.reconciliation;
        editor.limits = UploadLimits::from(settings);
        editor
    }

    pub fn set_reconciliation(&mut self, mode: Reconciliation) {
        self.reconciliation = mode;
    }

    pub fn reconciliation(&self) -> Reconciliation {
        self.reconciliation
    }

    pub fn set_upload_limits(&mut self, limits: UploadLimits) {
        self.limits = limits;
    }

    pub fn upload_limits(&self) -> UploadLimits {
        self.limits
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// The canonical markup, as handed to the submission payload.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Markup with images removed and line breaks as newlines.
    pub fn plain_text(&self) -> String {
        markup::strip_images(&self.markup)
    }

    pub fn images(&self) -> &[ImageDescriptor] {
        &self.images
    }

    pub fn selected_image(&self) -> Option<usize> {
        self.selected
    }

    /// Whether the statement has no content at all.
    pub fn is_empty(&self) -> bool {
        self.markup.trim().is_empty()
    }

    /// Incremented on every change to the markup.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the markup and rebuild the descriptor cache.
    fn write(&mut self, markup: String) {
        if markup == self.markup {
            return;
        }
        self.markup = markup;
        self.images = markup::extract_images(&self.markup);
        self.revision += 1;
        if matches!(self.selected, Some(index) if index >= self.images.len()) {
            self.selected = None;
        }
    }

    /// Replace the whole statement, e.g. when loading a question for editing.
    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.write(markup.into());
        self.selected = None;
    }

    /// Reconcile an edit of the plain-text view with the markup.
    ///
    /// With [`Reconciliation::Replace`] the edited text becomes the whole
    /// statement and any images are dropped. With
    /// [`Reconciliation::PreserveImages`] only the changed span is spliced in.
    pub fn on_statement_text_change(&mut self, new_plain: &str) {
        let new_markup = match self.reconciliation {
            Reconciliation::Replace => {
                if new_plain == self.plain_text() {
                    return;
                }
                if !self.images.is_empty() {
                    debug!(
                        "Plain-text edit replaces the statement, dropping {} image(s)",
                        self.images.len()
                    );
                }
                new_plain.to_string()
            }
            Reconciliation::PreserveImages => match self.splice_plain_edit(new_plain) {
                Some(markup) => markup,
                None => return,
            },
        };
        self.write(new_markup);
    }

    /// Apply the difference between the current plain view and `new_plain`
    /// to the markup, leaving elements outside the changed span in place.
    ///
    /// Returns `None` when nothing changed.
    fn splice_plain_edit(&self, new_plain: &str) -> Option<String> {
        let old: Vec<char> = self.plain_text().chars().collect();
        let new: Vec<char> = new_plain.chars().collect();
        if old == new {
            return None;
        }

        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let old_end = old.len() - suffix;
        let inserted: String = new[prefix..new.len() - suffix].iter().collect();

        let projection = PlainTextProjection::new(&self.markup);
        let start = projection.to_markup_offset(prefix, Bias::After);
        let end = if old_end == prefix {
            start
        } else {
            projection.to_markup_offset(old_end, Bias::Before).max(start)
        };

        let mut markup = String::with_capacity(self.markup.len() + inserted.len());
        markup.push_str(&self.markup[..start]);
        markup.push_str(&inserted);
        markup.push_str(&self.markup[end..]);
        Some(markup)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Images
    // ─────────────────────────────────────────────────────────────────────────

    /// Append an image at the end of the statement, framed by line breaks.
    ///
    /// Returns the identifier assigned to the new image.
    pub fn insert_image(&mut self, src: &str, alt: &str) -> Result<String> {
        if src.trim().is_empty() {
            return Err(Error::EmptyImageUrl);
        }
        let id = self.ids.next_id();
        let tag = render_image_tag(src, alt, DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT, &id);
        let markup = format!("{}<br>{}<br>", self.markup, tag);
        self.write(markup);
        debug!("Inserted image {} ({} total)", id, self.images.len());
        Ok(id)
    }

    /// Insert an image from a user-entered URL.
    pub fn insert_image_from_url(&mut self, url: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            warn!("Rejected empty image URL");
            return Err(Error::EmptyImageUrl);
        }
        self.insert_image(url, URL_IMAGE_ALT)
    }

    /// Validate and embed a local file as a `data:` image.
    pub fn insert_image_from_file(&mut self, file: &FileSelection) -> Result<String> {
        if let Err(err) = file.validate(self.limits) {
            warn!("Rejected image upload '{}': {}", file.name, err);
            return Err(err);
        }
        self.insert_image(&file.to_data_url(), &file.name)
    }

    /// Grow or shrink the image at `index` by the given pixel deltas.
    ///
    /// Sizes never drop below one pixel. Returns `false` for a stale index.
    pub fn resize_image(&mut self, index: usize, delta_width: i32, delta_height: i32) -> bool {
        let Some(current) = self.images.get(index) else {
            debug!("Ignoring resize of stale image index {}", index);
            return false;
        };

        let width = apply_delta(current.width, delta_width);
        let height = apply_delta(current.height, delta_height);
        if width == current.width && height == current.height {
            return true;
        }

        self.markup = markup::set_image_size(&self.markup, index, width, height);
        self.images[index].width = width;
        self.images[index].height = height;
        self.revision += 1;
        debug_assert_eq!(self.images, markup::extract_images(&self.markup));

        debug!("Resized image {} to {}x{}", index, width, height);
        true
    }

    /// Resize the currently selected image, if any.
    pub fn resize_selected(&mut self, delta_width: i32, delta_height: i32) -> bool {
        match self.selected {
            Some(index) => self.resize_image(index, delta_width, delta_height),
            None => false,
        }
    }

    /// Remove the image at `index` and clear the selection.
    ///
    /// Returns `false` (and changes nothing) for a stale index.
    pub fn delete_image(&mut self, index: usize) -> bool {
        if index >= self.images.len() {
            debug!("Ignoring delete of stale image index {}", index);
            return false;
        }
        let markup = markup::delete_image(&self.markup, index);
        self.write(markup);
        self.selected = None;
        debug!("Deleted image {} ({} left)", index, self.images.len());
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Formatting
    // ─────────────────────────────────────────────────────────────────────────

    /// Wrap a selection of the plain-text view in emphasis tags.
    ///
    /// The formatted plain text is written back the same way as a text edit,
    /// so the current [`Reconciliation`] mode decides what happens to images.
    pub fn apply_formatting(
        &mut self,
        kind: Emphasis,
        selection_start: usize,
        selection_end: usize,
    ) -> FormatResult {
        let result = wrap_selection(&self.plain_text(), selection_start, selection_end, kind);
        if result.applied {
            self.on_statement_text_change(&result.text);
        }
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Select the image at `index`. Out-of-range indices are ignored.
    pub fn select_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.selected = Some(index);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn handle_click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Image(index) => self.select_image(index),
            ClickTarget::Outside => self.clear_selection(),
        }
    }
}

fn apply_delta(size: u32, delta: i32) -> u32 {
    (i64::from(size) + i64::from(delta)).clamp(1, i64::from(u32::MAX)) as u32
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
