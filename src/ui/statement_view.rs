//! Statement editing area
//!
//! The text area edits the plain-text view of the statement. Below it the
//! preview renders the markup with its emphasis and the images at their
//! stored size; images are selected by clicking them and resized by
//! dragging the handle in their bottom-right corner.

use crate::editor::{decode_data_url, ClickTarget, StatementEditor};
use crate::markup::{decode_entities, tokenize, Emphasis, ImageDescriptor, TokenKind};
use eframe::egui::{
    self, text::LayoutJob, Color32, CursorIcon, FontId, Rect, Sense, Stroke, TextFormat,
    Pos2, TextureHandle, Ui, Vec2,
};
use image::GenericImageView;
use log::{debug, warn};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Edge length of the resize handle.
const HANDLE_SIZE: f32 = 12.0;

/// Pixels added or removed per arrow key press.
const KEYBOARD_RESIZE_STEP: i32 = 10;

const SELECTION_COLOR: Color32 = Color32::from_rgb(66, 133, 244);

/// Image commands raised by the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewAction {
    Click(ClickTarget),
    Resize {
        index: usize,
        delta_width: i32,
        delta_height: i32,
    },
    /// Arrow keys with an image selected
    ResizeSelected {
        delta_width: i32,
        delta_height: i32,
    },
    Delete(usize),
}

/// Open emphasis elements at the current point of the markup.
#[derive(Debug, Default, Clone, Copy)]
struct EmphasisDepth {
    bold: u32,
    italic: u32,
    underline: u32,
}

impl EmphasisDepth {
    fn counter(&mut self, kind: Emphasis) -> &mut u32 {
        match kind {
            Emphasis::Bold => &mut self.bold,
            Emphasis::Italic => &mut self.italic,
            Emphasis::Underline => &mut self.underline,
        }
    }

    fn open(&mut self, kind: Emphasis) {
        *self.counter(kind) += 1;
    }

    /// Stray closing tags are ignored.
    fn close(&mut self, kind: Emphasis) {
        let count = self.counter(kind);
        *count = count.saturating_sub(1);
    }

    fn text_format(&self, font_id: FontId, visuals: &egui::Visuals) -> TextFormat {
        let text_color = visuals.text_color();
        TextFormat {
            font_id,
            color: if self.bold > 0 {
                visuals.strong_text_color()
            } else {
                text_color
            },
            italics: self.italic > 0,
            underline: if self.underline > 0 {
                Stroke::new(1.0, text_color)
            } else {
                Stroke::NONE
            },
            ..Default::default()
        }
    }
}

/// A resize drag in progress.
#[derive(Debug, Clone, Copy)]
struct ResizeDrag {
    index: usize,
    delta: Vec2,
}

#[derive(Default)]
pub struct StatementView {
    /// Plain-text view bound to the text area
    buffer: String,
    /// Editor revision the buffer was built from
    buffer_revision: Option<u64>,
    /// Last selection reported by the text area, in characters
    selection: Option<(usize, usize)>,
    /// Decoded `data:` images keyed by a hash of their source
    textures: HashMap<u64, Option<TextureHandle>>,
    drag: Option<ResizeDrag>,
}

impl StatementView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection of the text area, if it spans at least one character.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection.filter(|(start, end)| start != end)
    }

    /// Select a character range, e.g. the text wrapped by a formatting command.
    pub fn set_selection(&mut self, selection: Option<(usize, usize)>) {
        self.selection = selection;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text Area
    // ─────────────────────────────────────────────────────────────────────────

    /// Show the plain-text editor and write edits back to `editor`.
    pub fn show_text_area(&mut self, ui: &mut Ui, editor: &mut StatementEditor, font_size: f32) {
        if self.buffer_revision != Some(editor.revision()) {
            self.buffer = editor.plain_text();
            self.buffer_revision = Some(editor.revision());
        }

        let output = egui::TextEdit::multiline(&mut self.buffer)
            .id_source("statement_text")
            .font(FontId::proportional(font_size))
            .hint_text("Write the question statement…")
            .desired_width(f32::INFINITY)
            .desired_rows(8)
            .show(ui);

        if let Some(range) = output.cursor_range {
            let primary = range.primary.ccursor.index;
            let secondary = range.secondary.ccursor.index;
            self.selection = Some((primary.min(secondary), primary.max(secondary)));
        }

        if output.response.changed() {
            editor.on_statement_text_change(&self.buffer);
            self.buffer_revision = Some(editor.revision());
            if self.buffer != editor.plain_text() {
                self.buffer_revision = None;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preview
    // ─────────────────────────────────────────────────────────────────────────

    /// Render the statement with its images and return the image command
    /// raised this frame, if any.
    pub fn show_preview(
        &mut self,
        ui: &mut Ui,
        editor: &StatementEditor,
        font_size: f32,
    ) -> Option<PreviewAction> {
        let mut action = None;
        let markup = editor.markup();
        let images = editor.images();
        let selected = editor.selected_image();
        self.prune_textures(images);

        // Screen area of every image and its handle, for outside-click detection
        let mut image_rects = Vec::with_capacity(images.len());

        let mut job = LayoutJob::default();
        let mut depth = EmphasisDepth::default();
        let mut image_index = 0;

        let font_id = FontId::proportional(font_size);
        let visuals = ui.visuals().clone();

        ui.vertical(|ui| {
            for token in tokenize(markup) {
                match token.kind {
                    TokenKind::Text => {
                        let format = depth.text_format(font_id.clone(), &visuals);
                        job.append(&decode_entities(&markup[token.span]), 0.0, format);
                    }
                    TokenKind::LineBreak => {
                        let format = TextFormat::simple(font_id.clone(), visuals.text_color());
                        job.append("\n", 0.0, format);
                    }
                    TokenKind::EmphasisOpen(kind) => depth.open(kind),
                    TokenKind::EmphasisClose(kind) => depth.close(kind),
                    TokenKind::Image(_) => {
                        flush_job(ui, &mut job);
                        if let Some(descriptor) = images.get(image_index) {
                            let is_selected = selected == Some(image_index);
                            let (rect, image_action) =
                                self.show_image(ui, image_index, descriptor, is_selected);
                            image_rects.push(rect.expand(HANDLE_SIZE / 2.0));
                            if let Some(a) = image_action {
                                action = Some(a);
                            }
                        }
                        image_index += 1;
                    }
                }
            }
            flush_job(ui, &mut job);
        });

        // Keyboard commands on the selected image, unless a text field has focus
        if let Some(index) = selected {
            let typing = ui.ctx().memory(|m| m.focused().is_some());
            if !typing && action.is_none() {
                action = keyboard_action(ui, index);
            }
        }

        // A click away from every image clears the selection
        if action.is_none() && self.drag.is_none() && selected.is_some() {
            let click = ui.input(|i| {
                i.pointer
                    .primary_clicked()
                    .then(|| i.pointer.interact_pos())
            });
            if let Some(pos) = click {
                if is_outside_images(pos, &image_rects) {
                    action = Some(PreviewAction::Click(ClickTarget::Outside));
                }
            }
        }

        action
    }

    fn show_image(
        &mut self,
        ui: &mut Ui,
        index: usize,
        descriptor: &ImageDescriptor,
        is_selected: bool,
    ) -> (Rect, Option<PreviewAction>) {
        let mut action = None;
        let size = egui::vec2(descriptor.width as f32, descriptor.height as f32);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());

        match self.texture_for(ui.ctx(), descriptor) {
            Some(texture) => {
                egui::Image::new((texture.id(), rect.size())).paint_at(ui, rect);
            }
            None => paint_placeholder(ui, rect, descriptor),
        }

        if response.clicked() {
            action = Some(PreviewAction::Click(ClickTarget::Image(index)));
        }

        if !is_selected {
            return (rect, action);
        }

        ui.painter()
            .rect_stroke(rect, 0.0, Stroke::new(2.0, SELECTION_COLOR));

        // Resize handle
        let handle_rect = Rect::from_center_size(rect.max, Vec2::splat(HANDLE_SIZE));
        let handle = ui
            .interact(handle_rect, ui.id().with(("resize_handle", index)), Sense::drag())
            .on_hover_cursor(CursorIcon::ResizeNwSe);
        ui.painter().rect_filled(handle_rect, 2.0, SELECTION_COLOR);

        if handle.dragged() {
            let drag = self.drag.get_or_insert(ResizeDrag {
                index,
                delta: Vec2::ZERO,
            });
            drag.delta += handle.drag_delta();
            let ghost = Rect::from_min_size(rect.min, (size + drag.delta).max(Vec2::splat(1.0)));
            ui.painter().rect_stroke(
                ghost,
                0.0,
                Stroke::new(1.0, SELECTION_COLOR.gamma_multiply(0.6)),
            );
        }
        if handle.drag_stopped() {
            if let Some(drag) = self.drag.take().filter(|d| d.index == index) {
                action = Some(PreviewAction::Resize {
                    index,
                    delta_width: drag.delta.x.round() as i32,
                    delta_height: drag.delta.y.round() as i32,
                });
            }
        }

        if ui
            .small_button("🗑 Delete image")
            .on_hover_text("Remove this image from the statement")
            .clicked()
        {
            action = Some(PreviewAction::Delete(index));
        }

        (rect, action)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Textures
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop cached textures of images no longer in the statement.
    fn prune_textures(&mut self, images: &[ImageDescriptor]) {
        if self.textures.is_empty() {
            return;
        }
        let live: HashSet<u64> = images
            .iter()
            .filter(|d| d.is_embedded())
            .map(|d| source_hash(&d.src))
            .collect();
        let before = self.textures.len();
        self.textures.retain(|key, _| live.contains(key));
        if self.textures.len() != before {
            debug!("Released {} image texture(s)", before - self.textures.len());
        }
    }

    /// Decoded texture for an embedded image. Remote images are not fetched.
    fn texture_for(
        &mut self,
        ctx: &egui::Context,
        descriptor: &ImageDescriptor,
    ) -> Option<TextureHandle> {
        if !descriptor.is_embedded() {
            return None;
        }
        let key = source_hash(&descriptor.src);
        self.textures
            .entry(key)
            .or_insert_with(|| load_texture(ctx, key, &descriptor.src))
            .clone()
    }
}

fn load_texture(ctx: &egui::Context, key: u64, src: &str) -> Option<TextureHandle> {
    let bytes = decode_data_url(src)?;
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(err) => {
            warn!("Could not decode embedded image: {}", err);
            return None;
        }
    };
    let (width, height) = image.dimensions();
    let rgba = image.to_rgba8();
    let color_image =
        egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], &rgba);
    debug!("Decoded embedded image {}x{}", width, height);
    Some(ctx.load_texture(
        format!("statement-image-{:x}", key),
        color_image,
        egui::TextureOptions::LINEAR,
    ))
}

fn keyboard_action(ui: &Ui, index: usize) -> Option<PreviewAction> {
    ui.input(|i| {
        if i.key_pressed(egui::Key::Delete) {
            return Some(PreviewAction::Delete(index));
        }
        let step = KEYBOARD_RESIZE_STEP;
        let (delta_width, delta_height) = if i.key_pressed(egui::Key::ArrowRight) {
            (step, 0)
        } else if i.key_pressed(egui::Key::ArrowLeft) {
            (-step, 0)
        } else if i.key_pressed(egui::Key::ArrowDown) {
            (0, step)
        } else if i.key_pressed(egui::Key::ArrowUp) {
            (0, -step)
        } else {
            return None;
        };
        Some(PreviewAction::ResizeSelected {
            delta_width,
            delta_height,
        })
    })
}

/// `pos` is `None` when the pointer left the window; that counts as outside.
fn is_outside_images(pos: Option<Pos2>, image_rects: &[Rect]) -> bool {
    pos.map_or(true, |p| !image_rects.iter().any(|r| r.contains(p)))
}

fn source_hash(src: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    hasher.finish()
}

fn paint_placeholder(ui: &Ui, rect: Rect, descriptor: &ImageDescriptor) {
    let visuals = ui.visuals();
    ui.painter()
        .rect_filled(rect, 4.0, visuals.extreme_bg_color);
    ui.painter()
        .rect_stroke(rect, 4.0, visuals.widgets.noninteractive.bg_stroke);

    let label = if descriptor.is_embedded() {
        "🖼".to_string()
    } else {
        format!("🖼 {}", descriptor.src)
    };
    ui.painter().with_clip_rect(rect).text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        label,
        FontId::proportional(12.0),
        visuals.weak_text_color(),
    );
}

fn flush_job(ui: &mut Ui, job: &mut LayoutJob) {
    if job.text.is_empty() {
        return;
    }
    let mut finished = std::mem::take(job);
    finished.wrap.max_width = ui.available_width();
    ui.label(finished);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_is_hidden() {
        let mut view = StatementView::new();
        view.set_selection(Some((3, 3)));
        assert_eq!(view.selection(), None);
        view.set_selection(Some((1, 4)));
        assert_eq!(view.selection(), Some((1, 4)));
    }

    #[test]
    fn test_textures_of_removed_images_are_released() {
        let mut editor = StatementEditor::new("");
        let mut view = StatementView::new();
        for i in 0..50 {
            let src = format!("data:image/png;base64,{}", i);
            editor.insert_image(&src, "x").unwrap();
            view.textures.insert(source_hash(&src), None);
        }
        editor.insert_image("http://x/y.png", "remote").unwrap();

        view.prune_textures(editor.images());
        assert_eq!(view.textures.len(), 50);

        editor.delete_image(0);
        view.prune_textures(editor.images());
        assert_eq!(view.textures.len(), 49);
        assert!(!view.textures.contains_key(&source_hash("data:image/png;base64,0")));

        // A Replace-mode edit drops every image
        editor.on_statement_text_change("texto");
        view.prune_textures(editor.images());
        assert!(view.textures.is_empty());
    }

    #[test]
    fn test_click_on_image_or_handle_is_not_outside() {
        let image = Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(100.0, 50.0));
        let rects = [image.expand(HANDLE_SIZE / 2.0)];

        assert!(!is_outside_images(Some(Pos2::new(50.0, 30.0)), &rects));
        // Resize handle sits on the bottom-right corner, partly outside the image
        assert!(!is_outside_images(Some(image.max + Vec2::splat(4.0)), &rects));
        assert!(is_outside_images(Some(Pos2::new(300.0, 300.0)), &rects));
        assert!(is_outside_images(None, &rects));
    }

    #[test]
    fn test_preview_text_uses_configured_font_size() {
        let visuals = egui::Visuals::light();
        let mut depth = EmphasisDepth::default();
        let plain = depth.text_format(FontId::proportional(22.0), &visuals);
        assert_eq!(plain.font_id.size, 22.0);
        assert!(!plain.italics);

        depth.open(Emphasis::Italic);
        depth.open(Emphasis::Underline);
        let styled = depth.text_format(FontId::proportional(18.0), &visuals);
        assert_eq!(styled.font_id.size, 18.0);
        assert!(styled.italics);
        assert_ne!(styled.underline, Stroke::NONE);

        depth.close(Emphasis::Italic);
        depth.close(Emphasis::Italic);
        assert!(!depth.text_format(FontId::proportional(18.0), &visuals).italics);
    }

    #[test]
    fn test_source_hash_is_stable() {
        assert_eq!(source_hash("data:a"), source_hash("data:a"));
        assert_ne!(source_hash("data:a"), source_hash("data:b"));
    }
}
