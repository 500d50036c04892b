//! Insert Image dialog
//!
//! Two tabs: upload a local file through the native picker, or paste an
//! image URL. The dialog only collects input; the app validates it and
//! reports failures back through `error_message`.

use eframe::egui::{self, Color32, Key, RichText};

/// Source tab of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSource {
    #[default]
    Upload,
    Url,
}

impl ImageSource {
    pub fn label(&self) -> &'static str {
        match self {
            ImageSource::Upload => "📤 Upload",
            ImageSource::Url => "🔗 URL",
        }
    }
}

/// Result from showing the image dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDialogResult {
    /// No action taken (dialog still open)
    None,
    /// Dialog was cancelled
    Cancelled,
    /// Open the native file picker
    PickFile,
    /// Insert the image at this URL
    InsertUrl(String),
}

#[derive(Debug, Clone, Default)]
pub struct ImageDialog {
    pub source: ImageSource,
    pub url_input: String,
    pub error_message: Option<String>,
    /// Name of the file being read, while an upload is in flight
    pub loading: Option<String>,
}

impl ImageDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.loading = None;
    }

    /// Show the dialog and return the result.
    pub fn show(&mut self, ctx: &egui::Context) -> ImageDialogResult {
        let mut result = ImageDialogResult::None;

        // Handle escape key
        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            return ImageDialogResult::Cancelled;
        }

        egui::Window::new("🖼 Insert Image")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(380.0);

                ui.horizontal(|ui| {
                    for source in [ImageSource::Upload, ImageSource::Url] {
                        if ui
                            .selectable_value(&mut self.source, source, source.label())
                            .changed()
                        {
                            self.error_message = None;
                        }
                    }
                });
                ui.separator();
                ui.add_space(8.0);

                match self.source {
                    ImageSource::Upload => {
                        ui.label("Choose an image from your computer.");
                        ui.label(RichText::new("PNG, JPEG or GIF").small().weak());
                        ui.add_space(8.0);

                        let busy = self.loading.is_some();
                        if ui
                            .add_enabled(!busy, egui::Button::new("Browse…"))
                            .clicked()
                        {
                            self.error_message = None;
                            result = ImageDialogResult::PickFile;
                        }
                        if let Some(name) = &self.loading {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(format!("Reading {}…", name));
                            });
                        }
                    }
                    ImageSource::Url => {
                        ui.label("Image URL:");
                        ui.add_space(4.0);
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut self.url_input)
                                .hint_text("https://example.com/figure.png")
                                .desired_width(360.0),
                        );
                        if response.changed() {
                            self.error_message = None;
                        }

                        let submitted =
                            response.lost_focus() && ctx.input(|i| i.key_pressed(Key::Enter));
                        ui.add_space(8.0);
                        if ui.button("Insert").clicked() || submitted {
                            result = ImageDialogResult::InsertUrl(self.url_input.clone());
                        }
                    }
                }

                // Show error message if any
                if let Some(error) = &self.error_message {
                    ui.add_space(6.0);
                    ui.colored_label(Color32::from_rgb(220, 80, 80), error.as_str());
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Cancel").clicked() {
                            result = ImageDialogResult::Cancelled;
                        }
                    });
                });
            });

        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dialog_starts_on_upload() {
        let dialog = ImageDialog::new();
        assert_eq!(dialog.source, ImageSource::Upload);
        assert!(dialog.error_message.is_none());
    }

    #[test]
    fn test_set_error_stops_loading() {
        let mut dialog = ImageDialog::new();
        dialog.loading = Some("a.png".to_string());
        dialog.set_error("too big");
        assert_eq!(dialog.error_message.as_deref(), Some("too big"));
        assert!(dialog.loading.is_none());
    }
}
