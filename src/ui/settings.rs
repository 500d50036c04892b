//! Settings Panel Component for QBank
//!
//! Modal panel for the statement editor behavior, upload limits and the
//! author name recorded on new questions.

use crate::config::{Reconciliation, Settings};
use eframe::egui::{self, Color32, RichText, Ui};

const MIB: u64 = 1024 * 1024;

/// Settings panel sections for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSection {
    #[default]
    Editor,
    Uploads,
    Author,
}

impl SettingsSection {
    /// Get the display label for the section.
    pub fn label(&self) -> &'static str {
        match self {
            SettingsSection::Editor => "Editor",
            SettingsSection::Uploads => "Uploads",
            SettingsSection::Author => "Author",
        }
    }

    /// Get the icon for the section.
    pub fn icon(&self) -> &'static str {
        match self {
            SettingsSection::Editor => "📝",
            SettingsSection::Uploads => "🖼",
            SettingsSection::Author => "👤",
        }
    }
}

/// Result of showing the settings panel.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanelOutput {
    /// Whether settings were modified.
    pub changed: bool,
    /// Whether the panel should be closed.
    pub close_requested: bool,
    /// Whether a reset to defaults was requested.
    pub reset_requested: bool,
}

/// Settings panel state and rendering.
#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    /// Currently active settings section.
    active_section: SettingsSection,
}

impl SettingsPanel {
    /// Create a new settings panel instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the settings panel as a modal window.
    pub fn show(&mut self, ctx: &egui::Context, settings: &mut Settings) -> SettingsPanelOutput {
        let mut output = SettingsPanelOutput::default();

        // Semi-transparent overlay
        let screen_rect = ctx.screen_rect();
        egui::Area::new(egui::Id::new("settings_overlay"))
            .order(egui::Order::Middle)
            .fixed_pos(screen_rect.min)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen_rect.size(), egui::Sense::click());
                ui.painter().rect_filled(
                    screen_rect,
                    0.0,
                    Color32::from_rgba_unmultiplied(0, 0, 0, 140),
                );

                // Close on click outside
                if response.clicked() {
                    output.close_requested = true;
                }
            });

        egui::Window::new("⚙ Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .min_width(480.0)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    output.close_requested = true;
                }

                ui.horizontal(|ui| {
                    // Left side: Section tabs
                    ui.vertical(|ui| {
                        ui.set_min_width(120.0);

                        for section in [
                            SettingsSection::Editor,
                            SettingsSection::Uploads,
                            SettingsSection::Author,
                        ] {
                            let selected = self.active_section == section;
                            let text = format!("{} {}", section.icon(), section.label());
                            if ui
                                .add_sized(
                                    [110.0, 32.0],
                                    egui::SelectableLabel::new(
                                        selected,
                                        RichText::new(text).size(14.0),
                                    ),
                                )
                                .clicked()
                            {
                                self.active_section = section;
                            }
                        }

                        ui.add_space(ui.available_height() - 40.0);

                        if ui
                            .add_sized([110.0, 28.0], egui::Button::new("↺ Reset All"))
                            .on_hover_text("Reset all settings to defaults")
                            .clicked()
                        {
                            output.reset_requested = true;
                        }
                    });

                    ui.separator();

                    // Right side: Section content
                    ui.vertical(|ui| {
                        ui.set_min_width(330.0);
                        ui.set_min_height(260.0);

                        let changed = match self.active_section {
                            SettingsSection::Editor => show_editor_section(ui, settings),
                            SettingsSection::Uploads => show_uploads_section(ui, settings),
                            SettingsSection::Author => show_author_section(ui, settings),
                        };
                        output.changed |= changed;
                    });
                });

                ui.separator();

                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            output.close_requested = true;
                        }
                        ui.label(
                            RichText::new("Settings are saved automatically")
                                .small()
                                .weak(),
                        );
                    });
                });
            });

        output
    }
}

/// Returns true if any setting was changed.
fn show_editor_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Editor");
    ui.add_space(8.0);

    ui.label(RichText::new("When the statement text is edited").strong());
    ui.add_space(4.0);
    for mode in Reconciliation::all() {
        let hint = match mode {
            Reconciliation::Replace => "The edited text becomes the statement; images are removed",
            Reconciliation::PreserveImages => "Only the edited span changes; images stay in place",
        };
        if ui
            .radio_value(&mut settings.reconciliation, *mode, mode.label())
            .on_hover_text(hint)
            .changed()
        {
            changed = true;
        }
    }

    ui.add_space(16.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label(RichText::new("Font Size").strong());
        ui.add_space(8.0);
        ui.label(format!("{}px", settings.font_size as u32));
    });
    ui.add_space(4.0);
    if ui
        .add(
            egui::Slider::new(
                &mut settings.font_size,
                Settings::MIN_FONT_SIZE..=Settings::MAX_FONT_SIZE,
            )
            .show_value(false)
            .step_by(1.0),
        )
        .changed()
    {
        changed = true;
    }

    changed
}

fn show_uploads_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    let mut changed = false;

    ui.heading("Uploads");
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label(RichText::new("Largest image").strong());
        ui.add_space(8.0);
        ui.label(format!("{} MB", settings.max_upload_bytes / MIB));
    });
    ui.add_space(4.0);

    let mut megabytes = (settings.max_upload_bytes / MIB).max(1);
    if ui
        .add(
            egui::Slider::new(&mut megabytes, 1..=Settings::MAX_UPLOAD_BYTES_CEILING / MIB)
                .show_value(false),
        )
        .changed()
    {
        settings.max_upload_bytes = megabytes * MIB;
        changed = true;
    }

    ui.add_space(8.0);
    if let Some(dir) = &settings.last_image_directory {
        ui.label(
            RichText::new(format!("Last folder: {}", dir.display()))
                .small()
                .weak(),
        );
    }

    changed
}

fn show_author_section(ui: &mut Ui, settings: &mut Settings) -> bool {
    ui.heading("Author");
    ui.add_space(8.0);
    ui.label("Name recorded on new questions:");
    ui.add_space(4.0);
    ui.add(
        egui::TextEdit::singleline(&mut settings.author_name)
            .hint_text("Your name")
            .desired_width(300.0),
    )
    .changed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_panel_default() {
        let panel = SettingsPanel::new();
        assert_eq!(panel.active_section, SettingsSection::Editor);
    }

    #[test]
    fn test_settings_section_label() {
        assert_eq!(SettingsSection::Editor.label(), "Editor");
        assert_eq!(SettingsSection::Uploads.label(), "Uploads");
        assert_eq!(SettingsSection::Author.label(), "Author");
    }

    #[test]
    fn test_settings_panel_output_default() {
        let output = SettingsPanelOutput::default();
        assert!(!output.changed);
        assert!(!output.close_requested);
        assert!(!output.reset_requested);
    }
}
