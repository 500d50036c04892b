//! Statement toolbar
//!
//! Emphasis buttons plus the Insert Image button. The toolbar only reports
//! what was clicked; the app applies the command after the editor has
//! reported its selection for the frame.

use crate::markup::Emphasis;
use eframe::egui::{self, Response, RichText, Ui};

/// Actions that can be triggered from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Format(Emphasis),
    InsertImage,
    OpenSettings,
}

const BUTTON_SIZE: egui::Vec2 = egui::vec2(28.0, 24.0);

/// Render the toolbar and return the clicked action, if any.
pub fn show_toolbar(ui: &mut Ui, has_selection: bool) -> Option<ToolbarAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 2.0;

        for kind in Emphasis::all() {
            if emphasis_button(ui, *kind, has_selection).clicked() {
                action = Some(ToolbarAction::Format(*kind));
            }
        }

        ui.separator();

        if ui
            .button("🖼 Image")
            .on_hover_text("Insert an image at the end of the statement")
            .clicked()
        {
            action = Some(ToolbarAction::InsertImage);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⚙").on_hover_text("Settings").clicked() {
                action = Some(ToolbarAction::OpenSettings);
            }
        });
    });

    action
}

fn emphasis_button(ui: &mut Ui, kind: Emphasis, enabled: bool) -> Response {
    let text = RichText::new(kind.icon()).size(15.0);
    let text = match kind {
        Emphasis::Bold => text.strong(),
        Emphasis::Italic => text.italics(),
        Emphasis::Underline => text.underline(),
    };

    ui.add_enabled(enabled, egui::Button::new(text).min_size(BUTTON_SIZE))
        .on_hover_text(kind.tooltip())
        .on_disabled_hover_text(format!("{} (select some text first)", kind.tooltip()))
}
