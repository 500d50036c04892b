//! Main application module for QBank
//!
//! This module implements the eframe App trait: the question form with the
//! statement toolbar, text area and image preview, plus the Insert Image
//! dialog and the settings panel.

use crate::config::WindowSize;
use crate::files::dialogs::{open_image_dialog, open_question_dialog};
use crate::markup::Emphasis;
use crate::state::AppState;
use crate::ui::{
    show_header, show_options, show_toolbar, FormAction, ImageDialogResult, PreviewAction,
    SettingsPanel, StatementView, ToolbarAction,
};
use chrono::Utc;
use eframe::egui;
use log::{debug, info, warn};

/// The main application struct that holds all state and implements eframe::App.
pub struct QbankApp {
    /// Application state
    state: AppState,
    /// Statement text area and preview
    statement_view: StatementView,
    /// Settings panel component
    settings_panel: SettingsPanel,
    /// Last known window size (for detecting changes)
    last_window_size: Option<egui::Vec2>,
    /// Application start time for timing toast messages
    start_time: std::time::Instant,
}

impl QbankApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        info!("Initializing QBank");
        Self {
            state: AppState::new(),
            statement_view: StatementView::new(),
            settings_panel: SettingsPanel::new(),
            last_window_size: None,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get elapsed time since app start in seconds.
    fn get_app_time(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    fn toast(&mut self, message: impl Into<String>) {
        let time = self.get_app_time();
        self.state.show_toast(message, time, 2.5);
    }

    /// Update window size in settings if changed.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let Some(size) = ctx.input(|i| i.viewport().inner_rect.map(|r| r.size())) else {
            return;
        };
        let changed = self
            .last_window_size
            .map(|s| (s - size).length() > 1.0)
            .unwrap_or(true);
        if !changed {
            return;
        }

        self.last_window_size = Some(size);
        let maximized = ctx.input(|i| i.viewport().maximized.unwrap_or(false));
        let window_size = WindowSize {
            width: size.x,
            height: size.y,
            maximized,
        };
        if self.state.settings.window_size != window_size {
            self.state.settings.window_size = window_size;
            self.state.mark_settings_dirty();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let format = ctx.input_mut(|i| {
            Emphasis::all().iter().copied().find(|kind| {
                let key = match kind {
                    Emphasis::Bold => egui::Key::B,
                    Emphasis::Italic => egui::Key::I,
                    Emphasis::Underline => egui::Key::U,
                };
                i.consume_key(egui::Modifiers::COMMAND, key)
            })
        });
        if let Some(kind) = format {
            debug!("Keyboard shortcut: {}", kind.shortcut_label());
            self.handle_format_command(kind);
        }
    }

    fn handle_format_command(&mut self, kind: Emphasis) {
        let Some((start, end)) = self.statement_view.selection() else {
            debug!("No selection for {:?}", kind);
            return;
        };
        let result = self
            .state
            .draft
            .statement
            .apply_formatting(kind, start, end);
        if result.applied {
            self.statement_view.set_selection(result.selection);
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Format(kind) => self.handle_format_command(kind),
            ToolbarAction::InsertImage => self.state.open_image_dialog(),
            ToolbarAction::OpenSettings => self.state.ui.show_settings = true,
        }
    }

    fn handle_preview_action(&mut self, action: PreviewAction) {
        let statement = &mut self.state.draft.statement;
        match action {
            PreviewAction::Click(target) => statement.handle_click(target),
            PreviewAction::Resize {
                index,
                delta_width,
                delta_height,
            } => {
                statement.resize_image(index, delta_width, delta_height);
            }
            PreviewAction::ResizeSelected {
                delta_width,
                delta_height,
            } => {
                statement.resize_selected(delta_width, delta_height);
            }
            PreviewAction::Delete(index) => {
                if statement.delete_image(index) {
                    self.toast("Image removed");
                }
            }
        }
    }

    fn handle_form_action(&mut self, action: FormAction) {
        match action {
            FormAction::Submit => match self.state.submit(Utc::now()) {
                Ok(submission) => {
                    self.toast(format!("Question ready for {}", submission.subject));
                }
                Err(err) => {
                    if !err.is_validation() {
                        warn!("Failed to prepare question: {}", err);
                    }
                    self.toast(err.to_string());
                }
            },
            FormAction::Open => {
                let Some(path) = open_question_dialog() else {
                    return;
                };
                match self.state.open_question(&path, Utc::now()) {
                    Ok(()) => {
                        self.statement_view = StatementView::new();
                        self.toast("Question loaded for editing");
                    }
                    Err(err) => {
                        warn!("Failed to open question: {}", err);
                        self.toast(err.to_string());
                    }
                }
            }
            FormAction::Clear => {
                self.state.reset_draft();
                self.statement_view = StatementView::new();
                self.state.ui.last_submission = None;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dialogs
    // ─────────────────────────────────────────────────────────────────────────

    fn show_image_dialog(&mut self, ctx: &egui::Context) {
        if let Some(outcome) = self.state.poll_upload() {
            match outcome {
                Ok(()) => self.toast("Image inserted"),
                Err(err) => warn!("Image upload failed: {}", err),
            }
        }
        if self.state.ui.pending_upload.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        let Some(dialog) = &mut self.state.ui.image_dialog else {
            return;
        };
        match dialog.show(ctx) {
            ImageDialogResult::None => {}
            ImageDialogResult::Cancelled => self.state.close_image_dialog(),
            ImageDialogResult::PickFile => {
                let initial_dir = self.state.settings.last_image_directory.clone();
                if let Some(path) = open_image_dialog(initial_dir.as_deref()) {
                    if let Err(err) = self.state.begin_upload(&path) {
                        if let Some(dialog) = &mut self.state.ui.image_dialog {
                            dialog.set_error(err.to_string());
                        }
                    }
                }
            }
            ImageDialogResult::InsertUrl(url) => {
                if let Err(err) = self.state.insert_image_url(&url) {
                    if let Some(dialog) = &mut self.state.ui.image_dialog {
                        dialog.set_error(err.to_string());
                    }
                }
            }
        }
    }

    fn show_settings_panel(&mut self, ctx: &egui::Context) {
        if !self.state.ui.show_settings {
            return;
        }
        let output = self.settings_panel.show(ctx, &mut self.state.settings);
        if output.changed {
            self.state.apply_settings();
        }
        if output.reset_requested {
            self.state.reset_settings();
        }
        if output.close_requested {
            self.state.ui.show_settings = false;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────────

    fn render_ui(&mut self, ctx: &egui::Context) {
        let mut toolbar_action = None;
        let mut preview_action = None;
        let mut form_action = None;

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let images = self.state.draft.statement.images().len();
                ui.label(format!("{} image(s)", images));
                ui.separator();
                ui.label(self.state.draft.statement.reconciliation().label());
                ui.separator();
                let author = &self.state.draft.author;
                let response = ui.label(format!("{} ({})", author.name, author.role.label()));
                if !author.email.is_empty() {
                    response.on_hover_text(author.email.as_str());
                }

                if let Some(toast) = &self.state.ui.toast_message {
                    ui.with_layout(
                        egui::Layout::centered_and_justified(egui::Direction::LeftToRight),
                        |ui| {
                            ui.label(egui::RichText::new(toast).italics());
                        },
                    );
                }
            });
        });

        let mut copied = false;
        if let Some(json) = &self.state.ui.last_submission {
            let mut copy = false;
            egui::SidePanel::right("submission_panel")
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.heading("Payload");
                        if ui.small_button("📋 Copy").clicked() {
                            copy = true;
                        }
                    });
                    ui.separator();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.monospace(json.as_str());
                    });
                });
            if copy {
                ctx.output_mut(|o| o.copied_text = json.clone());
                copied = true;
            }
        }
        if copied {
            self.toast("Payload copied");
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let heading = if self.state.draft.is_editing() {
                    "Edit Question"
                } else {
                    "New Question"
                };
                ui.horizontal(|ui| {
                    ui.heading(heading);
                    if ui
                        .small_button("📂 Open question…")
                        .on_hover_text("Edit a stored question (JSON)")
                        .clicked()
                    {
                        form_action = Some(FormAction::Open);
                    }
                });
                ui.add_space(8.0);

                let state = &mut self.state;
                show_header(
                    ui,
                    &mut state.draft,
                    &mut state.subjects,
                    &state.suggested_tags,
                    &mut state.ui.form,
                );

                ui.add_space(12.0);
                ui.label(egui::RichText::new("Statement *").strong());
                toolbar_action = show_toolbar(ui, self.statement_view.selection().is_some());
                self.statement_view.show_text_area(
                    ui,
                    &mut self.state.draft.statement,
                    self.state.settings.font_size,
                );

                ui.add_space(8.0);
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    preview_action = self
                        .statement_view
                        .show_preview(
                            ui,
                            &self.state.draft.statement,
                            self.state.settings.font_size,
                        );
                });

                ui.add_space(12.0);
                if let Some(action) = show_options(ui, &mut self.state.draft) {
                    form_action = Some(action);
                }
            });
        });

        // Apply actions after render so the selection is up to date
        if let Some(action) = toolbar_action {
            self.handle_toolbar_action(action);
        }
        if let Some(action) = preview_action {
            self.handle_preview_action(action);
        }
        if let Some(action) = form_action {
            self.handle_form_action(action);
        }
    }
}

impl eframe::App for QbankApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Update toast message (clear if expired)
        let current_time = self.get_app_time();
        self.state.update_toast(current_time);

        // Track window size changes for persistence
        self.update_window_state(ctx);

        self.render_ui(ctx);

        // Handle keyboard shortcuts AFTER render so selection is up-to-date
        self.handle_keyboard_shortcuts(ctx);

        self.show_image_dialog(ctx);
        self.show_settings_panel(ctx);
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.state.shutdown();
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.state.save_settings_if_dirty();
    }
}
