//! Question form widgets
//!
//! Subject and tag pickers above the statement, answer options and the
//! submit button below it.

use crate::question::{option_label, QuestionDraft, SubjectCatalog};
use chrono::Utc;
use eframe::egui::{self, Key, RichText, Ui};

/// Actions raised by the form footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Clear,
    /// Load a stored question for editing
    Open,
}

/// Text inputs that belong to the form but not to the draft.
#[derive(Debug, Clone, Default)]
pub struct FormInputs {
    pub tag_input: String,
    pub new_subject: String,
}

/// Subject picker and tag editor.
pub fn show_header(
    ui: &mut Ui,
    draft: &mut QuestionDraft,
    catalog: &mut SubjectCatalog,
    suggested_tags: &[String],
    inputs: &mut FormInputs,
) {
    // Subject
    ui.label(RichText::new("Subject *").strong());
    ui.horizontal(|ui| {
        let selected = if draft.subject.is_empty() {
            "Select a subject"
        } else {
            draft.subject.as_str()
        }
        .to_string();
        egui::ComboBox::from_id_source("subject_combo")
            .selected_text(selected)
            .width(200.0)
            .show_ui(ui, |ui| {
                for subject in catalog.subjects() {
                    ui.selectable_value(&mut draft.subject, subject.name.clone(), &subject.name)
                        .on_hover_text(format!("Added {}", subject.created_at));
                }
            });

        let response = ui.add(
            egui::TextEdit::singleline(&mut inputs.new_subject)
                .hint_text("New subject")
                .desired_width(160.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        if ui.button("➕ Add").clicked() || submitted {
            if let Some(subject) = catalog.add(&inputs.new_subject, Utc::now()) {
                draft.subject = subject.name.clone();
                inputs.new_subject.clear();
            }
        }
    });

    ui.add_space(8.0);

    // Tags
    ui.label(RichText::new("Tags").strong());
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut inputs.tag_input)
                .hint_text("Type a tag and press Enter")
                .desired_width(220.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
        if (ui.button("Add").clicked() || submitted) && draft.add_tag(&inputs.tag_input) {
            inputs.tag_input.clear();
        }
    });

    if !draft.tags().is_empty() {
        let mut removed = None;
        ui.horizontal_wrapped(|ui| {
            for tag in draft.tags() {
                if ui
                    .small_button(format!("{} ✖", tag))
                    .on_hover_text("Remove tag")
                    .clicked()
                {
                    removed = Some(tag.clone());
                }
            }
        });
        if let Some(tag) = removed {
            draft.remove_tag(&tag);
        }
    }

    if !suggested_tags.is_empty() {
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new("Suggestions:").small().weak());
            for tag in suggested_tags {
                let active = draft.has_tag(tag);
                if ui.selectable_label(active, tag.as_str()).clicked() {
                    draft.toggle_suggested_tag(tag);
                }
            }
        });
    }
}

/// Answer options and the form footer.
pub fn show_options(ui: &mut Ui, draft: &mut QuestionDraft) -> Option<FormAction> {
    let mut action = None;

    ui.label(RichText::new("Options *").strong());
    ui.label(
        RichText::new("Mark the correct answer")
            .small()
            .weak(),
    );
    ui.add_space(4.0);

    let mut correct = draft.correct_option();
    for index in 0..draft.options().len() {
        ui.horizontal(|ui| {
            ui.radio_value(&mut correct, index, option_label(index).to_string());
            if let Some(option) = draft.option_mut(index) {
                ui.add(
                    egui::TextEdit::singleline(option)
                        .hint_text(format!("Option {}", option_label(index)))
                        .desired_width(f32::INFINITY),
                );
            }
        });
    }
    draft.set_correct_option(correct);

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        let label = if draft.is_editing() {
            "💾 Save Question"
        } else {
            "✔ Submit Question"
        };
        if ui.button(label).clicked() {
            action = Some(FormAction::Submit);
        }
        if ui.button("Clear").clicked() {
            action = Some(FormAction::Clear);
        }
    });

    action
}
