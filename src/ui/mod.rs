//! UI components for QBank
//!
//! This module contains the widgets and dialogs of the question editor.

mod image_dialog;
mod question_form;
mod settings;
mod statement_view;
mod toolbar;

pub use image_dialog::{ImageDialog, ImageDialogResult};
pub use question_form::{show_header, show_options, FormAction, FormInputs};
pub use settings::SettingsPanel;
pub use statement_view::{PreviewAction, StatementView};
pub use toolbar::{show_toolbar, ToolbarAction};
