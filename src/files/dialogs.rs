//! Native file dialog integration using the rfd crate
//!
//! This module opens the native pickers used to choose a local image for
//! the statement and a stored question to edit.

use rfd::FileDialog;
use std::path::{Path, PathBuf};

/// File extension filters for images the preview can decode.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

const QUESTION_EXTENSIONS: &[&str] = &["json"];

/// Opens a native file dialog for selecting one image.
///
/// All files are offered as well so that non-image selections reach
/// validation and get a proper error message.
/// Returns `Some(PathBuf)` if a file was selected, `None` if cancelled.
pub fn open_image_dialog(initial_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Select Image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .add_filter("All Files", &["*"]);

    if let Some(dir) = initial_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_file()
}

/// Opens a native file dialog for selecting a stored question (JSON).
pub fn open_question_dialog() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Open Question")
        .add_filter("Question JSON", QUESTION_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .pick_file()
}
