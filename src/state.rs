//! Application state management for QBank
//!
//! This module defines the central `AppState` struct that holds the question
//! draft being authored, the subject catalog, settings and transient UI
//! state such as the image dialog, an in-flight upload and toast messages.

use crate::config::{load_config, save_config_silent, Settings};
use crate::editor::{FileInfo, PendingUpload, StatementEditor, UploadLimits};
use crate::error::{Error, Result};
use crate::question::{Question, QuestionDraft, QuestionSubmission, SubjectCatalog, User};
use crate::ui::{FormInputs, ImageDialog};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// Tags offered as one-click suggestions on the form.
const SUGGESTED_TAGS: &[&str] = &["enem", "vestibular", "fixação", "revisão", "desafio"];

/// Subjects available before the author adds their own.
const DEFAULT_SUBJECTS: &[&str] = &["Matemática", "Física", "Química", "Biologia", "História"];

// ─────────────────────────────────────────────────────────────────────────────
// UI State
// ─────────────────────────────────────────────────────────────────────────────

/// Transient UI state, never persisted.
#[derive(Debug, Default)]
pub struct UiState {
    /// Open Insert Image dialog
    pub image_dialog: Option<ImageDialog>,
    /// File read started from the image dialog
    pub pending_upload: Option<PendingUpload>,
    /// Whether the settings panel is open
    pub show_settings: bool,
    /// Form inputs that don't belong to the draft
    pub form: FormInputs,
    /// JSON of the last prepared submission
    pub last_submission: Option<String>,
    /// Toast message shown at the bottom of the window
    pub toast_message: Option<String>,
    /// When the toast expires (app time in seconds)
    pub toast_expires_at: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// App State
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    settings_dirty: bool,
    pub draft: QuestionDraft,
    pub subjects: SubjectCatalog,
    pub suggested_tags: Vec<String>,
    pub ui: UiState,
}

impl AppState {
    /// Create the state from the persisted settings.
    pub fn new() -> Self {
        Self::with_settings(load_config())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let mut subjects = SubjectCatalog::default();
        let now = Utc::now();
        for name in DEFAULT_SUBJECTS {
            subjects.add(name, now);
        }

        let draft = new_draft(&settings);
        Self {
            settings,
            settings_dirty: false,
            draft,
            subjects,
            suggested_tags: SUGGESTED_TAGS.iter().map(|t| t.to_string()).collect(),
            ui: UiState::default(),
        }
    }

    /// Start over with an empty draft.
    pub fn reset_draft(&mut self) {
        self.draft = new_draft(&self.settings);
        self.ui.form = FormInputs::default();
        debug!("Draft cleared");
    }

    /// Load a stored question (API JSON) into the form for editing.
    ///
    /// The draft is only replaced once the file has been read and parsed.
    pub fn open_question(&mut self, path: &Path, now: DateTime<Utc>) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let question: Question =
            serde_json::from_str(&content).map_err(|source| Error::QuestionParse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            "Editing question {} by {} ({}), created {}",
            question.id, question.author_name, question.author_id, question.created_at
        );

        self.subjects.add(&question.subject, now);
        let mut draft =
            QuestionDraft::from_question(&question, User::local(&self.settings.author_name));
        draft.statement.set_reconciliation(self.settings.reconciliation);
        draft
            .statement
            .set_upload_limits(UploadLimits::from(&self.settings));
        self.draft = draft;
        self.ui.form = FormInputs::default();
        self.ui.last_submission = None;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply edited settings to the live editor and schedule a save.
    pub fn apply_settings(&mut self) {
        self.settings.sanitize();
        let statement = &mut self.draft.statement;
        statement.set_reconciliation(self.settings.reconciliation);
        statement.set_upload_limits(UploadLimits::from(&self.settings));
        if !self.draft.is_editing() {
            self.draft.author = User::local(&self.settings.author_name);
        }
        self.mark_settings_dirty();
    }

    pub fn reset_settings(&mut self) {
        let window_size = self.settings.window_size;
        self.settings = Settings {
            window_size,
            ..Settings::default()
        };
        self.apply_settings();
        info!("Settings reset to defaults");
    }

    pub fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Save settings to config file if modified.
    ///
    /// Returns `true` if settings were saved.
    pub fn save_settings_if_dirty(&mut self) -> bool {
        if self.settings_dirty {
            if save_config_silent(&self.settings) {
                self.settings_dirty = false;
                info!("Settings saved");
                return true;
            }
            warn!("Failed to save settings");
        }
        false
    }

    pub fn shutdown(&mut self) {
        self.mark_settings_dirty();
        self.save_settings_if_dirty();
        info!("AppState shutdown complete");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Images
    // ─────────────────────────────────────────────────────────────────────────

    pub fn open_image_dialog(&mut self) {
        self.ui.image_dialog = Some(ImageDialog::new());
    }

    /// Close the dialog and drop any in-flight upload.
    pub fn close_image_dialog(&mut self) {
        self.ui.image_dialog = None;
        if let Some(upload) = self.ui.pending_upload.take() {
            debug!("Abandoning upload of {}", upload.info().name);
        }
    }

    pub fn insert_image_url(&mut self, url: &str) -> Result<()> {
        self.draft.statement.insert_image_from_url(url)?;
        self.close_image_dialog();
        Ok(())
    }

    /// Probe and validate a picked file, then start reading it.
    ///
    /// Files that are not images or are too large are rejected here, before
    /// their contents are read.
    pub fn begin_upload(&mut self, path: &Path) -> Result<()> {
        let info = FileInfo::probe(path)?;
        if let Err(err) = info.validate(self.draft.statement.upload_limits()) {
            warn!("Rejected image upload '{}': {}", info.name, err);
            return Err(err);
        }

        if let Some(dir) = path.parent() {
            if self.settings.last_image_directory.as_deref() != Some(dir) {
                self.settings.last_image_directory = Some(dir.to_path_buf());
                self.mark_settings_dirty();
            }
        }

        info!("Reading image {} ({} bytes)", info.name, info.byte_size);
        if let Some(dialog) = &mut self.ui.image_dialog {
            dialog.loading = Some(info.name.clone());
        }
        self.ui.pending_upload = Some(PendingUpload::start(info));
        Ok(())
    }

    /// Apply a finished upload to the statement.
    ///
    /// Returns `None` while nothing has finished, otherwise the outcome of
    /// the insertion.
    pub fn poll_upload(&mut self) -> Option<Result<()>> {
        let result = self.ui.pending_upload.as_ref()?.poll()?;
        self.ui.pending_upload = None;

        let outcome = result
            .and_then(|file| self.draft.statement.insert_image_from_file(&file))
            .map(|_| ());
        match &outcome {
            Ok(()) => self.ui.image_dialog = None,
            Err(err) => {
                if let Some(dialog) = &mut self.ui.image_dialog {
                    dialog.set_error(err.to_string());
                }
            }
        }
        Some(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Build the submission payload and keep its JSON for display.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<QuestionSubmission> {
        let submission = self.draft.to_submission(now)?;
        let json = submission.to_json_pretty()?;
        info!("Question payload:\n{}", json);
        self.ui.last_submission = Some(json);
        Ok(submission)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // UI State Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Show a toast message for `duration` seconds.
    pub fn show_toast(&mut self, message: impl Into<String>, current_time: f64, duration: f64) {
        self.ui.toast_message = Some(message.into());
        self.ui.toast_expires_at = Some(current_time + duration);
    }

    /// Update toast state - clears expired toasts.
    ///
    /// Call this each frame with the current time.
    pub fn update_toast(&mut self, current_time: f64) {
        if let Some(expires_at) = self.ui.toast_expires_at {
            if current_time >= expires_at {
                self.ui.toast_message = None;
                self.ui.toast_expires_at = None;
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn new_draft(settings: &Settings) -> QuestionDraft {
    let mut draft = QuestionDraft::new(User::local(&settings.author_name));
    draft.statement = StatementEditor::with_settings("", settings);
    draft
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Reconciliation;
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn state() -> AppState {
        AppState::with_settings(Settings {
            author_name: "Ana".to_string(),
            ..Settings::default()
        })
    }

    fn wait_for_upload(state: &mut AppState) -> Result<()> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = state.poll_upload() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "upload never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_new_state_has_default_subjects() {
        let state = state();
        assert_eq!(state.subjects.subjects().len(), DEFAULT_SUBJECTS.len());
        assert_eq!(state.draft.author.name, "Ana");
        assert!(state.draft.statement.is_empty());
    }

    #[test]
    fn test_upload_inserts_image_and_closes_dialog() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("grafico.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let mut state = state();
        state.open_image_dialog();
        state.begin_upload(&path).unwrap();
        assert!(state.ui.pending_upload.is_some());
        assert_eq!(state.settings.last_image_directory.as_deref(), Some(temp.path()));

        wait_for_upload(&mut state).unwrap();
        assert!(state.ui.image_dialog.is_none());
        assert!(state.ui.pending_upload.is_none());

        let images = state.draft.statement.images();
        assert_eq!(images.len(), 1);
        assert!(images[0].src.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_text_file_is_rejected_before_reading() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notas.txt");
        std::fs::write(&path, "not an image").unwrap();

        let mut state = state();
        state.open_image_dialog();
        let err = state.begin_upload(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedImageType { .. }));
        assert!(state.ui.pending_upload.is_none());
        assert!(state.draft.statement.images().is_empty());
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("grande.png");
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(2 * 1024 * 1024, 0);
        std::fs::write(&path, bytes).unwrap();

        let mut state = state();
        state.settings.max_upload_bytes = 1024 * 1024;
        state.apply_settings();
        assert!(matches!(
            state.begin_upload(&path),
            Err(Error::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_insert_url_closes_dialog() {
        let mut state = state();
        state.open_image_dialog();
        assert!(state.insert_image_url("").is_err());
        assert!(state.ui.image_dialog.is_some());

        state.insert_image_url("http://x/y.png").unwrap();
        assert!(state.ui.image_dialog.is_none());
        assert_eq!(state.draft.statement.images().len(), 1);
    }

    #[test]
    fn test_apply_settings_reaches_editor() {
        let mut state = state();
        state.settings.reconciliation = Reconciliation::PreserveImages;
        state.settings.author_name = "Bia".to_string();
        state.apply_settings();
        assert_eq!(
            state.draft.statement.reconciliation(),
            Reconciliation::PreserveImages
        );
        assert_eq!(state.draft.author.name, "Bia");
    }

    #[test]
    fn test_submit_keeps_payload_json() {
        let mut state = state();
        assert!(state.submit(Utc::now()).is_err());
        assert!(state.ui.last_submission.is_none());

        state.draft.subject = "Física".to_string();
        state.draft.statement.set_markup("Enunciado");
        for i in 0..5 {
            state.draft.set_option(i, format!("opção {}", i));
        }
        let submission = state.submit(Utc::now()).unwrap();
        assert_eq!(submission.author_name, "Ana");
        assert!(state
            .ui
            .last_submission
            .as_deref()
            .unwrap()
            .contains("\"correctOption\": 0"));
    }

    #[test]
    fn test_closing_dialog_discards_late_upload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("grafico.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let mut state = state();
        state.open_image_dialog();
        state.begin_upload(&path).unwrap();
        state.close_image_dialog();

        // Give the reader thread time to finish; its result has nowhere to go
        thread::sleep(Duration::from_millis(50));
        assert!(state.poll_upload().is_none());
        assert!(state.ui.pending_upload.is_none());
        assert!(state.draft.statement.images().is_empty());
    }

    #[test]
    fn test_open_question_loads_draft_for_editing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("q1.json");
        std::fs::write(
            &path,
            r#"{
                "id": "q1", "authorId": "u9", "authorName": "Rui",
                "subject": "Astronomia", "tags": ["enem"],
                "statement": "Veja:<br><img src=\"x.png\" style=\"width: 40px; height: 30px;\" data-id=\"img-1\" /><br>",
                "options": ["a", "b", "c", "d", "e"], "correctOption": 3,
                "createdAt": "2024-01-01T00:00:00.000Z"
            }"#,
        )
        .unwrap();

        let mut state = state();
        state.settings.reconciliation = Reconciliation::PreserveImages;
        state.open_question(&path, Utc::now()).unwrap();

        assert!(state.draft.is_editing());
        assert_eq!(state.draft.subject, "Astronomia");
        assert!(state.subjects.find("astronomia").is_some());
        assert_eq!(state.draft.tags(), ["enem"]);
        assert_eq!(state.draft.correct_option(), 3);
        assert_eq!(state.draft.author.name, "Ana");
        assert_eq!(
            state.draft.statement.reconciliation(),
            Reconciliation::PreserveImages
        );

        let images = state.draft.statement.images();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width, images[0].height), (40, 30));
    }

    #[test]
    fn test_open_invalid_question_keeps_draft() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notas.json");
        std::fs::write(&path, r#"{"titulo": "x"}"#).unwrap();

        let mut state = state();
        state.draft.statement.set_markup("Rascunho");
        let err = state.open_question(&path, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::QuestionParse { .. }));
        assert!(!state.draft.is_editing());
        assert_eq!(state.draft.statement.markup(), "Rascunho");

        let missing = temp.path().join("ausente.json");
        assert!(matches!(
            state.open_question(&missing, Utc::now()),
            Err(Error::FileRead { .. })
        ));
    }

    #[test]
    fn test_toast_expires() {
        let mut state = state();
        state.show_toast("Saved", 1.0, 2.0);
        state.update_toast(2.5);
        assert!(state.ui.toast_message.is_some());
        state.update_toast(3.0);
        assert!(state.ui.toast_message.is_none());
    }
}
