//! Question form state
//!
//! `QuestionDraft` holds everything the author fills in before submitting:
//! subject, tags, the statement editor, the five options and the correct
//! answer. `SubjectCatalog` is the list of subjects offered by the form.

use super::model::{api_timestamp, Question, QuestionSubmission, Subject, User, OPTION_COUNT};
use crate::editor::StatementEditor;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Question Draft
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct QuestionDraft {
    /// Who the submission is attributed to
    pub author: User,
    /// Selected subject name
    pub subject: String,
    tags: Vec<String>,
    pub statement: StatementEditor,
    options: [String; OPTION_COUNT],
    correct_option: usize,
    /// Id of the stored question being edited, if any
    editing: Option<String>,
}

impl QuestionDraft {
    pub fn new(author: User) -> Self {
        Self {
            author,
            subject: String::new(),
            tags: Vec::new(),
            statement: StatementEditor::default(),
            options: Default::default(),
            correct_option: 0,
            editing: None,
        }
    }

    /// Start a draft from a stored question, for editing.
    pub fn from_question(question: &Question, author: User) -> Self {
        let mut draft = Self::new(author);
        draft.subject = question.subject.clone();
        for tag in &question.tags {
            draft.add_tag(tag);
        }
        draft.statement.set_markup(question.statement.clone());
        for (index, option) in question.options.iter().take(OPTION_COUNT).enumerate() {
            draft.options[index] = option.clone();
        }
        draft.set_correct_option(question.correct_option);
        draft.editing = Some(question.id.clone());
        draft
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tags
    // ─────────────────────────────────────────────────────────────────────────

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Add a tag from user input. Returns `false` for blank or duplicate input.
    pub fn add_tag(&mut self, input: &str) -> bool {
        let tag = input.trim();
        if tag.is_empty() || self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a suggested tag if the draft doesn't carry it yet.
    pub fn toggle_suggested_tag(&mut self, tag: &str) {
        if !self.has_tag(tag) {
            self.tags.push(tag.to_string());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Options
    // ─────────────────────────────────────────────────────────────────────────

    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    /// Mutable access for text fields bound to an option.
    pub fn option_mut(&mut self, index: usize) -> Option<&mut String> {
        self.options.get_mut(index)
    }

    pub fn set_option(&mut self, index: usize, text: impl Into<String>) {
        if let Some(option) = self.options.get_mut(index) {
            *option = text.into();
        }
    }

    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    pub fn set_correct_option(&mut self, index: usize) {
        if index < OPTION_COUNT {
            self.correct_option = index;
        } else {
            debug!("Ignoring correct option {} (only {} options)", index, OPTION_COUNT);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Check that every required field is filled in.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.subject.trim().is_empty() {
            missing.push("subject");
        }
        if self.statement.is_empty() {
            missing.push("statement");
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            missing.push("options");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::IncompleteQuestion { missing })
        }
    }

    /// Build the payload for the API, stamped with `now`.
    pub fn to_submission(&self, now: DateTime<Utc>) -> Result<QuestionSubmission> {
        self.validate()?;
        let submission = QuestionSubmission {
            subject: self.subject.trim().to_string(),
            tags: self.tags.clone(),
            statement: self.statement.markup().to_string(),
            options: self.options.to_vec(),
            correct_option: self.correct_option,
            author_id: self.author.id.clone(),
            author_name: self.author.name.clone(),
            created_at: api_timestamp(now),
        };
        info!(
            "Prepared question for '{}' with {} image(s)",
            submission.subject,
            self.statement.images().len()
        );
        Ok(submission)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subject Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SubjectCatalog {
    subjects: Vec<Subject>,
}

impl SubjectCatalog {
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn find(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| same_name(&s.name, name))
    }

    /// Add a subject by name, returning the existing entry when one with the
    /// same name (ignoring case) is already listed.
    ///
    /// Returns `None` for a blank name.
    pub fn add(&mut self, name: &str, now: DateTime<Utc>) -> Option<&Subject> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if self.find(name).is_some() {
            return self.find(name);
        }

        self.subjects.push(Subject {
            id: format!("subject-{}", self.subjects.len() + 1),
            name: name.to_string(),
            created_at: api_timestamp(now),
        });
        if let Some(subject) = self.subjects.last() {
            debug!("Added subject '{}' as {}", subject.name, subject.id);
        }
        self.subjects.last()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn complete_draft() -> QuestionDraft {
        let mut draft = QuestionDraft::new(User::local("Ana"));
        draft.subject = "Física".to_string();
        draft.statement.set_markup("Qual a velocidade?");
        for (i, text) in ["1 m/s", "2 m/s", "3 m/s", "4 m/s", "5 m/s"].iter().enumerate() {
            draft.set_option(i, *text);
        }
        draft
    }

    #[test]
    fn test_add_tag_trims_and_deduplicates() {
        let mut draft = QuestionDraft::new(User::default());
        assert!(draft.add_tag("  cinemática "));
        assert!(!draft.add_tag("cinemática"));
        assert!(!draft.add_tag("   "));
        assert_eq!(draft.tags(), ["cinemática"]);

        draft.remove_tag("cinemática");
        assert!(draft.tags().is_empty());
    }

    #[test]
    fn test_suggested_tag_added_once() {
        let mut draft = QuestionDraft::new(User::default());
        draft.toggle_suggested_tag("enem");
        draft.toggle_suggested_tag("enem");
        assert_eq!(draft.tags(), ["enem"]);
    }

    #[test]
    fn test_correct_option_bounds() {
        let mut draft = QuestionDraft::new(User::default());
        draft.set_correct_option(4);
        assert_eq!(draft.correct_option(), 4);
        draft.set_correct_option(5);
        assert_eq!(draft.correct_option(), 4);
    }

    #[test]
    fn test_set_option_out_of_range_is_ignored() {
        let mut draft = QuestionDraft::new(User::default());
        draft.set_option(9, "x");
        assert!(draft.options().iter().all(String::is_empty));
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let draft = QuestionDraft::new(User::default());
        match draft.validate() {
            Err(Error::IncompleteQuestion { missing }) => {
                assert_eq!(missing, vec!["subject", "statement", "options"]);
            }
            other => panic!("expected IncompleteQuestion, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_option_fails_validation() {
        let mut draft = complete_draft();
        draft.set_option(2, "   ");
        assert!(matches!(
            draft.validate(),
            Err(Error::IncompleteQuestion { ref missing }) if missing == &vec!["options"]
        ));
    }

    #[test]
    fn test_submission_payload() {
        let mut draft = complete_draft();
        draft.add_tag("mru");
        draft.set_correct_option(1);
        draft.statement.insert_image("http://x/y.png", "Imagem").unwrap();

        let submission = draft.to_submission(now()).unwrap();
        assert_eq!(submission.subject, "Física");
        assert_eq!(submission.correct_option, 1);
        assert_eq!(submission.author_name, "Ana");
        assert_eq!(submission.created_at, "2024-05-01T12:00:00.000Z");
        assert!(submission.statement.contains("<img src=\"http://x/y.png\""));

        let json: serde_json::Value =
            serde_json::from_str(&submission.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["correctOption"], 1);
        assert_eq!(json["authorId"], "local-ana");
        assert_eq!(json["options"].as_array().unwrap().len(), 5);
        assert_eq!(json["tags"][0], "mru");
    }

    #[test]
    fn test_incomplete_draft_has_no_submission() {
        let mut draft = complete_draft();
        draft.subject.clear();
        assert!(draft.to_submission(now()).is_err());
    }

    #[test]
    fn test_from_question_round_trip() {
        let question = Question {
            id: "q7".to_string(),
            author_id: "u1".to_string(),
            author_name: "Ana".to_string(),
            subject: "Química".to_string(),
            tags: vec!["ácidos".to_string(), "ácidos".to_string()],
            statement: r#"Veja<br><img src="a.png" data-id="img-1" /><br>"#.to_string(),
            options: vec!["a", "b", "c", "d", "e"].into_iter().map(String::from).collect(),
            correct_option: 3,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        };

        let draft = QuestionDraft::from_question(&question, User::local("Ana"));
        assert!(draft.is_editing());
        assert_eq!(draft.tags(), ["ácidos"]);
        assert_eq!(draft.statement.markup(), question.statement);
        assert_eq!(draft.statement.images().len(), 1);
        assert_eq!(draft.correct_option(), 3);
        assert_eq!(draft.options()[4], "e");
    }

    #[test]
    fn test_catalog_returns_existing_subject() {
        let mut catalog = SubjectCatalog::default();
        let id = catalog.add("Matemática", now()).unwrap().id.clone();
        let again = catalog.add("  MATEMÁTICA ", now()).unwrap();
        assert_eq!(again.id, id);
        assert_eq!(catalog.subjects().len(), 1);

        catalog.add("Biologia", now());
        assert_eq!(catalog.subjects().len(), 2);
        assert!(catalog.add("  ", now()).is_none());
        assert_eq!(catalog.find("biologia").unwrap().name, "Biologia");
    }
}
