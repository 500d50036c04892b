//! Records exchanged with the question bank API.
//!
//! Field names follow the API's camelCase JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Number of answer options on every question.
pub const OPTION_COUNT: usize = 5;

/// Format a timestamp the way the API stores `createdAt`.
pub fn api_timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Letter shown next to an answer option (`A` to `E`).
pub fn option_label(index: usize) -> char {
    (b'A' + (index % OPTION_COUNT) as u8) as char
}

// ─────────────────────────────────────────────────────────────────────────────
// People
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Professor,
    Coordenador,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Professor => "Professor",
            Role::Coordenador => "Coordinator",
        }
    }
}

/// The signed-in author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// A user known only by name, as configured in the local settings.
    pub fn local(name: &str) -> Self {
        let name = name.trim();
        Self {
            id: if name.is_empty() {
                String::new()
            } else {
                format!("local-{}", name.to_lowercase().replace(' ', "-"))
            },
            name: name.to_string(),
            email: String::new(),
            role: Role::Professor,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Questions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// A stored question as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    /// Older records call this field `category`
    #[serde(alias = "category")]
    pub subject: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Statement markup
    pub statement: String,
    pub options: Vec<String>,
    /// Index of the correct option, 0 to 4
    pub correct_option: usize,
    pub created_at: String,
}

/// Payload posted to create a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSubmission {
    pub subject: String,
    pub tags: Vec<String>,
    pub statement: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub author_id: String,
    pub author_name: String,
    pub created_at: String,
}

impl QuestionSubmission {
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_api_timestamp_matches_iso_format() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(api_timestamp(time), "2024-03-09T14:05:00.000Z");
    }

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(4), 'E');
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Coordenador).unwrap(), "\"coordenador\"");
        let user: User =
            serde_json::from_str(r#"{"id":"u1","name":"Ana","email":"a@x","role":"professor"}"#)
                .unwrap();
        assert_eq!(user.role, Role::Professor);
    }

    #[test]
    fn test_local_user() {
        let user = User::local("  Ana Souza ");
        assert_eq!(user.name, "Ana Souza");
        assert_eq!(user.id, "local-ana-souza");
        assert!(User::local("").id.is_empty());
    }

    #[test]
    fn test_question_accepts_category_alias() {
        let json = r#"{
            "id": "q1", "authorId": "u1", "authorName": "Ana",
            "category": "Física", "statement": "<b>x</b>",
            "options": ["a","b","c","d","e"], "correctOption": 2,
            "createdAt": "2024-01-01T00:00:00.000Z"
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.subject, "Física");
        assert!(question.tags.is_empty());
        assert_eq!(question.correct_option, 2);
    }
}
