// src/models/session.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Survey session lifecycle. The only transition is
/// `InProgress -> Completed`; completed sessions are never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => SessionStatus::Completed,
            "in_progress" => SessionStatus::InProgress,
            other => {
                tracing::warn!("Unrecognized session status '{}', treating as in_progress", other);
                SessionStatus::InProgress
            }
        }
    }
}

/// Progress snapshot persisted alongside the answers on every advance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// The question the respondent was on at last save; used to resume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_question_id: Option<String>,
    /// Fraction of required questions answered, 0-100. Advisory only.
    #[serde(default)]
    pub completion_percentage: u8,
}

/// One respondent's attempt at the questionnaire, as stored.
///
/// `answers` keeps the raw document representation (question id to JSON
/// value); the controller materializes typed [`Answer`] values from it.
///
/// [`Answer`]: crate::models::question::Answer
#[derive(Debug, Clone, Serialize)]
pub struct SurveySession {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: SessionStatus,
    pub answers: Map<String, Value>,
    pub metadata: SessionMetadata,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Fields captured once at session creation.
#[derive(Debug, Clone)]
pub struct SessionSeed {
    pub name: String,
    pub email: String,
}

/// Partial update merged into a stored session. `None` fields are left
/// untouched; `updated_at` is refreshed on every call.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub answers: Option<Map<String, Value>>,
    pub status: Option<SessionStatus>,
    pub metadata: Option<SessionMetadata>,
}
