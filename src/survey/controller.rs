// src/survey/controller.rs

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::question::{Answer, Question};
use crate::models::session::{SessionMetadata, SessionPatch, SessionSeed, SessionStatus, SurveySession};
use crate::survey::catalog;
use crate::survey::store::SessionStore;

/// Same shape check the landing form applies: local@domain.tld.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Outcome of a forward navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advance {
    Advanced,
    Blocked,
    Completed,
}

/// Creates a new session after validating the landing-step fields.
/// Nothing is written when validation fails.
pub async fn begin<S: SessionStore>(
    store: &S,
    name: &str,
    email: &str,
) -> Result<String, AppError> {
    let name = name.trim();
    let email = email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide both your name and email address.".to_string(),
        ));
    }

    if !EMAIL_SHAPE.is_match(&email) {
        return Err(AppError::BadRequest(
            "Please enter a valid email address.".to_string(),
        ));
    }

    store
        .create(SessionSeed {
            name: name.to_string(),
            email,
        })
        .await
}

/// Drives one respondent's traversal of the questionnaire.
///
/// Holds the working state (typed answer map, current index); the backing
/// store is the source of truth across reloads. Answers are captured in
/// memory and persisted in one batch per advance. The session id is always
/// an explicit argument, never ambient state.
pub struct SessionController<'s, 'q, S: SessionStore> {
    store: &'s S,
    questions: &'q [Question],
    session_id: String,
    status: SessionStatus,
    answers: HashMap<String, Answer>,
    /// Stored entries that no catalog question claims (stale ids, shapes
    /// that no longer type-check). Preserved verbatim on every save: keys
    /// are added or overwritten, never removed.
    extra: Map<String, Value>,
    index: usize,
}

impl<'s, 'q, S: SessionStore> SessionController<'s, 'q, S> {
    /// Loads a session and positions at the question it was last saved on
    /// (index 0 when there is no usable position). An unknown id is a
    /// recoverable `NotFound`: the caller redirects to the landing step.
    pub async fn resume(
        store: &'s S,
        questions: &'q [Question],
        session_id: &str,
    ) -> Result<(SessionController<'s, 'q, S>, SurveySession), AppError> {
        let session = store
            .get(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        let mut answers = HashMap::new();
        let mut extra = Map::new();
        for (question_id, value) in &session.answers {
            let typed = questions
                .iter()
                .find(|q| q.id == *question_id)
                .and_then(|q| Answer::from_stored(q.question_type, value));
            match typed {
                Some(answer) => {
                    answers.insert(question_id.clone(), answer);
                }
                None => {
                    extra.insert(question_id.clone(), value.clone());
                }
            }
        }

        let index = session
            .metadata
            .last_question_id
            .as_deref()
            .and_then(|last| questions.iter().position(|q| q.id == last))
            .unwrap_or(0);

        let controller = SessionController {
            store,
            questions,
            session_id: session.id.clone(),
            status: session.status,
            answers,
            extra,
            index,
        };

        Ok((controller, session))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_question(&self) -> Option<&'q Question> {
        self.questions.get(self.index)
    }

    pub fn answer(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn completion_percentage(&self) -> u8 {
        catalog::completion_of(self.questions, &self.answers)
    }

    /// Positions the working index at the given question.
    pub fn seek(&mut self, question_id: &str) -> Result<(), AppError> {
        self.index = self
            .questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown question '{}'", question_id)))?;
        Ok(())
    }

    /// In-memory capture; no store write until the next advance.
    /// Recording the same question twice keeps the later value.
    pub fn record_answer(&mut self, question_id: &str, answer: Answer) {
        self.answers.insert(question_id.to_string(), answer);
    }

    /// Backward navigation, floored at the first question. Not persisted:
    /// the next advance re-saves the position.
    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Attempts to advance past the current question.
    ///
    /// A required question without a non-empty answer blocks with no state
    /// change and no write. Otherwise the full answer map plus a progress
    /// snapshot is persisted; passing the final question additionally marks
    /// the session completed (a one-way transition).
    pub async fn next(&mut self) -> Result<Advance, AppError> {
        let Some(question) = self.questions.get(self.index) else {
            return Ok(Advance::Completed);
        };

        if question.required
            && !self
                .answers
                .get(&question.id)
                .is_some_and(|a| !a.is_empty())
        {
            return Ok(Advance::Blocked);
        }

        let completion = self.completion_percentage();
        self.store
            .update(
                &self.session_id,
                SessionPatch {
                    answers: Some(self.persistable_answers()),
                    status: None,
                    metadata: Some(SessionMetadata {
                        last_question_id: Some(question.id.clone()),
                        completion_percentage: completion,
                    }),
                },
            )
            .await?;

        if self.index + 1 >= self.questions.len() {
            self.store
                .update(
                    &self.session_id,
                    SessionPatch {
                        answers: None,
                        status: Some(SessionStatus::Completed),
                        metadata: Some(SessionMetadata {
                            last_question_id: None,
                            completion_percentage: 100,
                        }),
                    },
                )
                .await?;
            self.status = SessionStatus::Completed;
            return Ok(Advance::Completed);
        }

        self.index += 1;
        Ok(Advance::Advanced)
    }

    fn persistable_answers(&self) -> Map<String, Value> {
        let mut merged = self.extra.clone();
        for (question_id, answer) in &self.answers {
            merged.insert(question_id.clone(), answer.to_value());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{QuestionOption, QuestionType};
    use crate::survey::store::MemorySessionStore;

    fn question(id: &str, question_type: QuestionType, required: bool) -> Question {
        Question {
            id: id.to_string(),
            question_type,
            title: format!("Question {}", id),
            description: None,
            required,
            options: None,
            scale_min: None,
            scale_max: None,
            scale_labels: None,
            placeholder: None,
            max_length: None,
            max_selections: None,
        }
    }

    fn choice_question(id: &str, required: bool) -> Question {
        let mut q = question(id, QuestionType::MultipleChoice, required);
        q.options = Some(vec![QuestionOption {
            id: "opt1".to_string(),
            label: "Option A".to_string(),
            value: "a".to_string(),
        }]);
        q
    }

    /// Catalog from the end-to-end scenario: two required, one optional.
    fn scenario_questions() -> Vec<Question> {
        vec![
            choice_question("q1", true),
            question("q2", QuestionType::LongText, true),
            question("q3", QuestionType::LongText, false),
        ]
    }

    #[tokio::test]
    async fn begin_then_resume_round_trips() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane Doe", "jane@example.com").await.unwrap();

        let questions = scenario_questions();
        let (controller, session) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();

        assert_eq!(session.name, "Jane Doe");
        assert_eq!(session.email, "jane@example.com");
        assert_eq!(session.status, SessionStatus::InProgress);
        assert!(session.answers.is_empty());
        assert_eq!(controller.index(), 0);
    }

    #[tokio::test]
    async fn begin_normalizes_input() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "  Jane Doe ", " Jane@Example.COM ")
            .await
            .unwrap();

        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.name, "Jane Doe");
        assert_eq!(session.email, "jane@example.com");
    }

    #[tokio::test]
    async fn begin_rejects_missing_or_malformed_fields() {
        let store = MemorySessionStore::new();

        let err = begin(&store, "", "jane@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = begin(&store, "Jane", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = begin(&store, "Jane", "not-an-email").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // Missing TLD fails the local@domain.tld shape.
        let err = begin(&store, "Jane", "jane@example").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn resume_unknown_id_is_not_found() {
        let store = MemorySessionStore::new();
        let questions = scenario_questions();
        let err = SessionController::resume(&store, &questions, "missing")
            .await
            .err()
            .expect("resume of an unknown id should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn current_question_and_answer_track_the_working_state() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        let questions = scenario_questions();
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();

        assert_eq!(
            controller.current_question().map(|q| q.id.as_str()),
            Some("q1")
        );
        assert!(controller.answer("q1").is_none());

        controller.record_answer("q1", Answer::Choice("a".to_string()));
        assert_eq!(
            controller.answer("q1"),
            Some(&Answer::Choice("a".to_string()))
        );

        controller.next().await.unwrap();
        assert_eq!(
            controller.current_question().map(|q| q.id.as_str()),
            Some("q2")
        );
    }

    #[tokio::test]
    async fn blocked_leaves_everything_unchanged() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        let questions = scenario_questions();
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();

        assert_eq!(controller.next().await.unwrap(), Advance::Blocked);
        assert_eq!(controller.index(), 0);
        assert_eq!(controller.status(), SessionStatus::InProgress);

        let session = store.get(&id).await.unwrap().unwrap();
        assert!(session.answers.is_empty());
        assert_eq!(session.status, SessionStatus::InProgress);
        assert!(session.metadata.last_question_id.is_none());
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        let questions = scenario_questions();
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();

        controller.record_answer("q1", Answer::Choice("a".to_string()));
        assert_eq!(controller.next().await.unwrap(), Advance::Advanced);
        assert_eq!(controller.index(), 1);

        // Q2 is required and unanswered.
        assert_eq!(controller.next().await.unwrap(), Advance::Blocked);
        assert_eq!(controller.index(), 1);

        controller.record_answer("q2", Answer::Text("thoughts".to_string()));
        assert_eq!(controller.next().await.unwrap(), Advance::Advanced);
        assert_eq!(controller.index(), 2);
        assert_eq!(controller.completion_percentage(), 100);

        // Q3 is optional: advancing unanswered completes the survey.
        assert_eq!(controller.next().await.unwrap(), Advance::Completed);
        assert_eq!(controller.status(), SessionStatus::Completed);

        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.metadata.completion_percentage, 100);
        assert_eq!(session.answers["q1"], serde_json::json!("a"));
        assert_eq!(session.answers["q2"], serde_json::json!("thoughts"));
    }

    #[tokio::test]
    async fn completion_percentage_is_monotonic_across_a_traversal() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        let questions = scenario_questions();
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();

        let mut last = 0;
        controller.record_answer("q1", Answer::Choice("a".to_string()));
        controller.next().await.unwrap();
        let store_pct = store.get(&id).await.unwrap().unwrap().metadata.completion_percentage;
        assert!(store_pct >= last);
        last = store_pct;

        controller.record_answer("q2", Answer::Text("x".to_string()));
        controller.next().await.unwrap();
        let store_pct = store.get(&id).await.unwrap().unwrap().metadata.completion_percentage;
        assert!(store_pct >= last);
        last = store_pct;

        controller.next().await.unwrap();
        let store_pct = store.get(&id).await.unwrap().unwrap().metadata.completion_percentage;
        assert!(store_pct >= last);
        assert_eq!(store_pct, 100);
    }

    #[tokio::test]
    async fn resume_restores_position_from_last_question_id() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        let questions = scenario_questions();
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();

        controller.record_answer("q1", Answer::Choice("a".to_string()));
        controller.next().await.unwrap();
        controller.record_answer("q2", Answer::Text("x".to_string()));
        controller.next().await.unwrap();

        // Last save happened on q2, so a reload resumes there, not at 0.
        let (resumed, session) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();
        assert_eq!(resumed.index(), 1);
        assert_eq!(session.metadata.last_question_id.as_deref(), Some("q2"));
    }

    #[tokio::test]
    async fn record_answer_keeps_the_later_value() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        let questions = scenario_questions();
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();

        controller.record_answer("q1", Answer::Choice("first".to_string()));
        controller.record_answer("q1", Answer::Choice("a".to_string()));
        controller.next().await.unwrap();

        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.answers["q1"], serde_json::json!("a"));
    }

    #[tokio::test]
    async fn previous_floors_at_zero_and_does_not_persist() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        let questions = scenario_questions();
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();

        controller.previous();
        assert_eq!(controller.index(), 0);

        controller.record_answer("q1", Answer::Choice("a".to_string()));
        controller.next().await.unwrap();
        assert_eq!(controller.index(), 1);
        controller.previous();
        assert_eq!(controller.index(), 0);

        // Backward navigation alone never touches the stored position.
        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.metadata.last_question_id.as_deref(), Some("q1"));
    }

    #[tokio::test]
    async fn completed_is_terminal() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        let questions = vec![question("only", QuestionType::ShortText, false)];
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();
        assert_eq!(controller.next().await.unwrap(), Advance::Completed);

        let (resumed, session) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(resumed.status(), SessionStatus::Completed);
    }

    #[tokio::test]
    async fn stale_answer_entries_survive_saves() {
        let store = MemorySessionStore::new();
        let id = begin(&store, "Jane", "jane@example.com").await.unwrap();

        // Simulate an answer stored under a question id the catalog no
        // longer declares.
        let mut stale = Map::new();
        stale.insert("retired_q".to_string(), serde_json::json!("old value"));
        store
            .update(
                &id,
                SessionPatch {
                    answers: Some(stale),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let questions = scenario_questions();
        let (mut controller, _) = SessionController::resume(&store, &questions, &id)
            .await
            .unwrap();
        controller.record_answer("q1", Answer::Choice("a".to_string()));
        controller.next().await.unwrap();

        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.answers["retired_q"], serde_json::json!("old value"));
        assert_eq!(session.answers["q1"], serde_json::json!("a"));
    }
}
