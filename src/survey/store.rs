// src/survey/store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::session::{SessionMetadata, SessionPatch, SessionSeed, SessionStatus, SurveySession};

/// Document-store contract for survey sessions.
///
/// `get` returning `None` is a benign not-found, never an error. `update`
/// is a partial merge with last-writer-wins semantics: a session is
/// single-respondent, single-tab in normal operation, so no transaction or
/// version token is used.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a brand-new session: `in_progress`, empty answers, zeroed
    /// progress metadata, server-assigned timestamps. Returns the new id.
    async fn create(&self, seed: SessionSeed) -> Result<String, AppError>;

    async fn get(&self, session_id: &str) -> Result<Option<SurveySession>, AppError>;

    /// Merges the given fields into the stored document and refreshes
    /// `updated_at`. Serves both incremental saves and the terminal
    /// completion write.
    async fn update(&self, session_id: &str, patch: SessionPatch) -> Result<(), AppError>;
}

/// Postgres-backed store. Answers and metadata live in JSONB columns so the
/// document keeps the same shape it has on the wire.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    name: String,
    email: String,
    status: String,
    answers: Value,
    metadata: Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<SessionRow> for SurveySession {
    fn from(row: SessionRow) -> Self {
        SurveySession {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
            status: SessionStatus::parse(&row.status),
            answers: row.answers.as_object().cloned().unwrap_or_default(),
            metadata: serde_json::from_value(row.metadata).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgSessionStore {
    /// All sessions, newest first, optionally narrowed to one status.
    /// Backs the admin results view; not part of the respondent contract.
    pub async fn list(
        &self,
        status: Option<SessionStatus>,
    ) -> Result<Vec<SurveySession>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, email, status, answers, metadata, created_at, updated_at \
             FROM survey_sessions",
        );

        if let Some(status) = status {
            builder.push(" WHERE status = ");
            builder.push_bind(status.as_str());
        }

        builder.push(" ORDER BY created_at DESC");

        let rows: Vec<SessionRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list survey sessions: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

        Ok(rows.into_iter().map(SurveySession::from).collect())
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, seed: SessionSeed) -> Result<String, AppError> {
        let id = Uuid::new_v4();
        let metadata = serde_json::to_value(SessionMetadata::default()).unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO survey_sessions (id, name, email, status, answers, metadata)
            VALUES ($1, $2, $3, 'in_progress', '{}'::jsonb, $4)
            "#,
        )
        .bind(id)
        .bind(&seed.name)
        .bind(&seed.email)
        .bind(metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create survey session: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(id.to_string())
    }

    async fn get(&self, session_id: &str) -> Result<Option<SurveySession>, AppError> {
        // A malformed id cannot match any document; treat it as not-found.
        let Ok(id) = Uuid::parse_str(session_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, name, email, status, answers, metadata, created_at, updated_at
            FROM survey_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch survey session: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(row.map(SurveySession::from))
    }

    async fn update(&self, session_id: &str, patch: SessionPatch) -> Result<(), AppError> {
        let id = Uuid::parse_str(session_id)
            .map_err(|_| AppError::NotFound("Session not found".to_string()))?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE survey_sessions SET updated_at = now()");

        if let Some(answers) = patch.answers {
            builder.push(", answers = ");
            builder.push_bind(Value::Object(answers));
        }

        if let Some(status) = patch.status {
            builder.push(", status = ");
            builder.push_bind(status.as_str());
        }

        if let Some(metadata) = patch.metadata {
            builder.push(", metadata = ");
            builder.push_bind(serde_json::to_value(metadata).unwrap_or_default());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to update survey session: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        Ok(())
    }
}

/// In-memory store used by unit tests (and handy for local experiments).
/// Mirrors the contract of [`PgSessionStore`] exactly.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: std::sync::Mutex<std::collections::HashMap<String, SurveySession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, seed: SessionSeed) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();

        let session = SurveySession {
            id: id.clone(),
            name: seed.name,
            email: seed.email,
            status: SessionStatus::InProgress,
            answers: serde_json::Map::new(),
            metadata: SessionMetadata::default(),
            created_at: now,
            updated_at: now,
        };

        self.sessions
            .lock()
            .map_err(|_| AppError::InternalServerError("session store poisoned".to_string()))?
            .insert(id.clone(), session);

        Ok(id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SurveySession>, AppError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::InternalServerError("session store poisoned".to_string()))?;
        Ok(sessions.get(session_id).cloned())
    }

    async fn update(&self, session_id: &str, patch: SessionPatch) -> Result<(), AppError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::InternalServerError("session store poisoned".to_string()))?;

        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        if let Some(answers) = patch.answers {
            session.answers = answers;
        }
        if let Some(status) = patch.status {
            session.status = status;
        }
        if let Some(metadata) = patch.metadata {
            session.metadata = metadata;
        }
        session.updated_at = chrono::Utc::now();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed() -> SessionSeed {
        SessionSeed {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = MemorySessionStore::new();
        let id = store.create(seed()).await.unwrap();

        let session = store.get(&id).await.unwrap().expect("session exists");
        assert_eq!(session.name, "Jane Doe");
        assert_eq!(session.email, "jane@example.com");
        assert_eq!(session.status, SessionStatus::InProgress);
        assert!(session.answers.is_empty());
        assert_eq!(session.metadata.completion_percentage, 0);
    }

    #[tokio::test]
    async fn get_unknown_id_is_none_not_error() {
        let store = MemorySessionStore::new();
        assert!(store.get("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_partial_fields() {
        let store = MemorySessionStore::new();
        let id = store.create(seed()).await.unwrap();

        let mut answers = serde_json::Map::new();
        answers.insert("q1".to_string(), json!("member_1"));

        store
            .update(
                &id,
                SessionPatch {
                    answers: Some(answers),
                    status: None,
                    metadata: Some(SessionMetadata {
                        last_question_id: Some("q1".to_string()),
                        completion_percentage: 25,
                    }),
                },
            )
            .await
            .unwrap();

        let session = store.get(&id).await.unwrap().unwrap();
        // Status was not part of the patch and must be untouched.
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.answers["q1"], json!("member_1"));
        assert_eq!(session.metadata.last_question_id.as_deref(), Some("q1"));

        store
            .update(
                &id,
                SessionPatch {
                    status: Some(SessionStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let session = store.get(&id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.answers["q1"], json!("member_1"));
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = MemorySessionStore::new();
        let err = store
            .update("missing", SessionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
