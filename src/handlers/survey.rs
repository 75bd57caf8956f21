// src/handlers/survey.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::question::Question,
    survey::{
        catalog,
        controller::{self, Advance, SessionController},
        renderer::{self, Affordance},
        store::PgSessionStore,
    },
};

/// A catalog entry together with the input affordance the client should
/// render for it.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    #[serde(flatten)]
    pub question: &'static Question,
    pub affordance: Affordance,
}

/// Returns the full questionnaire in display order.
pub async fn list_questions() -> impl IntoResponse {
    let views: Vec<QuestionView> = catalog::all()
        .iter()
        .map(|question| QuestionView {
            question,
            affordance: renderer::affordance(question, None),
        })
        .collect();

    Json(views)
}

#[derive(Debug, Deserialize)]
pub struct BeginSessionRequest {
    pub name: String,
    pub email: String,
}

/// Starts a new survey session from the landing step.
/// Returns 201 and the session id used by the take-flow URLs.
pub async fn begin_session(
    State(pool): State<PgPool>,
    Json(payload): Json<BeginSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = PgSessionStore::new(pool);
    let id = controller::begin(&store, &payload.name, &payload.email).await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Fetches a session for resumption (or for the completion view's
/// read-only lookup). 404 means "no such session": the client starts over.
pub async fn get_session(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let store = PgSessionStore::new(pool);
    let (controller, session) = SessionController::resume(&store, catalog::all(), &id).await?;

    // Seed the resumed question's widget with its stored answer so the
    // client re-renders exactly what the respondent last saw.
    let current = controller.current_question().map(|question| QuestionView {
        question,
        affordance: renderer::affordance(question, controller.answer(&question.id)),
    });

    Ok(Json(json!({
        "session": session,
        "starting_index": controller.index(),
        "total_questions": catalog::total(),
        "current_question": current,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    /// The question the respondent is advancing past.
    pub current_question_id: String,
    /// Raw answer values captured by the client since the last save,
    /// keyed by question id.
    #[serde(default)]
    pub answers: Map<String, Value>,
}

/// Records the submitted answers and attempts to advance past the current
/// question. The response outcome is one of `advanced`, `blocked` (required
/// question unanswered; nothing was persisted) or `completed`.
pub async fn advance_session(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
    Json(payload): Json<AdvanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = PgSessionStore::new(pool);
    let (mut controller, _) = SessionController::resume(&store, catalog::all(), &id).await?;

    controller.seek(&payload.current_question_id)?;

    for (question_id, raw) in &payload.answers {
        let question = catalog::by_id(question_id)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown question '{}'", question_id)))?;
        let answer = renderer::normalize(question, raw)?;
        controller.record_answer(question_id, answer);
    }

    let outcome = controller.next().await?;

    let mut body = json!({
        "outcome": outcome,
        "index": controller.index(),
        "status": controller.status(),
        "completion_percentage": controller.completion_percentage(),
    });
    if outcome == Advance::Blocked {
        body["message"] = json!("Please answer this question before continuing.");
    }

    Ok(Json(body))
}
