// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::application::{JOB_STATUSES, JobApplication, MEMBERSHIP_STATUSES, MembershipApplication},
    models::session::SessionStatus,
    survey::store::PgSessionStore,
};

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

fn check_status(status: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Unknown status '{}' (expected one of {})",
            status,
            allowed.join(", ")
        )))
    }
}

/// Lists job applications for the candidate tracker, newest first.
/// Admin only.
pub async fn list_job_applications(
    State(pool): State<PgPool>,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, full_name, email, phone, linkedin, current_position, current_company, \
         cv_url, photo_url, motivation, selected_roles, notes, status, submitted_at \
         FROM job_applications",
    );

    if let Some(status) = &filter.status {
        check_status(status, JOB_STATUSES)?;
        builder.push(" WHERE status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY submitted_at DESC");

    let applications: Vec<JobApplication> = builder
        .build_query_as()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list job applications: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(applications))
}

/// DTO for moving a candidate through the pipeline. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateJobApplicationRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Updates a job application's status and/or reviewer notes.
/// Admin only.
pub async fn update_job_application(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateJobApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.status.is_none() && payload.notes.is_none() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE job_applications SET ");
    let mut separated = builder.separated(", ");

    if let Some(status) = payload.status {
        check_status(&status, JOB_STATUSES)?;
        separated.push("status = ");
        separated.push_bind_unseparated(status);
    }

    if let Some(notes) = payload.notes {
        separated.push("notes = ");
        separated.push_bind_unseparated(notes);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update job application: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Job application not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Lists membership applications, newest first.
/// Admin only.
pub async fn list_membership_applications(
    State(pool): State<PgPool>,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, full_name, gender, address, country, telephone1, telephone2, email, \
         linkedin, date_of_birth, nationality, occupation, company_name, company_address, \
         personal_interests, personal_biography, membership_type, status, submitted_at \
         FROM membership_applications",
    );

    if let Some(status) = &filter.status {
        check_status(status, MEMBERSHIP_STATUSES)?;
        builder.push(" WHERE status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY submitted_at DESC");

    let applications: Vec<MembershipApplication> = builder
        .build_query_as()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list membership applications: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(applications))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMembershipApplicationRequest {
    pub status: Option<String>,
}

/// Updates a membership application's review status.
/// Admin only.
pub async fn update_membership_application(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMembershipApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(status) = payload.status else {
        return Ok(StatusCode::OK);
    };
    check_status(&status, MEMBERSHIP_STATUSES)?;

    let result = sqlx::query("UPDATE membership_applications SET status = $1 WHERE id = $2")
        .bind(&status)
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update membership application: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Membership application not found".to_string(),
        ));
    }

    Ok(StatusCode::OK)
}

/// Lists survey sessions for the results view, optionally filtered to
/// `in_progress` or `completed`. Admin only.
pub async fn list_survey_sessions(
    State(pool): State<PgPool>,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, AppError> {
    let status = match filter.status.as_deref() {
        None => None,
        Some("in_progress") => Some(SessionStatus::InProgress),
        Some("completed") => Some(SessionStatus::Completed),
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown status '{}' (expected in_progress or completed)",
                other
            )));
        }
    };

    let store = PgSessionStore::new(pool);
    let sessions = store.list(status).await?;

    Ok(Json(sessions))
}
