// src/handlers/applications.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::application::{JobApplicationRequest, MembershipApplicationRequest},
};

/// Accepts a membership application from the brochure flow.
/// Stored as 'pending' with a server-assigned timestamp.
pub async fn submit_membership_application(
    State(pool): State<PgPool>,
    Json(payload): Json<MembershipApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO membership_applications
        (full_name, gender, address, country, telephone1, telephone2, email, linkedin,
         date_of_birth, nationality, occupation, company_name, company_address,
         personal_interests, personal_biography, membership_type, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, 'pending')
        RETURNING id
        "#,
    )
    .bind(&payload.full_name)
    .bind(&payload.gender)
    .bind(&payload.address)
    .bind(&payload.country)
    .bind(&payload.telephone1)
    .bind(&payload.telephone2)
    .bind(payload.email.to_lowercase())
    .bind(&payload.linkedin)
    .bind(&payload.date_of_birth)
    .bind(&payload.nationality)
    .bind(&payload.occupation)
    .bind(&payload.company_name)
    .bind(&payload.company_address)
    .bind(&payload.personal_interests)
    .bind(&payload.personal_biography)
    .bind(payload.membership_type.as_str())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store membership application: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Accepts a job application from the join-the-team flow. File uploads are
/// handled by the storage provider; only the resulting URLs arrive here.
pub async fn submit_job_application(
    State(pool): State<PgPool>,
    Json(payload): Json<JobApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let selected_roles = serde_json::to_value(&payload.selected_roles).unwrap_or_default();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO job_applications
        (full_name, email, phone, linkedin, current_position, current_company,
         cv_url, photo_url, motivation, selected_roles, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')
        RETURNING id
        "#,
    )
    .bind(&payload.full_name)
    .bind(payload.email.to_lowercase())
    .bind(&payload.phone)
    .bind(&payload.linkedin)
    .bind(&payload.current_position)
    .bind(&payload.current_company)
    .bind(&payload.cv_url)
    .bind(&payload.photo_url)
    .bind(&payload.motivation)
    .bind(selected_roles)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store job application: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}
