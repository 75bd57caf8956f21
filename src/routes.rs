// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, applications, auth, survey},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, insights/survey, applications, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new().route("/login", post(auth::login));

    let insights_routes = Router::new()
        .route("/questions", get(survey::list_questions))
        .route("/sessions", post(survey::begin_session))
        .route("/sessions/{id}", get(survey::get_session))
        .route("/sessions/{id}/advance", post(survey::advance_session));

    let application_routes = Router::new()
        .route(
            "/membership",
            post(applications::submit_membership_application),
        )
        .route("/jobs", post(applications::submit_job_application));

    let admin_routes = Router::new()
        .route("/applications/jobs", get(admin::list_job_applications))
        .route(
            "/applications/jobs/{id}",
            put(admin::update_job_application),
        )
        .route(
            "/applications/membership",
            get(admin::list_membership_applications),
        )
        .route(
            "/applications/membership/{id}",
            put(admin::update_membership_application),
        )
        .route("/insights/sessions", get(admin::list_survey_sessions))
        // Double middleware protection: Auth first, then admin check.
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/insights", insights_routes)
        .nest("/api/applications", application_routes)
        .nest("/api/admin", admin_routes)
        // Global middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
