pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::ai::handlers as ai;
use crate::assessment::handlers as assessment;
use crate::state::AppState;

/// Resume PDFs larger than this are rejected before parsing.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment API
        .route("/api/v1/assessments", get(assessment::handle_list_assessments))
        .route("/api/v1/assessments/:id", get(assessment::handle_get_assessment))
        .route(
            "/api/v1/assessments/:id/score",
            post(assessment::handle_score_assessment),
        )
        .route(
            "/api/v1/assessments/:id/sessions",
            post(assessment::handle_start_session),
        )
        .route("/api/v1/sessions/:id", get(assessment::handle_get_session))
        .route(
            "/api/v1/sessions/:id/answers",
            put(assessment::handle_record_answers),
        )
        .route(
            "/api/v1/sessions/:id/submit",
            post(assessment::handle_submit_session),
        )
        // AI API
        .route(
            "/api/v1/ai/interview-questions",
            post(ai::handle_interview_questions),
        )
        .route("/api/v1/ai/resume-analysis", post(ai::handle_resume_analysis))
        .route(
            "/api/v1/ai/resume-analysis/upload",
            post(ai::handle_resume_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/ai/chat", post(ai::handle_chat))
        .with_state(state)
}
