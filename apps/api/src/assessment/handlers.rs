//! Axum route handlers for the Assessment API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::assessment::catalog::{AssessmentSummary, PublicAssessment};
use crate::assessment::models::{answer_sheet, Answer, AssessmentResult};
use crate::assessment::scoring::score_with_scheme;
use crate::assessment::session::{SessionView, SubmissionTrigger};
use crate::errors::{AppError, AppJson, AppPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnswersRequest {
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// GET /api/v1/assessments
pub async fn handle_list_assessments(State(state): State<AppState>) -> Json<Vec<AssessmentSummary>> {
    Json(state.catalog.summaries())
}

/// GET /api/v1/assessments/:id
///
/// Questions without their correct answers.
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<Json<PublicAssessment>, AppError> {
    let definition = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Assessment '{id}' not found")))?;
    Ok(Json(definition.public_view()))
}

/// POST /api/v1/assessments/:id/score
///
/// Stateless scoring of a complete answer set. Nothing is stored.
pub async fn handle_score_assessment(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
    AppJson(request): AppJson<AnswersRequest>,
) -> Result<Json<AssessmentResult>, AppError> {
    let definition = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Assessment '{id}' not found")))?;
    let answers = answer_sheet(request.answers);
    let result = score_with_scheme(&definition.questions, &answers, definition.tier_scheme())?;
    Ok(Json(result))
}

/// POST /api/v1/assessments/:id/sessions
///
/// Starts an attempt. Timed assessments submit themselves when the clock runs out.
pub async fn handle_start_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let view = state.sessions.start(&id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.get(id).await?))
}

/// PUT /api/v1/sessions/:id/answers
pub async fn handle_record_answers(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<AnswersRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.record_answers(id, request.answers).await?))
}

/// POST /api/v1/sessions/:id/submit
pub async fn handle_submit_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    state.sessions.submit(id, SubmissionTrigger::User).await?;
    Ok(Json(state.sessions.get(id).await?))
}
