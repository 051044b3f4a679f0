//! Axum route handlers for the AI API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;

use crate::ai::chat::{chat, ChatReply, ChatRequest};
use crate::ai::interview::{generate_interview_questions, InterviewQuestionSet, InterviewQuestionsRequest};
use crate::ai::resume::{analyze_resume, extract_pdf_text, ResumeAnalysis, ResumeAnalysisRequest};
use crate::ai::AiResponse;
use crate::errors::{AppError, AppJson};
use crate::state::AppState;

/// POST /api/v1/ai/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    AppJson(request): AppJson<InterviewQuestionsRequest>,
) -> Result<Json<AiResponse<InterviewQuestionSet>>, AppError> {
    let outcome =
        generate_interview_questions(state.ai.as_ref(), &request, state.config.ai_fallback_enabled)
            .await?;
    Ok(Json(AiResponse::from_outcome(outcome, "Interview question generation")?))
}

/// POST /api/v1/ai/resume-analysis
pub async fn handle_resume_analysis(
    State(state): State<AppState>,
    AppJson(request): AppJson<ResumeAnalysisRequest>,
) -> Result<Json<AiResponse<ResumeAnalysis>>, AppError> {
    let outcome = analyze_resume(
        state.ai.as_ref(),
        &request.resume_text,
        request.target_role.as_deref(),
        state.config.ai_fallback_enabled,
    )
    .await?;
    Ok(Json(AiResponse::from_outcome(outcome, "Resume analysis")?))
}

/// POST /api/v1/ai/resume-analysis/upload
///
/// Multipart form: `file` (PDF, required), `target_role` (optional text).
pub async fn handle_resume_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AiResponse<ResumeAnalysis>>, AppError> {
    let mut pdf: Option<Bytes> = None;
    let mut target_role: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                pdf = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?,
                );
            }
            Some("target_role") => {
                target_role = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Invalid target_role: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let pdf = pdf.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    let resume_text = extract_pdf_text(pdf).await?;

    let outcome = analyze_resume(
        state.ai.as_ref(),
        &resume_text,
        target_role.as_deref(),
        state.config.ai_fallback_enabled,
    )
    .await?;
    Ok(Json(AiResponse::from_outcome(outcome, "Resume analysis")?))
}

/// POST /api/v1/ai/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    AppJson(request): AppJson<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    Ok(Json(chat(state.ai.as_ref(), &request).await?))
}
