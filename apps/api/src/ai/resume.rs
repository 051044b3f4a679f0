//! Resume analysis: AI review of resume text, from a JSON body or an uploaded PDF.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ai::prompts::RESUME_ANALYSIS_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, CAREER_ADVISOR_PERSONA, JSON_ONLY_SYSTEM};
use crate::llm_client::{complete_json_or_fallback, CompletionBackend, ParseOutcome};

/// Longer resumes are truncated before being sent to the model.
pub const MAX_RESUME_CHARS: usize = 20_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeAnalysisRequest {
    pub resume_text: String,
    #[serde(default)]
    pub target_role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub overall_score: u32, // 0 – 100
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    pub summary: String,
}

pub async fn analyze_resume(
    backend: &dyn CompletionBackend,
    resume_text: &str,
    target_role: Option<&str>,
    allow_fallback: bool,
) -> Result<ParseOutcome<ResumeAnalysis>, AppError> {
    let resume_text = resume_text.trim();
    if resume_text.is_empty() {
        return Err(AppError::Validation("resume text cannot be empty".to_string()));
    }
    let target_role = target_role
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("a role matching their experience");

    let prompt = fill_template(
        RESUME_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("target_role", target_role),
            ("resume_text", truncate_chars(resume_text, MAX_RESUME_CHARS)),
        ],
    );
    let system = format!("{CAREER_ADVISOR_PERSONA} {JSON_ONLY_SYSTEM}");

    let outcome = complete_json_or_fallback(backend, &prompt, &system, || {
        allow_fallback.then(default_analysis)
    })
    .await;

    Ok(match outcome {
        ParseOutcome::Parsed(mut analysis) => {
            analysis.overall_score = analysis.overall_score.min(100);
            ParseOutcome::Parsed(analysis)
        }
        other => other,
    })
}

/// Extracts text from an uploaded PDF on the blocking pool.
pub async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }
    let size = data.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| {
            // pdf parsing panics on some malformed input
            if e.is_panic() {
                AppError::Validation("Could not read PDF".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}"))
            }
        })?
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;
    info!("Extracted {} characters from {size}-byte PDF", text.len());
    Ok(text)
}

/// Generic guidance used when the AI backend is unavailable or returns garbage.
pub fn default_analysis() -> ResumeAnalysis {
    ResumeAnalysis {
        overall_score: 70,
        strengths: vec![
            "Resume covers relevant experience".to_string(),
            "Sections are present for experience and education".to_string(),
        ],
        improvements: vec![
            "Quantify achievements with numbers, percentages or time saved".to_string(),
            "Start each bullet with a strong action verb".to_string(),
            "Tailor your skills section to the job description".to_string(),
        ],
        missing_keywords: vec![],
        summary: "Automated analysis is unavailable right now; these are general \
                  recommendations that apply to most resumes."
            .to_string(),
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
