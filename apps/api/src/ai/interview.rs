//! Interview question generation for a target role.

use serde::{Deserialize, Serialize};

use crate::ai::prompts::INTERVIEW_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, CAREER_ADVISOR_PERSONA, JSON_ONLY_SYSTEM};
use crate::llm_client::{complete_json_or_fallback, CompletionBackend, ParseOutcome};

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_QUESTION_COUNT: usize = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct InterviewQuestionsRequest {
    pub role: String,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub category: String,
    pub difficulty: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestionSet {
    pub questions: Vec<InterviewQuestion>,
}

pub async fn generate_interview_questions(
    backend: &dyn CompletionBackend,
    request: &InterviewQuestionsRequest,
    allow_fallback: bool,
) -> Result<ParseOutcome<InterviewQuestionSet>, AppError> {
    let role = request.role.trim();
    if role.is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }
    let count = request.count.unwrap_or(DEFAULT_QUESTION_COUNT);
    if count == 0 || count > MAX_QUESTION_COUNT {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {MAX_QUESTION_COUNT}"
        )));
    }
    let level = request
        .experience_level
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("mid-level");

    let count_text = count.to_string();
    let prompt = fill_template(
        INTERVIEW_PROMPT_TEMPLATE,
        &[("count", count_text.as_str()), ("level", level), ("role", role)],
    );
    let system = format!("{CAREER_ADVISOR_PERSONA} {JSON_ONLY_SYSTEM}");

    let outcome = complete_json_or_fallback(backend, &prompt, &system, || {
        allow_fallback.then(|| default_questions(role, count))
    })
    .await;

    Ok(match outcome {
        ParseOutcome::Parsed(mut set) => {
            set.questions.truncate(count);
            ParseOutcome::Parsed(set)
        }
        other => other,
    })
}

/// Canned questions used when the AI backend is unavailable or returns garbage.
pub fn default_questions(role: &str, count: usize) -> InterviewQuestionSet {
    let canned = [
        (
            format!("What drew you to working as a {role}?"),
            "behavioral",
            "easy",
            vec!["Connect your answer to concrete experiences".to_string()],
        ),
        (
            "Tell me about a project you are proud of and your role in it.".to_string(),
            "behavioral",
            "medium",
            vec!["Use the STAR method".to_string(), "Quantify the outcome".to_string()],
        ),
        (
            format!("Which tools and practices are essential for a {role}, and why?"),
            "technical",
            "medium",
            vec!["Name specific tools you have used".to_string()],
        ),
        (
            "Describe a time you had to learn something new under a tight deadline.".to_string(),
            "situational",
            "medium",
            vec!["Explain how you prioritised what to learn first".to_string()],
        ),
        (
            "How do you handle disagreement about a technical or design decision?".to_string(),
            "situational",
            "medium",
            vec!["Show you listen before persuading".to_string()],
        ),
        (
            "Walk me through how you would debug a problem you have never seen before."
                .to_string(),
            "technical",
            "hard",
            vec!["Describe a systematic approach, not a lucky guess".to_string()],
        ),
        (
            "Where do you see your career in three years?".to_string(),
            "behavioral",
            "easy",
            vec!["Tie your goals to the role you are applying for".to_string()],
        ),
    ];

    InterviewQuestionSet {
        questions: canned
            .into_iter()
            .cycle()
            .take(count)
            .map(|(question, category, difficulty, tips)| InterviewQuestion {
                question,
                category: category.to_string(),
                difficulty: difficulty.to_string(),
                tips,
            })
            .collect(),
    }
}
