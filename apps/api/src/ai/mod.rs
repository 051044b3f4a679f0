// AI-backed career features: interview questions, resume analysis, chat.
// All completion calls go through llm_client, never direct HTTP calls here.

pub mod chat;
pub mod handlers;
pub mod interview;
pub mod prompts;
pub mod resume;

use serde::Serialize;

use crate::errors::AppError;
use crate::llm_client::ParseOutcome;

/// Where the data in an AI response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AiSource {
    Ai,
    Fallback,
}

/// Response envelope for structured AI features.
#[derive(Debug, Serialize)]
pub struct AiResponse<T> {
    pub source: AiSource,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl<T> AiResponse<T> {
    /// `Failed` becomes an `AppError::Llm`; the other outcomes are reported with their source.
    pub fn from_outcome(outcome: ParseOutcome<T>, feature: &str) -> Result<Self, AppError> {
        match outcome {
            ParseOutcome::Parsed(data) => Ok(Self {
                source: AiSource::Ai,
                data,
                fallback_reason: None,
            }),
            ParseOutcome::Fallback { data, reason } => Ok(Self {
                source: AiSource::Fallback,
                data,
                fallback_reason: Some(reason),
            }),
            ParseOutcome::Failed(e) => Err(AppError::Llm(format!("{feature} failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_parsed_outcome_is_ai_source() {
        let outcome = ParseOutcome::Parsed(7);
        let response = AiResponse::from_outcome(outcome, "test").unwrap();
        assert_eq!(response.source, AiSource::Ai);
        assert_eq!(response.data, 7);
        assert!(response.fallback_reason.is_none());
    }

    #[test]
    fn test_fallback_outcome_keeps_reason() {
        let outcome = ParseOutcome::Fallback {
            data: 1,
            reason: "bad json".to_string(),
        };
        let response = AiResponse::from_outcome(outcome, "test").unwrap();
        assert_eq!(response.source, AiSource::Fallback);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["fallback_reason"], "bad json");
    }

    #[test]
    fn test_failed_outcome_is_error() {
        let outcome: ParseOutcome<i32> = ParseOutcome::Failed(LlmError::NotConfigured);
        let err = AiResponse::from_outcome(outcome, "Resume analysis").unwrap_err();
        match err {
            AppError::Llm(msg) => assert!(msg.starts_with("Resume analysis failed")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
