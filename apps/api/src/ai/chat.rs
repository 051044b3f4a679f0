//! Career chat assistant. Free-text replies, so there is no canned fallback.

use serde::{Deserialize, Serialize};

use crate::ai::prompts::CHAT_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, CAREER_ADVISOR_PERSONA};
use crate::llm_client::CompletionBackend;

/// Only the most recent turns are replayed to the model.
pub const MAX_HISTORY_TURNS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn chat(
    backend: &dyn CompletionBackend,
    request: &ChatRequest,
) -> Result<ChatReply, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let history = transcript(&request.history);
    let prompt = fill_template(
        CHAT_PROMPT_TEMPLATE,
        &[("transcript", history.as_str()), ("message", message)],
    );

    let reply = backend
        .complete(&prompt, CAREER_ADVISOR_PERSONA)
        .await
        .map_err(|e| AppError::Llm(format!("Chat completion failed: {e}")))?;

    let reply = reply.trim();
    if reply.is_empty() {
        return Err(AppError::Llm("Chat completion returned no text".to_string()));
    }
    Ok(ChatReply {
        reply: reply.to_string(),
    })
}

fn transcript(history: &[ChatTurn]) -> String {
    if history.is_empty() {
        return "(no previous messages)".to_string();
    }
    let skip = history.len().saturating_sub(MAX_HISTORY_TURNS);
    history[skip..]
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Advisor",
            };
            format!("{speaker}: {}", turn.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
