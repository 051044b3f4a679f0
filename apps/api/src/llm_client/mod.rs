/// LLM Client: the single point of entry for all AI completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Features talk to a `CompletionBackend`; `LlmClient` is the production backend.
///
/// AI output is never trusted to be well-formed. Structured calls return a
/// `ParseOutcome` so callers can tell real output from canned defaults.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all completion calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
/// Retries after the first attempt, waiting 1s, 2s, then 4s.
const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No AI backend is configured")]
    NotConfigured,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Backend trait
// ────────────────────────────────────────────────────────────────────────────

/// A stateless prompt → free-text completion service.
///
/// Carried in `AppState` as `Arc<dyn CompletionBackend>`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;

    /// "anthropic" or "offline", shown in logs and /health.
    fn name(&self) -> &'static str;
}

/// Used when no API key is configured. Every call fails, so structured
/// features fall back to their canned defaults.
pub struct OfflineBackend;

#[async_trait]
impl CompletionBackend for OfflineBackend {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the Anthropic Messages API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    retry_base_delay: Duration,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Self::with_endpoint(api_key, ANTHROPIC_API_URL, RETRY_BASE_DELAY)
    }

    /// Client for a Messages-compatible endpoint at `api_url`.
    pub fn with_endpoint(
        api_key: String,
        api_url: impl Into<String>,
        retry_base_delay: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(120)).build()?,
            api_key,
            api_url: api_url.into(),
            retry_base_delay,
        })
    }

    /// Wait before retry number `retry` (1-based): base, 2 × base, 4 × base.
    fn backoff_delay(&self, retry: u32) -> Duration {
        self.retry_base_delay * (1u32 << retry.saturating_sub(1))
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured output
// ────────────────────────────────────────────────────────────────────────────

/// Result of asking for structured output from an unreliable completion.
#[derive(Debug)]
pub enum ParseOutcome<T> {
    /// The model returned valid JSON for `T`.
    Parsed(T),
    /// The call or parse failed; canned defaults were substituted.
    Fallback { data: T, reason: String },
    /// The call or parse failed and no defaults were available.
    Failed(LlmError),
}

/// Calls the backend and deserializes the text response as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn complete_json<T: DeserializeOwned>(
    backend: &dyn CompletionBackend,
    prompt: &str,
    system: &str,
) -> Result<T, LlmError> {
    let text = backend.complete(prompt, system).await?;
    parse_json_text(&text)
}

/// Like `complete_json`, but substitutes `fallback()` on any failure.
/// Returns `Failed` only when `fallback` yields `None`.
pub async fn complete_json_or_fallback<T, F>(
    backend: &dyn CompletionBackend,
    prompt: &str,
    system: &str,
    fallback: F,
) -> ParseOutcome<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> Option<T>,
{
    match complete_json(backend, prompt, system).await {
        Ok(data) => ParseOutcome::Parsed(data),
        Err(e) => match fallback() {
            Some(data) => {
                warn!(
                    "Using fallback data after {} completion failed: {e}",
                    backend.name()
                );
                ParseOutcome::Fallback {
                    data,
                    reason: e.to_string(),
                }
            }
            None => ParseOutcome::Failed(e),
        },
    }
}

/// Parses model text as JSON, tolerating code fences and surrounding prose.
fn parse_json_text<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    match serde_json::from_str(text) {
        Ok(v) => Ok(v),
        Err(first) => match extract_json_object(text) {
            Some(inner) if inner != text => serde_json::from_str(inner).map_err(LlmError::Parse),
            _ => Err(LlmError::Parse(first)),
        },
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Slice from the first `{` to the last `}`, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
