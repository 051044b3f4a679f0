use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; defaults suit local development.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Absent → AI features run offline and serve canned fallbacks.
    pub anthropic_api_key: Option<String>,
    /// When false, AI features fail instead of serving canned fallbacks.
    pub ai_fallback_enabled: bool,
    /// Seconds a submitted session stays readable.
    pub session_retention_secs: u64,
    /// Seconds an untouched, untimed session lives before it counts as abandoned.
    pub session_idle_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            ai_fallback_enabled: match optional_env("AI_FALLBACK_ENABLED") {
                Some(v) => parse_bool(&v)
                    .with_context(|| format!("AI_FALLBACK_ENABLED must be true or false, got '{v}'"))?,
                None => true,
            },
            session_retention_secs: secs_env("SESSION_RETENTION_SECS", 3600)?,
            session_idle_timeout_secs: secs_env("SESSION_IDLE_TIMEOUT_SECS", 7200)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            anthropic_api_key: None,
            ai_fallback_enabled: true,
            session_retention_secs: 3600,
            session_idle_timeout_secs: 7200,
        }
    }
}

/// Unset and blank variables are both treated as missing.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs_env(key: &str, default: u64) -> Result<u64> {
    match optional_env(key) {
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds, got '{v}'")),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
