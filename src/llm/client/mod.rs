//! LLM client for document summarization.
//!
//! Talks to an OpenRouter-compatible chat-completions API. Requests are
//! paced, transient failures are retried with backoff, and the client walks
//! an ordered chain of models until one answers.

mod config;
mod prompts;
mod truncate;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::outcome::ModelRequestOutcome;
use crate::rate_limit::{backoff_delay, parse_retry_after, RequestPacer};

pub use config::{
    default_context_limits, default_model_hierarchy, LlmConfig, DEFAULT_CONTEXT_LIMIT,
    FALLBACK_STRATEGY,
};
pub use prompts::{AGGREGATION_HEADER, DEFAULT_SUMMARY_PROMPT, SUMMARY_LABELS};
pub use truncate::{fit_to_context, HEAD_CAP, OMISSION_MARKER, SEPARATOR_BUFFER};

/// Errors that can occur during a single model request.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection failure, timeout or unreadable body.
    #[error("Transient error: {0}")]
    Transient(String),

    /// HTTP 429.
    #[error("Rate limit (429) for '{model}'")]
    RateLimited {
        model: String,
        retry_after: Option<std::time::Duration>,
    },

    /// HTTP 402: the account ran out of credits.
    #[error("Credit limit exceeded (402)")]
    QuotaExhausted,

    /// HTTP 400 naming an unknown model.
    #[error("Invalid model ID (400): '{0}'")]
    InvalidModel(String),

    /// Any other 4xx/5xx.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response didn't have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl LlmError {
    /// Whether retrying the same model may help.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Transient(_) | LlmError::RateLimited { .. })
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Transient(format!("request timed out: {}", e))
        } else if e.is_connect() {
            LlmError::Transient(format!("connection failed: {}", e))
        } else {
            LlmError::Transient(e.to_string())
        }
    }
}

/// Anything that can summarize a block of text.
///
/// Implementations must not fail: every problem ends up in
/// [`ModelRequestOutcome::error`].
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Summarize `text`; `strategy` picks the model chain (e.g. "balanced").
    async fn summarize(
        &self,
        text: &str,
        temperature: f32,
        strategy: Option<&str>,
    ) -> ModelRequestOutcome;
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenRouter client with model fallback.
pub struct OpenRouterClient {
    config: LlmConfig,
    client: Client,
    pacer: RequestPacer,
}

impl OpenRouterClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        validate_api_key(&config.api_key)?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| LlmError::InvalidApiKey("contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let referer = HeaderValue::from_str(&format!("{}.local", config.app_name))
            .map_err(|e| LlmError::Client(e.to_string()))?;
        headers.insert("http-referer", referer);
        let title =
            HeaderValue::from_str(&config.app_name).map_err(|e| LlmError::Client(e.to_string()))?;
        headers.insert("x-title", title);

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        let pacer = RequestPacer::new(config.request_interval());

        info!(
            "OpenRouter client initialized | strategy: '{}' | request delay: {}s",
            config.default_strategy, config.request_delay
        );

        Ok(Self {
            config,
            client,
            pacer,
        })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Every model this client may use, sorted.
    pub fn available_models(&self) -> Vec<String> {
        self.config.available_models()
    }

    /// Send one paced request to one model.
    async fn request(&self, prompt: &str, model: &str, temperature: f32) -> Result<String, LlmError> {
        self.pacer.wait().await;

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens: self.config.max_tokens,
        };

        info!("-> Request to '{}' ({} chars)", model, prompt.chars().count());
        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        let resp = self.client.post(&url).json(&request).send().await?;

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| parse_retry_after(Some(v)));
        let body = resp.text().await?;

        if let Some(err) = classify_status(status, &body, model) {
            match &err {
                LlmError::RateLimited { .. } => {
                    warn!("429 rate limit for '{}', will retry after a delay", model)
                }
                LlmError::QuotaExhausted => {
                    error!("402 Payment Required: account credit limit exhausted");
                    error!("Use only free models (ids ending in ':free')");
                }
                LlmError::InvalidModel(_) => {
                    error!("400 invalid model ID: '{}', switching to fallback", model)
                }
                _ => error!("API error {}: {}", status.as_u16(), preview(&body, 300)),
            }
            return Err(match err {
                LlmError::RateLimited { model, .. } => LlmError::RateLimited { model, retry_after },
                other => other,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::Parse(format!("{} (body: {})", e, preview(&body, 200))))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                LlmError::Parse(format!("malformed API response: {}", preview(&body, 200)))
            })?;

        let answer = clean_summary(&content);
        if answer.is_empty() {
            return Err(LlmError::Parse("model returned an empty answer".to_string()));
        }

        info!("<- Answer from '{}' ({} chars)", model, answer.chars().count());
        Ok(answer)
    }

    /// Retry transient failures of one model with exponential backoff.
    async fn request_with_retry(
        &self,
        prompt: &str,
        model: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempt = 0;
        loop {
            match self.request(prompt, model, temperature).await {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                    let wait = match &e {
                        LlmError::RateLimited {
                            retry_after: Some(after),
                            ..
                        } => *after,
                        _ => backoff_delay(attempt, self.config.retry_min(), self.config.retry_max()),
                    };
                    warn!(
                        "Request to '{}' failed (attempt {}/{}): {}; retrying in {:?}",
                        model,
                        attempt + 1,
                        max_attempts,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl SummarizationClient for OpenRouterClient {
    async fn summarize(
        &self,
        text: &str,
        temperature: f32,
        strategy: Option<&str>,
    ) -> ModelRequestOutcome {
        let models = self.config.models_for(strategy).to_vec();
        let Some(first) = models.first() else {
            return ModelRequestOutcome::exhausted(
                &models,
                false,
                format!(
                    "No models configured for strategy '{}'",
                    strategy.unwrap_or(&self.config.default_strategy)
                ),
            );
        };

        let limit = self.config.context_limit(first);
        let original_chars = text.chars().count();
        let (content, truncated) = fit_to_context(text, limit);
        if truncated {
            warn!(
                "Text truncated to the {} char budget of '{}' (was {} chars)",
                limit, first, original_chars
            );
        }

        let prompt = self.config.render_prompt(&content);
        let prompt_chars = prompt.chars().count();
        let mut last_error: Option<LlmError> = None;

        for (i, model) in models.iter().enumerate() {
            match self.request_with_retry(&prompt, model, temperature).await {
                Ok(summary) => {
                    if i > 0 {
                        info!("Summary produced by fallback model '{}'", model);
                    }
                    return ModelRequestOutcome::succeeded(
                        summary,
                        model,
                        i,
                        truncated,
                        prompt_chars,
                    );
                }
                Err(e) => {
                    warn!("Model '{}' unavailable: {}", model, e);
                    if let Some(next) = models.get(i + 1) {
                        info!("Switching to fallback model: {}", next);
                    }
                    last_error = Some(e);
                }
            }
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        debug!("All {} models failed", models.len());
        ModelRequestOutcome::exhausted(
            &models,
            truncated,
            format!("All models unavailable. Last error: {}", last),
        )
    }
}

/// Reject keys that are obviously not OpenRouter keys.
fn validate_api_key(key: &str) -> Result<(), LlmError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(LlmError::InvalidApiKey(
            "OPENROUTER_API_KEY is not set (expected OPENROUTER_API_KEY=sk-or-v1-...)".to_string(),
        ));
    }
    if !key.starts_with("sk-") {
        let shown: String = key.chars().take(10).collect();
        return Err(LlmError::InvalidApiKey(format!(
            "key must start with 'sk-' (got '{}...')",
            shown
        )));
    }
    Ok(())
}

/// Map an HTTP status to the error it signals, if any.
fn classify_status(status: StatusCode, body: &str, model: &str) -> Option<LlmError> {
    match status.as_u16() {
        429 => Some(LlmError::RateLimited {
            model: model.to_string(),
            retry_after: None,
        }),
        402 => Some(LlmError::QuotaExhausted),
        400 if body.contains("not a valid model ID") => {
            Some(LlmError::InvalidModel(model.to_string()))
        }
        code if code >= 400 => Some(LlmError::Api {
            status: code,
            body: preview(body, 300).to_string(),
        }),
        _ => None,
    }
}

/// Strip surrounding whitespace and a leading "Summary:" style label.
pub fn clean_summary(raw: &str) -> String {
    let trimmed = raw.trim();
    for label in SUMMARY_LABELS {
        if let Some(head) = trimmed.get(..label.len()) {
            if head.to_lowercase() == label.to_lowercase() {
                return trimmed[label.len()..].trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// First `max` characters of `s`.
fn preview(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
