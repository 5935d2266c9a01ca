//! LLM client configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::prompts::DEFAULT_SUMMARY_PROMPT;
use crate::rate_limit::delay_from_secs;

/// Context budget for models missing from `context_limits`, in characters.
pub const DEFAULT_CONTEXT_LIMIT: usize = 25_000;

/// Strategy used when neither the requested nor the configured one exists.
pub const FALLBACK_STRATEGY: &str = "balanced";

/// Configuration for the OpenRouter summarization client.
///
/// Mirrors the `openrouter` section of the YAML config. The API key is never
/// serialized; it comes from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// API base URL; `/chat/completions` is appended.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key (`sk-...`), filled from `OPENROUTER_API_KEY`.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Sent as `X-Title` and used for the `HTTP-Referer` header.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Model strategy used when the caller doesn't name one.
    #[serde(default = "default_strategy")]
    pub default_strategy: String,
    /// Minimum seconds between the starts of consecutive requests.
    #[serde(default = "default_request_delay")]
    pub request_delay: f64,
    /// Attempts per model for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay in seconds.
    #[serde(default = "default_retry_min_delay")]
    pub retry_min_delay: f64,
    /// Backoff ceiling in seconds.
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay: f64,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Maximum tokens in response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Language the summaries are written in.
    #[serde(default = "default_summary_language")]
    pub summary_language: String,
    /// Custom prompt (uses {language} and {content} placeholders).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Strategy name -> ordered fallback chain of model identifiers.
    #[serde(default = "default_model_hierarchy")]
    pub model_hierarchy: BTreeMap<String, Vec<String>>,
    /// Model identifier -> maximum input characters.
    #[serde(default = "default_context_limits")]
    pub context_limits: BTreeMap<String, usize>,
}

fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_app_name() -> String {
    "ocr-app".to_string()
}

fn default_strategy() -> String {
    FALLBACK_STRATEGY.to_string()
}

fn default_request_delay() -> f64 {
    5.0
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_min_delay() -> f64 {
    8.0
}

fn default_retry_max_delay() -> f64 {
    20.0
}

fn default_timeout() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_summary_language() -> String {
    "Russian".to_string()
}

/// Free models known to work without spending credits.
pub fn default_model_hierarchy() -> BTreeMap<String, Vec<String>> {
    let chain = |models: &[&str]| models.iter().map(|m| m.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        (
            "premium".to_string(),
            chain(&["nousresearch/hermes-3-llama-3.1-405b:free"]),
        ),
        (
            "balanced".to_string(),
            chain(&[
                "mistralai/mistral-7b-instruct:nitro",
                "meta-llama/llama-3.3-70b-instruct:free",
            ]),
        ),
        (
            "fast".to_string(),
            chain(&[
                "mistralai/mistral-7b-instruct:nitro",
                "google/gemma-2-9b-it:free",
            ]),
        ),
    ])
}

/// Conservative per-model context budgets, in characters.
pub fn default_context_limits() -> BTreeMap<String, usize> {
    BTreeMap::from([
        ("meta-llama/llama-3.3-70b-instruct:free".to_string(), 100_000),
        ("meta-llama/llama-3.2-3b-instruct:free".to_string(), 100_000),
        ("google/gemma-3n-e4b-it:free".to_string(), 6_000),
        ("deepseek/deepseek-r1-0528:free".to_string(), 100_000),
        ("mistralai/mistral-7b-instruct:nitro".to_string(), 28_000),
    ])
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            app_name: default_app_name(),
            default_strategy: default_strategy(),
            request_delay: default_request_delay(),
            max_retries: default_max_retries(),
            retry_min_delay: default_retry_min_delay(),
            retry_max_delay: default_retry_max_delay(),
            timeout: default_timeout(),
            max_tokens: default_max_tokens(),
            summary_language: default_summary_language(),
            prompt: None,
            model_hierarchy: default_model_hierarchy(),
            context_limits: default_context_limits(),
        }
    }
}

impl LlmConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `OPENROUTER_API_KEY`: API key
    /// - `OPENROUTER_ENDPOINT`: API base URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("OPENROUTER_API_KEY") {
            self.api_key = val;
        }
        if let Ok(val) = std::env::var("OPENROUTER_ENDPOINT") {
            self.endpoint = val;
        }
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = key.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Replace the fallback chain for one strategy.
    pub fn with_models(mut self, strategy: &str, models: &[&str]) -> Self {
        self.model_hierarchy.insert(
            strategy.to_string(),
            models.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_context_limit(mut self, model: &str, limit: usize) -> Self {
        self.context_limits.insert(model.to_string(), limit);
        self
    }

    /// Fallback chain for `strategy`, defaulting to the configured strategy
    /// and then to `balanced`.
    pub fn models_for(&self, strategy: Option<&str>) -> &[String] {
        strategy
            .and_then(|s| self.model_hierarchy.get(s))
            .or_else(|| self.model_hierarchy.get(&self.default_strategy))
            .or_else(|| self.model_hierarchy.get(FALLBACK_STRATEGY))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Context budget of a model, in characters.
    pub fn context_limit(&self, model: &str) -> usize {
        self.context_limits
            .get(model)
            .copied()
            .unwrap_or(DEFAULT_CONTEXT_LIMIT)
    }

    /// Sorted, de-duplicated list of every configured model.
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self
            .model_hierarchy
            .values()
            .flatten()
            .cloned()
            .collect();
        models.sort();
        models.dedup();
        models
    }

    pub fn request_interval(&self) -> Duration {
        delay_from_secs(self.request_delay)
    }

    pub fn retry_min(&self) -> Duration {
        delay_from_secs(self.retry_min_delay)
    }

    pub fn retry_max(&self) -> Duration {
        delay_from_secs(self.retry_max_delay)
    }

    /// Get the summary prompt, using custom or default.
    pub fn get_prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(DEFAULT_SUMMARY_PROMPT)
    }

    /// Fill the prompt template with a document.
    pub fn render_prompt(&self, content: &str) -> String {
        self.get_prompt()
            .replace("{language}", &self.summary_language)
            .replace("{content}", content)
    }
}
