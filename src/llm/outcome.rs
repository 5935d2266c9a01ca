//! Uniform result of a summarization request.

use serde::{Deserialize, Serialize};

/// Diagnostic fields attached to every summarization outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDiagnostics {
    /// The winning model was not the first candidate (or nothing won).
    pub fallback_used: bool,
    /// The input was shortened to fit the context budget.
    pub truncated: bool,
    /// Rough prompt size in tokens (chars / 4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_input: Option<usize>,
    /// Rough answer size in tokens (chars / 4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_output: Option<usize>,
    /// Every model tried, filled only when all of them failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted_models: Vec<String>,
}

/// What a summarization backend hands back for one request.
///
/// Backends never return an error: every failure is folded into `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequestOutcome {
    pub summary: Option<String>,
    /// The model that answered, or the first candidate when all failed.
    pub model_used: String,
    pub success: bool,
    pub fallback_used: bool,
    pub metadata: RequestDiagnostics,
    pub error: Option<String>,
}

impl ModelRequestOutcome {
    /// Successful outcome produced by the model at `index` in the chain.
    pub fn succeeded(
        summary: String,
        model: &str,
        index: usize,
        truncated: bool,
        prompt_chars: usize,
    ) -> Self {
        let fallback_used = index > 0;
        let tokens_output = summary.chars().count() / 4;
        Self {
            summary: Some(summary),
            model_used: model.to_string(),
            success: true,
            fallback_used,
            metadata: RequestDiagnostics {
                fallback_used,
                truncated,
                tokens_input: Some(prompt_chars / 4),
                tokens_output: Some(tokens_output),
                attempted_models: Vec::new(),
            },
            error: None,
        }
    }

    /// Outcome after every candidate model failed.
    pub fn exhausted(models: &[String], truncated: bool, error: String) -> Self {
        Self {
            summary: None,
            model_used: models
                .first()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            success: false,
            fallback_used: true,
            metadata: RequestDiagnostics {
                fallback_used: true,
                truncated,
                tokens_input: None,
                tokens_output: None,
                attempted_models: models.to_vec(),
            },
            error: Some(error),
        }
    }

    /// The summary text, only when the request succeeded with a non-empty answer.
    pub fn usable_summary(&self) -> Option<&str> {
        if self.success {
            self.summary.as_deref().filter(|s| !s.trim().is_empty())
        } else {
            None
        }
    }
}
