//! LLM integration for document summarization.
//!
//! Uses a remote chat-completions API (OpenRouter) with an ordered fallback
//! chain of free models.

mod client;
mod outcome;

pub use client::{
    clean_summary, default_context_limits, default_model_hierarchy, fit_to_context, LlmConfig,
    LlmError, OpenRouterClient, SummarizationClient, AGGREGATION_HEADER, DEFAULT_CONTEXT_LIMIT,
    DEFAULT_SUMMARY_PROMPT, FALLBACK_STRATEGY, HEAD_CAP, OMISSION_MARKER, SEPARATOR_BUFFER,
};
pub use outcome::{ModelRequestOutcome, RequestDiagnostics};
