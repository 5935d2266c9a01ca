//! Result structures shared by every summarization strategy.

use serde::{Deserialize, Serialize};

use crate::llm::{ModelRequestOutcome, RequestDiagnostics};

/// Terminal state of one file in a folder run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// A model produced a summary.
    Success,
    /// Extraction yielded no text; no request was made.
    Empty,
    /// Every model failed for this file.
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Success => "success",
            FileStatus::Empty => "empty",
            FileStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of summarizing one document.
///
/// Built through [`FileSummary::success`], [`FileSummary::empty`] or
/// [`FileSummary::error`], which keep `summary`/`model_used`/`error`
/// consistent with `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub file: String,
    pub status: FileStatus,
    pub summary: Option<String>,
    /// Characters of extracted text.
    pub original_length: usize,
    /// Characters of the summary.
    pub summary_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RequestDiagnostics>,
}

impl FileSummary {
    pub fn success(
        file: impl Into<String>,
        summary: String,
        model_used: String,
        original_length: usize,
        metadata: RequestDiagnostics,
    ) -> Self {
        Self {
            file: file.into(),
            status: FileStatus::Success,
            summary_length: summary.chars().count(),
            summary: Some(summary),
            original_length,
            model_used: Some(model_used),
            error: None,
            metadata: Some(metadata),
        }
    }

    pub fn empty(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: FileStatus::Empty,
            summary: None,
            original_length: 0,
            summary_length: 0,
            model_used: None,
            error: None,
            metadata: None,
        }
    }

    pub fn error(
        file: impl Into<String>,
        error: String,
        original_length: usize,
        metadata: RequestDiagnostics,
    ) -> Self {
        Self {
            file: file.into(),
            status: FileStatus::Error,
            summary: None,
            original_length,
            summary_length: 0,
            model_used: None,
            error: Some(error),
            metadata: Some(metadata),
        }
    }

    /// Map a client outcome for a document of `original_length` characters.
    pub fn from_outcome(
        file: impl Into<String>,
        original_length: usize,
        outcome: ModelRequestOutcome,
    ) -> Self {
        match outcome.usable_summary() {
            Some(_) => {
                let summary = outcome.summary.unwrap_or_default();
                Self::success(
                    file,
                    summary,
                    outcome.model_used,
                    original_length,
                    outcome.metadata,
                )
            }
            None => Self::error(
                file,
                outcome
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
                original_length,
                outcome.metadata,
            ),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FileStatus::Success
    }
}

/// Run-level bookkeeping attached to every folder result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub strategy: String,
    pub strategy_description: String,
    pub folder: String,
    pub total_files: usize,
    /// Number of files with status `success`.
    pub processed: usize,
    /// Relative paths of files whose status is not `success`.
    pub failed: Vec<String>,
    /// Wall-clock seconds for the whole run, pauses included.
    pub processing_time: f64,
}

/// Aggregate result of one folder run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderSummaryResult {
    pub overview: Option<String>,
    pub file_summaries: Vec<FileSummary>,
    pub metadata: RunMetadata,
}

impl FolderSummaryResult {
    /// File summaries with status `success`.
    pub fn successful(&self) -> impl Iterator<Item = &FileSummary> {
        self.file_summaries.iter().filter(|s| s.is_success())
    }
}

/// Name and description of a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool, summary: Option<&str>, error: Option<&str>) -> ModelRequestOutcome {
        ModelRequestOutcome {
            summary: summary.map(str::to_string),
            model_used: "m".to_string(),
            success,
            fallback_used: false,
            metadata: RequestDiagnostics::default(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_from_outcome_success() {
        let s = FileSummary::from_outcome("a.pdf", 120, outcome(true, Some("Договор"), None));
        assert_eq!(s.status, FileStatus::Success);
        assert_eq!(s.summary_length, 7);
        assert_eq!(s.original_length, 120);
        assert_eq!(s.model_used.as_deref(), Some("m"));
        assert!(s.error.is_none());
    }

    #[test]
    fn test_from_outcome_failure_and_blank_summary() {
        let failed = FileSummary::from_outcome("a.pdf", 5, outcome(false, None, Some("boom")));
        assert_eq!(failed.status, FileStatus::Error);
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.summary.is_none());
        assert!(failed.model_used.is_none());

        let blank = FileSummary::from_outcome("a.pdf", 5, outcome(true, Some("  "), None));
        assert_eq!(blank.status, FileStatus::Error);
        assert_eq!(blank.error.as_deref(), Some("Unknown error"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_value(FileSummary::empty("x.png")).unwrap();
        assert_eq!(json["status"], "empty");
        assert!(json.get("error").is_none());
        assert!(json["summary"].is_null());
    }
}
