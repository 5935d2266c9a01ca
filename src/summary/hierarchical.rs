//! Per-file summaries followed by one folder-level overview.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use super::folder;
use super::models::{FileSummary, FolderSummaryResult};
use super::strategy::{RunOptions, SummarizationStrategy, SummaryError};
use crate::extract::DocumentExtractor;
use crate::llm::{SummarizationClient, AGGREGATION_HEADER};

/// Overview reported when the folder holds nothing to summarize.
pub const NO_DOCUMENTS_OVERVIEW: &str =
    "No supported documents (.pdf, .jpg, .webp, ...) found in the folder";

/// Summarizes each file, then asks the model to combine the summaries.
pub struct HierarchicalStrategy {
    extractor: Arc<dyn DocumentExtractor>,
    client: Arc<dyn SummarizationClient>,
    min_files_for_aggregation: usize,
    per_file_temperature: f32,
    aggregation_temperature: f32,
}

impl HierarchicalStrategy {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        client: Arc<dyn SummarizationClient>,
        min_files_for_aggregation: usize,
    ) -> Self {
        Self {
            extractor,
            client,
            min_files_for_aggregation,
            per_file_temperature: 0.3,
            aggregation_temperature: 0.4,
        }
    }

    pub fn with_temperatures(mut self, per_file: f32, aggregation: f32) -> Self {
        self.per_file_temperature = per_file;
        self.aggregation_temperature = aggregation;
        self
    }

    async fn aggregate(&self, successes: &[&FileSummary]) -> String {
        info!("Building folder overview from {} summaries", successes.len());
        let outcome = self
            .client
            .summarize(
                &aggregation_input(successes),
                self.aggregation_temperature,
                None,
            )
            .await;

        match outcome.usable_summary() {
            Some(overview) => overview.to_string(),
            None => {
                let reason = outcome
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string());
                warn!("Folder overview failed: {}", reason);
                format!("Failed to build a folder overview.\nReason: {}", reason)
            }
        }
    }
}

/// Concatenate successful summaries under numbered headings.
pub fn aggregation_input(successes: &[&FileSummary]) -> String {
    let mut text = String::from(AGGREGATION_HEADER);
    for (i, summary) in successes.iter().enumerate() {
        let file_name = Path::new(&summary.file)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| summary.file.clone());
        text.push_str(&format!(
            "Document {} ({}):\n{}\n\n",
            i + 1,
            file_name,
            summary.summary.as_deref().unwrap_or_default()
        ));
    }
    text
}

#[async_trait]
impl SummarizationStrategy for HierarchicalStrategy {
    async fn summarize_folder(
        &self,
        folder_path: &Path,
        recursive: bool,
        options: &RunOptions,
    ) -> Result<FolderSummaryResult, SummaryError> {
        let started = Instant::now();
        let files = folder::discover(self.extractor.as_ref(), folder_path, recursive)?;
        if files.is_empty() {
            return Ok(folder::finish(
                self.name(),
                self.description(),
                folder_path,
                0,
                Vec::new(),
                Some(NO_DOCUMENTS_OVERVIEW.to_string()),
                started,
            ));
        }

        let summaries = folder::summarize_all(
            self.extractor.as_ref(),
            self.client.as_ref(),
            folder_path,
            &files,
            self.per_file_temperature,
            options,
        )
        .await;

        let successes: Vec<&FileSummary> = summaries.iter().filter(|s| s.is_success()).collect();
        let overview = if successes.len() >= self.min_files_for_aggregation && !successes.is_empty()
        {
            Some(self.aggregate(&successes).await)
        } else {
            info!(
                "Skipping folder overview: {} summaries, {} required",
                successes.len(),
                self.min_files_for_aggregation
            );
            None
        };

        Ok(folder::finish(
            self.name(),
            self.description(),
            folder_path,
            files.len(),
            summaries,
            overview,
            started,
        ))
    }

    fn name(&self) -> &'static str {
        "hierarchical"
    }

    fn description(&self) -> &'static str {
        "Hierarchical summarization: every file is summarized separately, \
         then the summaries are combined into one overview of the folder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::testing::{FakeClient, FakeExtractor};
    use crate::summary::FileStatus;
    use std::time::Duration;

    fn folder_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        dir
    }

    fn no_pause() -> RunOptions {
        RunOptions::default().with_pause(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_overview_built_from_successes() {
        let dir = folder_with(&["a.pdf", "b.jpg"]);
        let client = Arc::new(FakeClient::default());
        let strategy = HierarchicalStrategy::new(
            Arc::new(FakeExtractor::default()),
            client.clone(),
            2,
        )
        .with_temperatures(0.2, 0.6);

        let result = strategy
            .summarize_folder(dir.path(), false, &no_pause())
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        let (aggregation_text, temperature) = &calls[2];
        assert_eq!(*temperature, 0.6);
        assert!(aggregation_text.starts_with(AGGREGATION_HEADER));
        assert!(aggregation_text.contains("Document 1 ("));
        assert!(aggregation_text.contains("Document 2 ("));
        assert!(aggregation_text.contains("(a.pdf):\nSummary of: Content of a.pdf\n\n"));
        assert!(aggregation_text.contains("(b.jpg):\nSummary of: Content of b.jpg\n\n"));
        assert!(result.overview.unwrap().starts_with("Summary of: "));
    }

    #[tokio::test]
    async fn test_below_threshold_skips_aggregation() {
        let dir = folder_with(&["a.pdf", "b.pdf"]);
        let extractor = FakeExtractor::default().with_text("b.pdf", "FAIL here");
        let client = Arc::new(FakeClient::failing_on("FAIL"));
        let strategy = HierarchicalStrategy::new(Arc::new(extractor), client.clone(), 2);

        let result = strategy
            .summarize_folder(dir.path(), false, &no_pause())
            .await
            .unwrap();

        assert!(result.overview.is_none());
        assert_eq!(client.calls().len(), 2);
        assert_eq!(result.metadata.failed, vec!["b.pdf"]);
        let failed = result
            .file_summaries
            .iter()
            .find(|s| s.file == "b.pdf")
            .unwrap();
        assert_eq!(failed.status, FileStatus::Error);
        assert_eq!(
            failed.error.as_deref(),
            Some("All models unavailable. Last error: boom")
        );
    }

    #[tokio::test]
    async fn test_threshold_of_one_aggregates_single_success() {
        let dir = folder_with(&["only.pdf"]);
        let client = Arc::new(FakeClient::default());
        let strategy = HierarchicalStrategy::new(Arc::new(FakeExtractor::default()), client.clone(), 1);

        let result = strategy
            .summarize_folder(dir.path(), false, &no_pause())
            .await
            .unwrap();

        assert_eq!(client.calls().len(), 2);
        assert!(result.overview.is_some());
    }

    #[tokio::test]
    async fn test_aggregation_failure_message() {
        let dir = folder_with(&["a.pdf", "b.pdf"]);
        let client = Arc::new(FakeClient::failing_on(AGGREGATION_HEADER));
        let strategy = HierarchicalStrategy::new(Arc::new(FakeExtractor::default()), client, 2);

        let result = strategy
            .summarize_folder(dir.path(), false, &no_pause())
            .await
            .unwrap();

        assert_eq!(
            result.overview.as_deref(),
            Some("Failed to build a folder overview.\nReason: All models unavailable. Last error: boom")
        );
        assert_eq!(result.metadata.processed, 2);
    }

    #[tokio::test]
    async fn test_empty_folder_overview() {
        let dir = folder_with(&["readme.txt"]);
        let client = Arc::new(FakeClient::default());
        let strategy = HierarchicalStrategy::new(Arc::new(FakeExtractor::default()), client.clone(), 2);

        let result = strategy
            .summarize_folder(dir.path(), false, &no_pause())
            .await
            .unwrap();

        assert_eq!(result.overview.as_deref(), Some(NO_DOCUMENTS_OVERVIEW));
        assert_eq!(result.metadata.total_files, 0);
        assert_eq!(result.metadata.processed, 0);
        assert!(result.metadata.failed.is_empty());
        assert!(result.file_summaries.is_empty());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pause_only_between_files() {
        let dir = folder_with(&["a.pdf", "b.pdf"]);
        let strategy = HierarchicalStrategy::new(
            Arc::new(FakeExtractor::default()),
            Arc::new(FakeClient::default()),
            5,
        );
        let options = RunOptions::default().with_pause(Duration::from_millis(150));

        let started = std::time::Instant::now();
        strategy
            .summarize_folder(dir.path(), false, &options)
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(150));
        assert!(elapsed < Duration::from_millis(300));
    }
}
