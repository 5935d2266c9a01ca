//! Per-file summaries only.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::folder;
use super::models::FolderSummaryResult;
use super::strategy::{RunOptions, SummarizationStrategy, SummaryError};
use crate::extract::DocumentExtractor;
use crate::llm::SummarizationClient;

/// Summarizes each file separately and never builds an overview.
pub struct SimpleStrategy {
    extractor: Arc<dyn DocumentExtractor>,
    client: Arc<dyn SummarizationClient>,
    temperature: f32,
}

impl SimpleStrategy {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, client: Arc<dyn SummarizationClient>) -> Self {
        Self {
            extractor,
            client,
            temperature: 0.3,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl SummarizationStrategy for SimpleStrategy {
    async fn summarize_folder(
        &self,
        folder_path: &Path,
        recursive: bool,
        options: &RunOptions,
    ) -> Result<FolderSummaryResult, SummaryError> {
        let started = Instant::now();
        let files = folder::discover(self.extractor.as_ref(), folder_path, recursive)?;
        let summaries = folder::summarize_all(
            self.extractor.as_ref(),
            self.client.as_ref(),
            folder_path,
            &files,
            self.temperature,
            options,
        )
        .await;

        Ok(folder::finish(
            self.name(),
            self.description(),
            folder_path,
            files.len(),
            summaries,
            None,
            started,
        ))
    }

    fn name(&self) -> &'static str {
        "simple"
    }

    fn description(&self) -> &'static str {
        "Simple summarization: every file is summarized separately and no folder overview is built"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::testing::{FakeClient, FakeExtractor};
    use std::time::Duration;

    #[tokio::test]
    async fn test_simple_never_aggregates() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let client = Arc::new(FakeClient::default());
        let strategy = SimpleStrategy::new(Arc::new(FakeExtractor::default()), client.clone())
            .with_temperature(0.1);
        let options = RunOptions::default().with_pause(Duration::ZERO);

        let result = strategy
            .summarize_folder(dir.path(), false, &options)
            .await
            .unwrap();

        assert!(result.overview.is_none());
        assert_eq!(result.metadata.processed, 3);
        assert_eq!(result.metadata.strategy, "simple");
        assert_eq!(client.calls().len(), 3);
        assert!(client.calls().iter().all(|(_, t)| *t == 0.1));
    }

    #[tokio::test]
    async fn test_simple_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = SimpleStrategy::new(
            Arc::new(FakeExtractor::default()),
            Arc::new(FakeClient::default()),
        );
        let result = strategy
            .summarize_folder(dir.path(), true, &RunOptions::default())
            .await
            .unwrap();
        assert!(result.overview.is_none());
        assert_eq!(result.metadata.total_files, 0);
        assert_eq!(result.metadata.processed, 0);
        assert!(result.metadata.failed.is_empty());
        assert!(result.file_summaries.is_empty());
    }
}
