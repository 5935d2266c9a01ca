//! In-memory extractor and client for strategy tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::extract::{DocumentExtractor, ExtractionError, FolderExtraction, SUPPORTED_EXTENSIONS};
use crate::llm::{ModelRequestOutcome, SummarizationClient};

/// Returns `"Content of <file name>"` unless a text was registered.
#[derive(Default)]
pub(crate) struct FakeExtractor {
    texts: HashMap<String, String>,
}

impl FakeExtractor {
    pub(crate) fn with_text(mut self, file_name: &str, text: &str) -> Self {
        self.texts.insert(file_name.to_string(), text.to_string());
        self
    }
}

impl DocumentExtractor for FakeExtractor {
    fn extract_file(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.texts
            .get(&name)
            .cloned()
            .unwrap_or_else(|| format!("Content of {}", name))
    }

    fn extract_folder(
        &self,
        _root: &Path,
        _recursive: bool,
    ) -> Result<FolderExtraction, ExtractionError> {
        Ok(FolderExtraction::default())
    }

    fn supported_extensions(&self) -> &[&'static str] {
        SUPPORTED_EXTENSIONS
    }
}

/// Echoes a summary of every text, failing those containing a marker.
#[derive(Default)]
pub(crate) struct FakeClient {
    fail_marker: Option<String>,
    calls: Mutex<Vec<(String, f32)>>,
}

impl FakeClient {
    pub(crate) fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(text, temperature)` of every call so far.
    pub(crate) fn calls(&self) -> Vec<(String, f32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarizationClient for FakeClient {
    async fn summarize(
        &self,
        text: &str,
        temperature: f32,
        _strategy: Option<&str>,
    ) -> ModelRequestOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), temperature));

        let models = vec!["fake/model".to_string()];
        match &self.fail_marker {
            Some(marker) if text.contains(marker.as_str()) => ModelRequestOutcome::exhausted(
                &models,
                false,
                "All models unavailable. Last error: boom".to_string(),
            ),
            _ => ModelRequestOutcome::succeeded(
                format!("Summary of: {}", text.lines().next().unwrap_or_default()),
                "fake/model",
                0,
                false,
                text.chars().count(),
            ),
        }
    }
}
