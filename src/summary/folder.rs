//! Folder-run plumbing shared by the strategies.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::models::{FileSummary, FolderSummaryResult, RunMetadata};
use super::strategy::{RunOptions, SummaryError};
use crate::extract::{list_files, relative_display, DocumentExtractor};
use crate::llm::SummarizationClient;

/// Supported documents under `folder`, in walk order.
pub(crate) fn discover(
    extractor: &dyn DocumentExtractor,
    folder: &Path,
    recursive: bool,
) -> Result<Vec<PathBuf>, SummaryError> {
    if !folder.is_dir() {
        return Err(SummaryError::FolderNotFound(folder.to_path_buf()));
    }
    let files: Vec<PathBuf> = list_files(folder, recursive)?
        .into_iter()
        .filter(|path| extractor.is_supported(path))
        .collect();
    info!(
        "Found {} supported file(s) in {}",
        files.len(),
        folder.display()
    );
    Ok(files)
}

/// Extract and summarize a single document.
pub(crate) async fn summarize_file(
    extractor: &dyn DocumentExtractor,
    client: &dyn SummarizationClient,
    folder: &Path,
    path: &Path,
    temperature: f32,
) -> FileSummary {
    let name = relative_display(folder, path);
    let text = extractor.extract_file(path);
    if text.trim().is_empty() {
        warn!("No text extracted from {}", name);
        return FileSummary::empty(name);
    }

    let original_length = text.chars().count();
    debug!("Summarizing {} ({} chars)", name, original_length);
    let outcome = client.summarize(&text, temperature, None).await;
    let summary = FileSummary::from_outcome(name, original_length, outcome);
    match &summary.error {
        None => info!(
            "Summarized {} with {}",
            summary.file,
            summary.model_used.as_deref().unwrap_or("unknown")
        ),
        Some(e) => warn!("Failed to summarize {}: {}", summary.file, e),
    }
    summary
}

/// Summarize `files` one at a time, pausing between consecutive files.
pub(crate) async fn summarize_all(
    extractor: &dyn DocumentExtractor,
    client: &dyn SummarizationClient,
    folder: &Path,
    files: &[PathBuf],
    temperature: f32,
    options: &RunOptions,
) -> Vec<FileSummary> {
    let mut summaries = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        info!(
            "[{}/{}] {}",
            i + 1,
            files.len(),
            relative_display(folder, path)
        );
        summaries.push(summarize_file(extractor, client, folder, path, temperature).await);

        let is_last = i + 1 == files.len();
        if !is_last && options.pause_between_files > Duration::ZERO {
            tokio::time::sleep(options.pause_between_files).await;
        }
    }
    summaries
}

/// Assemble the folder result and its run metadata.
pub(crate) fn finish(
    name: &str,
    description: &str,
    folder: &Path,
    total_files: usize,
    file_summaries: Vec<FileSummary>,
    overview: Option<String>,
    started: Instant,
) -> FolderSummaryResult {
    let failed: Vec<String> = file_summaries
        .iter()
        .filter(|s| !s.is_success())
        .map(|s| s.file.clone())
        .collect();
    let processed = file_summaries.len() - failed.len();
    let elapsed = started.elapsed().as_secs_f64();

    info!(
        "Folder {} done: {}/{} summarized in {:.2}s",
        folder.display(),
        processed,
        total_files,
        elapsed
    );

    FolderSummaryResult {
        overview,
        file_summaries,
        metadata: RunMetadata {
            strategy: name.to_string(),
            strategy_description: description.to_string(),
            folder: folder.display().to_string(),
            total_files,
            processed,
            failed,
            processing_time: (elapsed * 100.0).round() / 100.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::testing::{FakeClient, FakeExtractor};
    use crate::summary::FileStatus;
    use std::collections::BTreeSet;

    #[test]
    fn test_discover_filters_unsupported_and_rejects_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PDF", "a.jpg", "notes.txt", "c.webp"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let extractor = FakeExtractor::default();
        let files = discover(&extractor, dir.path(), false).unwrap();
        let names: BTreeSet<String> = files
            .iter()
            .map(|p| relative_display(dir.path(), p))
            .collect();
        let expected: BTreeSet<String> = ["a.jpg", "b.PDF", "c.webp"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, expected);

        let missing = discover(&extractor, &dir.path().join("nope"), false);
        assert!(matches!(missing, Err(SummaryError::FolderNotFound(_))));
    }

    #[test]
    fn test_discover_respects_recursion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("top.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("sub").join("deep.png"), b"x").unwrap();
        let extractor = FakeExtractor::default();

        assert_eq!(discover(&extractor, dir.path(), false).unwrap().len(), 1);
        assert_eq!(discover(&extractor, dir.path(), true).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_text_is_empty_without_calling_client() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        std::fs::write(&path, b"x").unwrap();
        let extractor = FakeExtractor::default().with_text("scan.jpg", "  \n\t ");
        let client = FakeClient::default();

        let summary = summarize_file(&extractor, &client, dir.path(), &path, 0.3).await;
        assert_eq!(summary.status, FileStatus::Empty);
        assert_eq!(client.calls().len(), 0);
    }

    #[tokio::test]
    async fn test_pause_follows_empty_files_too() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = ["blank.jpg", "scan.jpg"]
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, b"x").unwrap();
                path
            })
            .collect();
        let extractor = FakeExtractor::default().with_text("blank.jpg", "");
        let client = FakeClient::default();
        let options = RunOptions::default().with_pause(Duration::from_millis(120));

        let started = Instant::now();
        let summaries =
            summarize_all(&extractor, &client, dir.path(), &files, 0.3, &options).await;

        assert_eq!(summaries[0].status, FileStatus::Empty);
        assert_eq!(client.calls().len(), 1);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(120));
        assert!(elapsed < Duration::from_millis(240));
    }

    #[tokio::test]
    async fn test_finish_counts_failures() {
        let started = Instant::now();
        let result = finish(
            "simple",
            "desc",
            Path::new("/docs"),
            2,
            vec![
                FileSummary::empty("a.jpg"),
                FileSummary::success(
                    "b.pdf",
                    "ok".to_string(),
                    "m".to_string(),
                    10,
                    Default::default(),
                ),
            ],
            None,
            started,
        );
        assert_eq!(result.metadata.processed, 1);
        assert_eq!(result.metadata.failed, vec!["a.jpg"]);
        assert!(result.metadata.processing_time >= 0.0);
    }
}
