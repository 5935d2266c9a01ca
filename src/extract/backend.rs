//! Extractor abstraction shared by the summarization strategies.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Lowercase extensions handled by the PDF path.
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Lowercase extensions handled by the OCR path.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp", "png", "bmp", "tiff"];

/// Every extension a [`TextExtractor`](super::TextExtractor) can turn into text.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "webp", "png", "bmp", "tiff"];

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Aggregated result of extracting every file in a folder.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderExtraction {
    /// Number of files found (supported or not).
    pub total_files: usize,
    /// Number of files that produced non-empty text.
    pub processed: usize,
    /// Relative paths of files that produced no text.
    pub failed: Vec<String>,
    /// Relative path -> extracted text.
    pub content: BTreeMap<String, String>,
}

/// Anything that can turn documents on disk into plain text.
///
/// `extract_file` must never fail: every problem is logged and collapses
/// into an empty string.
pub trait DocumentExtractor: Send + Sync {
    /// Extract text from a single file, or `""` if nothing could be read.
    fn extract_file(&self, path: &Path) -> String;

    /// Extract every file under `root`.
    ///
    /// Only fails when `root` is missing or not a directory.
    fn extract_folder(&self, root: &Path, recursive: bool)
        -> Result<FolderExtraction, ExtractionError>;

    /// Lowercase extensions (without the dot) this extractor understands.
    fn supported_extensions(&self) -> &[&'static str];

    /// Whether `path` carries one of the supported extensions.
    fn is_supported(&self, path: &Path) -> bool {
        match lowercase_extension(path) {
            Some(ext) => self.supported_extensions().contains(&ext.as_str()),
            None => false,
        }
    }
}

/// Lowercased extension of `path`, without the dot.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
