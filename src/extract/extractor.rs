//! Text extraction from documents using pdftotext and Tesseract.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use walkdir::WalkDir;

use super::backend::{
    lowercase_extension, DocumentExtractor, ExtractionError, FolderExtraction, IMAGE_EXTENSIONS,
    PDF_EXTENSIONS, SUPPORTED_EXTENSIONS,
};
use super::command::check_binary;
use super::ocr::TesseractOcr;
use super::pdf;

/// Which handler a file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Direct text extraction from PDF.
    PdfToText,
    /// OCR using Tesseract.
    TesseractOcr,
}

impl ExtractionMethod {
    /// Pick the handler for a path, or `None` for unsupported extensions.
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = lowercase_extension(path)?;
        if PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::PdfToText)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::TesseractOcr)
        } else {
            None
        }
    }
}

/// Text extractor that uses external tools.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    ocr: TesseractOcr,
}

impl TextExtractor {
    /// Create a new text extractor with the default language set (`rus+eng`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Tesseract language.
    pub fn with_language(mut self, lang: &str) -> Self {
        self.ocr = TesseractOcr::new(Some(self.ocr.binary().to_path_buf()), lang);
        self
    }

    /// Use a specific Tesseract binary instead of the one on PATH.
    pub fn with_tesseract_cmd(mut self, cmd: Option<PathBuf>) -> Self {
        if let Some(cmd) = cmd {
            let lang = self.ocr.language().to_string();
            self.ocr = TesseractOcr::new(Some(cmd), &lang);
        }
        self
    }

    pub fn ocr_language(&self) -> &str {
        self.ocr.language()
    }

    /// Run the handler for `path`, surfacing errors.
    pub fn try_extract(&self, path: &Path) -> Result<String, ExtractionError> {
        if !path.is_file() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }

        match ExtractionMethod::for_path(path) {
            Some(ExtractionMethod::PdfToText) => {
                let text = pdf::extract_pages(path)?;
                info!("PDF extracted: {} ({} chars)", display_name(path), text.chars().count());
                Ok(text)
            }
            Some(ExtractionMethod::TesseractOcr) => {
                let text = self.ocr.recognize(path)?.trim().to_string();
                info!(
                    "Image recognized: {} ({} chars)",
                    display_name(path),
                    text.chars().count()
                );
                Ok(text)
            }
            None => Err(ExtractionError::UnsupportedFileType(
                lowercase_extension(path).unwrap_or_default(),
            )),
        }
    }

    /// Check if required tools are available.
    pub fn check_tools(&self) -> Vec<(String, bool)> {
        let mut tools: Vec<(String, bool)> = ["pdfinfo", "pdftotext"]
            .iter()
            .map(|tool| (tool.to_string(), check_binary(tool)))
            .collect();
        tools.push((
            self.ocr.binary().display().to_string(),
            self.ocr.is_available(),
        ));
        tools
    }
}

impl DocumentExtractor for TextExtractor {
    fn extract_file(&self, path: &Path) -> String {
        match self.try_extract(path) {
            Ok(text) => text,
            Err(ExtractionError::UnsupportedFileType(_)) => {
                info!("Skipped unsupported format: {}", path.display());
                String::new()
            }
            Err(ExtractionError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("File not found: {}", path.display());
                String::new()
            }
            Err(e) => {
                error!("Failed to extract {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    fn extract_folder(
        &self,
        root: &Path,
        recursive: bool,
    ) -> Result<FolderExtraction, ExtractionError> {
        let files = list_files(root, recursive)?;
        info!("Found {} files in {}", files.len(), root.display());

        let mut result = FolderExtraction {
            total_files: files.len(),
            ..Default::default()
        };

        for file in &files {
            let text = self.extract_file(file);
            let rel = relative_display(root, file);
            if text.trim().is_empty() {
                result.failed.push(rel);
            } else {
                result.content.insert(rel, text);
            }
        }
        result.processed = result.content.len();

        Ok(result)
    }

    fn supported_extensions(&self) -> &[&'static str] {
        SUPPORTED_EXTENSIONS
    }
}

/// List regular files under `root` in directory traversal order (unsorted).
///
/// Fails when `root` is missing or not a directory.
pub fn list_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, ExtractionError> {
    if !root.is_dir() {
        return Err(ExtractionError::FolderNotFound(root.to_path_buf()));
    }

    let mut walker = WalkDir::new(root).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry under {}: {}", root.display(), e),
        }
    }
    Ok(files)
}

/// Path of `file` relative to `root`, falling back to the full path.
pub fn relative_display(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
