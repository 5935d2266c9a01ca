//! Page-by-page PDF text extraction using Poppler's command-line tools.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use super::backend::ExtractionError;
use super::command::handle_cmd_output;

/// Get the page count of a PDF from `pdfinfo`.
pub fn page_count(file_path: &Path) -> Result<u32, ExtractionError> {
    let output = Command::new("pdfinfo").arg(file_path).output();
    let stdout = handle_cmd_output(output, "pdfinfo (install poppler-utils)", "pdfinfo failed")?;

    stdout
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ExtractionError::ExtractionFailed("pdfinfo reported no page count".to_string())
        })
}

/// Run pdftotext on a single page of a PDF file.
pub fn page_text(file_path: &Path, page: u32) -> Result<String, ExtractionError> {
    let page_str = page.to_string();
    let output = Command::new("pdftotext")
        .args(["-layout", "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
        .arg(file_path)
        .arg("-") // Output to stdout
        .output();

    handle_cmd_output(
        output,
        "pdftotext (install poppler-utils)",
        &format!("pdftotext failed on page {}", page),
    )
}

/// Extract all pages, each prefixed with a page marker.
///
/// Pages without text are skipped; a single failing page does not abort
/// the document.
pub fn extract_pages(file_path: &Path) -> Result<String, ExtractionError> {
    let pages = page_count(file_path)?;
    debug!("PDF {} has {} pages", file_path.display(), pages);

    let mut text = String::new();
    for page in 1..=pages {
        match page_text(file_path, page) {
            Ok(page_text) => push_page(&mut text, page, &page_text),
            Err(ExtractionError::ToolNotFound(tool)) => {
                return Err(ExtractionError::ToolNotFound(tool));
            }
            Err(e) => warn!("Skipping page {} of {}: {}", page, file_path.display(), e),
        }
    }

    Ok(text.trim().to_string())
}

/// Append one page with its marker, ignoring blank pages.
fn push_page(buf: &mut String, page: u32, page_text: &str) {
    if page_text.trim().is_empty() {
        return;
    }
    buf.push_str(&format!("\n--- Page {} ---\n{}\n", page, page_text));
}
