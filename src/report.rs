//! Text and JSON reports for a folder run.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};

use crate::summary::{FileStatus, FolderSummaryResult};

/// Where the reports of one run were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub text: PathBuf,
    pub json: PathBuf,
}

/// Write `summary_{timestamp}.txt` and `summary_{timestamp}.json` into `output_dir`.
pub fn write_reports(
    result: &FolderSummaryResult,
    output_dir: &Path,
    source: &Path,
) -> anyhow::Result<ReportPaths> {
    write_reports_at(result, output_dir, source, Local::now())
}

pub(crate) fn write_reports_at(
    result: &FolderSummaryResult,
    output_dir: &Path,
    source: &Path,
    now: DateTime<Local>,
) -> anyhow::Result<ReportPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let stamp = now.format("%Y%m%d_%H%M%S");
    let paths = ReportPaths {
        text: output_dir.join(format!("summary_{}.txt", stamp)),
        json: output_dir.join(format!("summary_{}.json", stamp)),
    };

    std::fs::write(&paths.text, render_text(result, source, now))
        .with_context(|| format!("Failed to write {}", paths.text.display()))?;

    let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    std::fs::write(&paths.json, json)
        .with_context(|| format!("Failed to write {}", paths.json.display()))?;

    tracing::info!(
        "Reports written: {} and {}",
        paths.text.display(),
        paths.json.display()
    );
    Ok(paths)
}

/// Human-readable report.
pub fn render_text(result: &FolderSummaryResult, source: &Path, now: DateTime<Local>) -> String {
    let rule = "=".repeat(80);
    let thin = "-".repeat(80);
    let meta = &result.metadata;
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "DOCUMENT SUMMARY REPORT");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Source: {}", source.display());
    let _ = writeln!(out, "Date: {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Strategy: {}", meta.strategy);
    let _ = writeln!(out);

    let _ = writeln!(out, "FOLDER OVERVIEW");
    let _ = writeln!(out, "{}", thin);
    match &result.overview {
        Some(overview) => {
            let _ = writeln!(out, "{}", overview);
        }
        None => {
            let _ = writeln!(out, "(no overview was built for this run)");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "FILES");
    let _ = writeln!(out, "{}", thin);
    for (i, summary) in result.file_summaries.iter().enumerate() {
        let _ = writeln!(out, "{}. {} [{}]", i + 1, summary.file, summary.status);
        let _ = writeln!(
            out,
            "   Length: {} -> {} chars",
            summary.original_length, summary.summary_length
        );
        if let Some(model) = &summary.model_used {
            let _ = writeln!(out, "   Model: {}", model);
        }
        match summary.status {
            FileStatus::Success => {
                let _ = writeln!(out, "{}", summary.summary.as_deref().unwrap_or_default());
            }
            FileStatus::Empty => {
                let _ = writeln!(out, "   No text could be extracted.");
            }
            FileStatus::Error => {
                let _ = writeln!(
                    out,
                    "   Error: {}",
                    summary.error.as_deref().unwrap_or("Unknown error")
                );
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "Processed: {}/{} | Failed: {} | Time: {:.2}s",
        meta.processed,
        meta.total_files,
        meta.failed.len(),
        meta.processing_time
    );
    out
}
