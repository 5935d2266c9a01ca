//! docsum - folder document summarizer.
//!
//! Text comes out of PDFs (Poppler) and scanned images (Tesseract), goes
//! through an OpenRouter model fallback chain and ends up as per-file
//! summaries plus an optional folder overview.

pub mod config;
pub mod extract;
pub mod llm;
pub mod rate_limit;
pub mod report;
pub mod summary;
