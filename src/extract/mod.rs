//! Text extraction module.
//!
//! Extracts text from documents using:
//! - pdftotext (Poppler) for page-by-page PDF text extraction
//! - Tesseract OCR for image files, after flattening transparency onto white
//!
//! Everything goes through the [`DocumentExtractor`] trait so strategies can be
//! pointed at a different OCR engine without changes.

mod backend;
mod command;
mod extractor;
mod ocr;
mod pdf;

pub use backend::{
    lowercase_extension, DocumentExtractor, ExtractionError, FolderExtraction, IMAGE_EXTENSIONS,
    PDF_EXTENSIONS, SUPPORTED_EXTENSIONS,
};
pub use command::check_binary;
pub use extractor::{list_files, relative_display, ExtractionMethod, TextExtractor};
pub use ocr::{flatten_onto_white, TesseractOcr};
