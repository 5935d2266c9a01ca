//! Tesseract OCR for raster images.
//!
//! Images carrying transparency are flattened onto white before recognition,
//! otherwise transparent regions come out black and produce junk glyphs.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;
use tracing::debug;

use super::backend::ExtractionError;
use super::command::{check_binary, handle_cmd_output};

/// Tesseract invocation settings.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    /// Binary to run (`tesseract` on PATH unless overridden).
    binary: PathBuf,
    /// Language set, e.g. `rus+eng`.
    language: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "rus+eng".to_string(),
        }
    }
}

impl TesseractOcr {
    pub fn new(binary: Option<PathBuf>, language: &str) -> Self {
        Self {
            binary: binary.unwrap_or_else(|| PathBuf::from("tesseract")),
            language: language.to_string(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn is_available(&self) -> bool {
        check_binary(&self.binary)
    }

    /// Decode, flatten and recognize an image file.
    pub fn recognize(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let img = image::open(image_path)?;
        let flattened = flatten_onto_white(img);

        let temp_dir = TempDir::new()?;
        let prepared = temp_dir.path().join("page.png");
        flattened.save_with_format(&prepared, ImageFormat::Png)?;
        debug!(
            "Prepared {} for OCR ({}x{})",
            image_path.display(),
            flattened.width(),
            flattened.height()
        );

        self.run_tesseract(&prepared)
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        handle_cmd_output(output, "tesseract (install tesseract-ocr)", "tesseract failed")
    }
}

/// Composite an image onto an opaque white background.
///
/// Images without an alpha channel are only converted to RGB. Palette images
/// are decoded to RGBA by the `image` crate, so they take the alpha path too.
pub fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}
