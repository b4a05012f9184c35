//! Native Tesseract engine
//!
//! Runs the system `tesseract` binary as a subprocess. The binary is located
//! on every call, so installing it while the server runs takes effect
//! immediately.

use super::locator::EngineLocator;
use crate::engine::{LanguageHints, OcrEngine, OcrResult};
use crate::error::OcrError;
use image::DynamicImage;
use std::io::{ErrorKind, Write};
use std::process::Command;

/// Tesseract OCR Engine (subprocess)
pub struct TesseractEngine {
    locator: Box<dyn EngineLocator>,
}

impl TesseractEngine {
    pub fn new(locator: Box<dyn EngineLocator>) -> Self {
        Self { locator }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn description(&self) -> &'static str {
        "Native Tesseract OCR binary, run as a subprocess"
    }

    fn extract_text(
        &self,
        image: &DynamicImage,
        hints: &LanguageHints,
    ) -> Result<OcrResult, OcrError> {
        let binary = self.locator.locate()?;

        // PNG is lossless and read by every tesseract build
        let mut temp_file = tempfile::Builder::new()
            .prefix("photo-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Internal(format!("Failed to create temp file: {}", e)))?;

        image
            .write_to(&mut temp_file, image::ImageFormat::Png)
            .map_err(|e| OcrError::Internal(format!("Failed to encode image: {}", e)))?;
        temp_file
            .flush()
            .map_err(|e| OcrError::Internal(format!("Failed to write temp file: {}", e)))?;

        tracing::debug!(
            "Running {} on {}x{} image (languages: {})",
            binary.display(),
            image.width(),
            image.height(),
            hints
        );

        let output = Command::new(&binary)
            .arg(temp_file.path())
            .arg("stdout")
            .arg("-l")
            .arg(hints.to_string())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    OcrError::EngineUnavailable(format!(
                        "failed to start {}: {}",
                        binary.display(),
                        e
                    ))
                }
                _ => OcrError::EngineFailure(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
            let message = if stderr.is_empty() {
                format!("tesseract exited with {}", output.status)
            } else {
                stderr
            };
            return Err(OcrError::EngineFailure(message));
        }

        Ok(OcrResult::from_text(String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    fn supported_languages(&self) -> Vec<String> {
        // Installed language packs decide the real list
        ["jpn", "jpn_vert", "eng", "chi_sim", "chi_tra", "kor"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
