//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library, the same engine that ships as
//! WebAssembly for in-browser recognition. No system dependencies required.
//! Downloads neural network models automatically on first use.

use crate::engine::{LanguageHints, OcrEngine, OcrResult};
use crate::error::OcrError;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;
use std::path::{Path, PathBuf};

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Models are ~10MB each; ureq's default body limit is smaller
const MAX_MODEL_BYTES: u64 = 64 * 1024 * 1024;

/// Language codes the bundled recognition model covers
const LATIN_LANGUAGES: [&str; 8] = ["eng", "deu", "fra", "spa", "ita", "por", "nld", "lat"];

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Create the engine, downloading models if needed
    pub fn new() -> Result<Self, OcrError> {
        tracing::info!("Initializing ocrs OCR engine...");

        let detection_model_path =
            ensure_model_downloaded(DETECTION_MODEL_URL, "text-detection.rten")?;
        let recognition_model_path =
            ensure_model_downloaded(RECOGNITION_MODEL_URL, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            OcrError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self { engine })
    }

    /// Detection, line grouping and recognition; one string per text line
    fn recognize_lines(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        // HWC RGB8 is what ImageSource::from_bytes expects
        let rgb = image.to_rgb8();
        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(|e| stage_failed("image load", e))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| stage_failed("input preparation", e))?;

        let words = self
            .engine
            .detect_words(&input)
            .map_err(|e| stage_failed("word detection", e))?;
        let line_rects = self.engine.find_text_lines(&input, &words);

        let recognized = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| stage_failed("recognition", e))?;

        Ok(recognized
            .iter()
            .flatten()
            .map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect())
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "In-process ocrs engine (pure Rust, Latin script only)"
    }

    fn extract_text(
        &self,
        image: &DynamicImage,
        hints: &LanguageHints,
    ) -> Result<OcrResult, OcrError> {
        let ignored = unsupported_hints(hints);
        if !ignored.is_empty() {
            tracing::warn!(
                "ocrs recognizes Latin script only; ignoring language hints: {}",
                ignored.join(", ")
            );
        }

        let text = join_lines(self.recognize_lines(image)?.into_iter());

        Ok(OcrResult::from_text(text))
    }

    fn supported_languages(&self) -> Vec<String> {
        LATIN_LANGUAGES.iter().map(|s| s.to_string()).collect()
    }
}

fn stage_failed(stage: &str, err: impl std::fmt::Display) -> OcrError {
    OcrError::EngineFailure(format!("ocrs {} failed: {}", stage, err))
}

/// One output line per recognized line; lines with no readable words are dropped
fn join_lines(lines: impl Iterator<Item = String>) -> String {
    lines
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unsupported_hints(hints: &LanguageHints) -> Vec<&str> {
    hints
        .codes()
        .iter()
        .map(String::as_str)
        .filter(|code| !LATIN_LANGUAGES.contains(code))
        .collect()
}

/// Ensure model is downloaded and return its path
fn ensure_model_downloaded(url: &str, filename: &str) -> Result<PathBuf, OcrError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("photo-ocr");

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    let model_path = cache_dir.join(filename);

    if !model_path.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &model_path)?;
        tracing::info!("Downloaded {} to {:?}", filename, model_path);
    } else {
        tracing::info!("Using cached model from {:?}", model_path);
    }

    Ok(model_path)
}

/// Download a file from URL to path using ureq; the final path only appears once complete
fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::InitializationError(format!("Failed to download model: {}", e)))?;

    let mut body = response.into_body();
    let buffer = body
        .with_config()
        .limit(MAX_MODEL_BYTES)
        .read_to_vec()
        .map_err(|e| {
            OcrError::InitializationError(format!("Failed to read response body: {}", e))
        })?;

    let partial = path.with_extension("part");
    std::fs::write(&partial, &buffer)
        .map_err(|e| OcrError::InitializationError(format!("Failed to write model file: {}", e)))?;
    std::fs::rename(&partial, path)
        .map_err(|e| OcrError::InitializationError(format!("Failed to store model file: {}", e)))?;

    Ok(())
}
