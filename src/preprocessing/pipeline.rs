use crate::error::OcrError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::steps::{self, decode::DecodedImage};

/// Caller-selected preprocessing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessingOptions {
    /// Skip downscaling entirely
    pub high_quality: bool,
}

impl Default for PreprocessingOptions {
    fn default() -> Self {
        Self { high_quality: true }
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub image: DynamicImage,
    pub original_width: u32,
    pub original_height: u32,
    pub width: u32,
    pub height: u32,
    /// Orientation correction that was applied
    pub orientation: String,
    pub high_quality: bool,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Decode → orientation → resolution policy, in that order
pub struct Pipeline {
    options: PreprocessingOptions,
}

impl Pipeline {
    pub fn new(options: PreprocessingOptions) -> Self {
        Self { options }
    }

    /// Process raw upload bytes into an image ready for the OCR engine
    pub fn process(&self, raw: &[u8]) -> Result<PreprocessingResult, OcrError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();

        let decode_start = Instant::now();
        let decoded = steps::decode::decode_and_validate(raw)?;
        steps_timing.push(StepTiming {
            name: "decode".to_string(),
            time_ms: decode_start.elapsed().as_millis() as u64,
        });

        let (original_width, original_height) = decoded.dimensions();
        let orientation = decoded.orientation;

        let decoded = self.run_step(
            "orientation",
            decoded,
            &mut steps_timing,
            steps::orientation::normalize_orientation,
        );

        let options = self.options;
        let decoded = self.run_step("resize", decoded, &mut steps_timing, |d| {
            steps::resize::apply_resolution_policy(d, &options)
        });

        let (width, height) = decoded.dimensions();

        Ok(PreprocessingResult {
            image: decoded.image,
            original_width,
            original_height,
            width,
            height,
            orientation: orientation.as_str().to_string(),
            high_quality: self.options.high_quality,
            total_time_ms: start.elapsed().as_millis() as u64,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        decoded: DecodedImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> DecodedImage
    where
        F: FnOnce(DecodedImage) -> DecodedImage,
    {
        let step_start = Instant::now();
        let result = step_fn(decoded);
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!("Preprocessing step '{}' took {}ms", name, time_ms);
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms,
        });
        result
    }
}
