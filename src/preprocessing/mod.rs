//! Image preprocessing module for OCR input normalization
//!
//! Validates uploads, applies EXIF orientation, and enforces the resolution
//! policy before anything reaches an OCR engine.

pub mod pipeline;
pub mod steps;

#[cfg(test)]
pub(crate) mod test_support;

pub use pipeline::{Pipeline, PreprocessingOptions, PreprocessingResult};
