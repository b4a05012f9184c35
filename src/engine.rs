use crate::error::OcrError;
use image::DynamicImage;
use serde::Serialize;
use std::fmt;

/// OCR processing result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OcrResult {
    pub text: String,
    /// False when the engine returned nothing but whitespace
    pub has_content: bool,
}

impl OcrResult {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let has_content = !text.trim().is_empty();
        Self { text, has_content }
    }
}

/// Ordered engine language codes, e.g. `jpn+eng`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageHints(Vec<String>);

impl LanguageHints {
    /// Parse a `+` or `,` separated list of language codes
    pub fn parse(s: &str) -> Result<Self, OcrError> {
        let codes: Vec<String> = s
            .split(['+', ','])
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        if codes.is_empty() {
            return Err(OcrError::InvalidRequest(
                "At least one language code is required".to_string(),
            ));
        }

        // Codes end up on an engine command line
        if let Some(bad) = codes
            .iter()
            .find(|c| !c.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_'))
        {
            return Err(OcrError::InvalidRequest(format!(
                "Invalid language code: {:?}",
                bad
            )));
        }

        Ok(Self(codes))
    }

    pub fn codes(&self) -> &[String] {
        &self.0
    }
}

impl Default for LanguageHints {
    /// Japanese primary, English secondary
    fn default() -> Self {
        Self(vec!["jpn".to_string(), "eng".to_string()])
    }
}

impl fmt::Display for LanguageHints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("+"))
    }
}

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract", "ocrs")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize text in a fully preprocessed image
    fn extract_text(
        &self,
        image: &DynamicImage,
        hints: &LanguageHints,
    ) -> Result<OcrResult, OcrError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}
