//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. The engine is chosen once at startup; the preprocessing
//! pipeline is identical for all of them.

pub mod locator;
pub mod tesseract;

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::OcrError;
use locator::{EngineLocator, FixedLocator, PathProbeLocator};
use std::fmt;
use std::sync::Arc;

/// Selectable engine backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EngineKind {
    /// Native tesseract binary (subprocess)
    Tesseract,
    /// In-process ocrs engine (requires the `engine-ocrs` feature)
    Ocrs,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tesseract => "tesseract",
            Self::Ocrs => "ocrs",
        }
    }

    /// Whether this build can construct the engine
    pub fn is_compiled(&self) -> bool {
        match self {
            Self::Tesseract => true,
            Self::Ocrs => cfg!(feature = "engine-ocrs"),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engines this build can run
pub fn available_engines() -> Vec<&'static str> {
    [EngineKind::Tesseract, EngineKind::Ocrs]
        .iter()
        .filter(|k| k.is_compiled())
        .map(|k| k.as_str())
        .collect()
}

/// Build the engine selected in the configuration
pub fn create_engine(config: &Config) -> Result<Arc<dyn OcrEngine>, OcrError> {
    match config.engine {
        EngineKind::Tesseract => {
            let locator: Box<dyn EngineLocator> = match &config.tesseract_path {
                Some(path) => Box::new(FixedLocator::new(path)),
                None => Box::new(PathProbeLocator::tesseract()),
            };

            // Missing binary is reported per request, not at startup
            if let Err(e) = locator.locate() {
                tracing::warn!("{}", e);
            }

            tracing::info!("Initializing tesseract engine...");
            Ok(Arc::new(tesseract::TesseractEngine::new(locator)))
        }
        #[cfg(feature = "engine-ocrs")]
        EngineKind::Ocrs => Ok(Arc::new(ocrs::OcrsEngine::new()?)),
        #[cfg(not(feature = "engine-ocrs"))]
        EngineKind::Ocrs => Err(OcrError::InitializationError(
            "ocrs engine not available. Build with --features engine-ocrs".to_string(),
        )),
    }
}
