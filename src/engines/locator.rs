//! Discovery of the native OCR binary
//!
//! Platform-specific path probing lives here so engines only ever ask
//! "where is it?" and get a path or `EngineUnavailable`.

use crate::error::OcrError;
use std::path::PathBuf;

pub trait EngineLocator: Send + Sync {
    fn locate(&self) -> Result<PathBuf, OcrError>;
}

/// An explicitly configured binary path
#[derive(Debug, Clone)]
pub struct FixedLocator {
    path: PathBuf,
}

impl FixedLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EngineLocator for FixedLocator {
    fn locate(&self) -> Result<PathBuf, OcrError> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(OcrError::EngineUnavailable(format!(
                "configured binary {} does not exist; check the tesseract installation",
                self.path.display()
            )))
        }
    }
}

/// Probes well-known install directories, then every `PATH` entry
#[derive(Debug, Clone)]
pub struct PathProbeLocator {
    binary: String,
    candidates: Vec<PathBuf>,
    search_path: Option<std::ffi::OsString>,
}

impl PathProbeLocator {
    pub fn tesseract() -> Self {
        Self {
            binary: binary_name("tesseract"),
            candidates: default_candidates(),
            search_path: std::env::var_os("PATH"),
        }
    }

    #[cfg(test)]
    fn with_search(binary: &str, candidates: Vec<PathBuf>, search_path: Option<&str>) -> Self {
        Self {
            binary: binary.to_string(),
            candidates,
            search_path: search_path.map(Into::into),
        }
    }
}

impl EngineLocator for PathProbeLocator {
    fn locate(&self) -> Result<PathBuf, OcrError> {
        let from_candidates = self
            .candidates
            .iter()
            .map(|dir| dir.join(&self.binary))
            .find(|p| p.is_file());

        let found = from_candidates.or_else(|| {
            self.search_path.as_ref().and_then(|paths| {
                std::env::split_paths(paths)
                    .map(|dir| dir.join(&self.binary))
                    .find(|p| p.is_file())
            })
        });

        match found {
            Some(path) => {
                tracing::debug!("Located {} at {}", self.binary, path.display());
                Ok(path)
            }
            None => Err(OcrError::EngineUnavailable(format!(
                "{} not found in {} or PATH; install tesseract (with the needed language data) or pass --tesseract-path",
                self.binary,
                self.candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

fn binary_name(stem: &str) -> String {
    format!("{}{}", stem, std::env::consts::EXE_SUFFIX)
}

#[cfg(windows)]
fn default_candidates() -> Vec<PathBuf> {
    let mut dirs_to_probe = vec![
        PathBuf::from(r"C:\Program Files\Tesseract-OCR"),
        PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR"),
    ];
    if let Some(local) = dirs::data_local_dir() {
        dirs_to_probe.push(local.join("Tesseract-OCR"));
    }
    dirs_to_probe
}

#[cfg(not(windows))]
fn default_candidates() -> Vec<PathBuf> {
    ["/usr/bin", "/usr/local/bin", "/opt/homebrew/bin"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}
