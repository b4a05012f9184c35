use crate::engine::LanguageHints;
use crate::engines::EngineKind;
use crate::error::OcrError;
use crate::Args;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub languages: LanguageHints,
    pub max_file_size: usize,
    pub engine: EngineKind,
    pub tesseract_path: Option<String>,
    pub default_high_quality: bool,
}

impl TryFrom<Args> for Config {
    type Error = OcrError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        Ok(Self {
            host: args.host,
            port: args.port,
            languages: LanguageHints::parse(&args.languages)?,
            max_file_size: args.max_file_size,
            engine: args.engine,
            tesseract_path: args.tesseract_path.filter(|p| !p.trim().is_empty()),
            default_high_quality: args.default_high_quality,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Config used by in-crate tests: loopback, default hints, tesseract engine
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            languages: LanguageHints::default(),
            max_file_size: 16 * 1024 * 1024,
            engine: EngineKind::Tesseract,
            tesseract_path: None,
            default_high_quality: true,
        }
    }
}
