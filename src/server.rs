use crate::config::Config;
use crate::engine::{LanguageHints, OcrEngine, OcrResult};
use crate::engines;
use crate::error::OcrError;
use crate::preprocessing::steps::decode::SUPPORTED_FORMATS;
use crate::preprocessing::steps::resize::MAX_DIMENSION;
use crate::preprocessing::{Pipeline, PreprocessingOptions, PreprocessingResult};
use crate::ui;
use axum::{
    body::Bytes,
    extract::{
        multipart::{Field, MultipartError},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and the small text fields next to the file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const NO_TEXT_WARNING: &str =
    "No text detected. Check that the image is in focus and the text is clearly visible.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn OcrEngine>,
    pub config: Arc<Config>,
}

/// How the image reached us; both are handled identically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Upload,
    Capture,
}

impl FromStr for CaptureMode {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "upload" => Ok(Self::Upload),
            "capture" | "camera" => Ok(Self::Capture),
            other => Err(OcrError::InvalidRequest(format!(
                "Unknown mode {:?}; expected \"upload\" or \"capture\"",
                other
            ))),
        }
    }
}

/// Outcome of a successful engine call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Success,
    /// Engine ran fine but found nothing but whitespace
    Empty,
}

/// OCR response
#[derive(Serialize)]
pub struct OcrResponse {
    pub status: ExtractionStatus,
    pub text: String,
    pub has_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub engine: String,
    pub languages: String,
    pub mode: CaptureMode,
    pub preprocessing: PreprocessingResult,
    pub processing_time_ms: u64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub engine_description: String,
    pub available_engines: Vec<String>,
    pub supported_formats: Vec<String>,
    pub supported_languages: Vec<String>,
    pub default_languages: String,
    pub default_high_quality: bool,
    pub max_dimension: u32,
    pub max_file_size_bytes: usize,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engine = engines::create_engine(&config)?;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        engine,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(ui::index))
        .route("/ocr", post(handle_ocr))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle OCR requests
async fn handle_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, OcrError> {
    let start = Instant::now();
    let max_file_size = state.config.max_file_size;

    let mut file_data: Option<Bytes> = None;
    let mut mode = CaptureMode::default();
    let mut high_quality: Option<bool> = None;
    let mut languages: Option<String> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to parse multipart", max_file_size))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                file_data = Some(field.bytes().await.map_err(|e| {
                    multipart_error(e, "Failed to read file data", max_file_size)
                })?);
            }
            "mode" => {
                mode = read_text(field, max_file_size).await?.parse()?;
            }
            "high_quality" => {
                high_quality = Some(parse_flag(&read_text(field, max_file_size).await?)?);
            }
            "languages" => {
                languages = Some(read_text(field, max_file_size).await?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    // Validate file was provided
    let data = file_data.ok_or(OcrError::MissingFile)?;
    if data.is_empty() {
        return Err(OcrError::Decode("empty upload".to_string()));
    }

    if data.len() > max_file_size {
        return Err(OcrError::ImageTooLarge {
            size: data.len(),
            max: max_file_size,
        });
    }

    let hints = match languages.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => LanguageHints::parse(s)?,
        _ => state.config.languages.clone(),
    };
    let options = PreprocessingOptions {
        high_quality: high_quality.unwrap_or(state.config.default_high_quality),
    };

    tracing::debug!(
        "Received {} bytes via {:?} (high_quality: {}, languages: {})",
        data.len(),
        mode,
        options.high_quality,
        hints
    );

    // Decoding, resampling and the engine call are all CPU or process bound
    let engine = state.engine.clone();
    let task_hints = hints.clone();
    let (preprocessing, result) =
        tokio::task::spawn_blocking(move || extract(engine.as_ref(), &data, options, &task_hints))
            .await
            .map_err(|e| OcrError::Internal(format!("Extraction task failed: {}", e)))??;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    let status = if result.has_content {
        ExtractionStatus::Success
    } else {
        ExtractionStatus::Empty
    };

    tracing::info!(
        "OCR completed in {}ms ({:?}), {}x{} -> {}x{}, text length: {}",
        processing_time_ms,
        status,
        preprocessing.original_width,
        preprocessing.original_height,
        preprocessing.width,
        preprocessing.height,
        result.text.len()
    );

    Ok(Json(OcrResponse {
        status,
        warning: (status == ExtractionStatus::Empty).then(|| NO_TEXT_WARNING.to_string()),
        text: result.text,
        has_content: result.has_content,
        engine: state.engine.name().to_string(),
        languages: hints.to_string(),
        mode,
        preprocessing,
        processing_time_ms,
    }))
}

/// Preprocess then recognize; decode errors return before the engine is touched
fn extract(
    engine: &dyn OcrEngine,
    raw: &[u8],
    options: PreprocessingOptions,
    hints: &LanguageHints,
) -> Result<(PreprocessingResult, OcrResult), OcrError> {
    let preprocessing = Pipeline::new(options).process(raw)?;
    let result = engine.extract_text(&preprocessing.image, hints)?;
    Ok((preprocessing, result))
}

async fn read_text(field: Field<'_>, max_file_size: usize) -> Result<String, OcrError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| multipart_error(e, &format!("Invalid {}", name), max_file_size))
}

/// Body-limit hits surface as multipart errors; report them as oversized uploads
fn multipart_error(err: MultipartError, context: &str, max_file_size: usize) -> OcrError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        OcrError::UploadTooLarge { max: max_file_size }
    } else {
        OcrError::InvalidRequest(format!("{}: {}", context, err))
    }
}

fn parse_flag(value: &str) -> Result<bool, OcrError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        other => Err(OcrError::InvalidRequest(format!(
            "Invalid high_quality value: {:?}",
            other
        ))),
    }
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.engine.name().to_string(),
        engine_description: state.engine.description().to_string(),
        available_engines: engines::available_engines()
            .into_iter()
            .map(str::to_string)
            .collect(),
        supported_formats: SUPPORTED_FORMATS
            .iter()
            .map(|f| f.to_mime_type().to_string())
            .collect(),
        supported_languages: state.engine.supported_languages(),
        default_languages: state.config.languages.to_string(),
        default_high_quality: state.config.default_high_quality,
        max_dimension: MAX_DIMENSION,
        max_file_size_bytes: state.config.max_file_size,
    })
}
