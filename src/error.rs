use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    /// The upload is not a JPEG/PNG image, or it is structurally broken
    #[error("Cannot identify image: {0}")]
    Decode(String),

    /// The engine could not be located or started
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine started but reported an error; the message is the engine's own, minus trailing whitespace
    #[error("OCR engine failed: {0}")]
    EngineFailure(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    /// The request body hit the upload limit before the file was fully read
    #[error("Image too large: upload exceeds the {max} byte limit")]
    UploadTooLarge { max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            OcrError::InitializationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INIT_ERROR"),
            OcrError::Decode(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_ERROR"),
            OcrError::EngineUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "ENGINE_UNAVAILABLE")
            }
            OcrError::EngineFailure(_) => (StatusCode::BAD_GATEWAY, "ENGINE_FAILURE"),
            OcrError::ImageTooLarge { .. } | OcrError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE")
            }
            OcrError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            OcrError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            OcrError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            OcrError::InitializationError(_) | OcrError::Internal(_) => {
                tracing::error!("{}", self)
            }
            OcrError::EngineUnavailable(_) | OcrError::EngineFailure(_) => {
                tracing::warn!("{}", self)
            }
            _ => tracing::debug!("Rejected request: {}", self),
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
