use super::orientation::{read_orientation, Orientation};
use crate::error::OcrError;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

/// Formats accepted from uploads, identified by content rather than filename
pub const SUPPORTED_FORMATS: [ImageFormat; 2] = [ImageFormat::Jpeg, ImageFormat::Png];

/// A decoded upload plus the orientation its metadata asks for
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
    pub orientation: Orientation,
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Validate and decode raw upload bytes.
///
/// The header is checked with one reader before a second reader performs the
/// full decode, so non-image and truncated payloads are rejected before any
/// pixel data is allocated.
pub fn decode_and_validate(raw: &[u8]) -> Result<DecodedImage, OcrError> {
    let format = validate(raw)?;

    let image = ImageReader::with_format(Cursor::new(raw), format)
        .decode()
        .map_err(|e| OcrError::Decode(e.to_string()))?;

    let orientation = read_orientation(raw);

    tracing::debug!(
        "Decoded {:?} image {}x{} (orientation: {})",
        format,
        image.width(),
        image.height(),
        orientation.as_str()
    );

    Ok(DecodedImage {
        image,
        format,
        orientation,
    })
}

/// Structural validation: recognizable JPEG/PNG with a readable, non-empty header
fn validate(raw: &[u8]) -> Result<ImageFormat, OcrError> {
    if raw.is_empty() {
        return Err(OcrError::Decode("empty input".to_string()));
    }

    let reader = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(|e| OcrError::Decode(e.to_string()))?;

    let format = reader.format().ok_or_else(|| {
        OcrError::Decode("unrecognized image format; expected JPEG or PNG".to_string())
    })?;

    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(OcrError::Decode(format!(
            "unsupported image format {:?}; expected JPEG or PNG",
            format
        )));
    }

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| OcrError::Decode(e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(OcrError::Decode(format!(
            "image has zero size ({}x{})",
            width, height
        )));
    }

    Ok(format)
}
