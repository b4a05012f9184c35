use super::decode::DecodedImage;
use crate::preprocessing::PreprocessingOptions;
use image::imageops::FilterType;

/// Largest side allowed when high quality mode is off
pub const MAX_DIMENSION: u32 = 800;

/// Downscale unless the caller asked for high quality.
///
/// Aspect ratio is preserved and the larger side ends at `MAX_DIMENSION`.
/// Images already within bounds are returned untouched, never upscaled.
pub fn apply_resolution_policy(
    decoded: DecodedImage,
    options: &PreprocessingOptions,
) -> DecodedImage {
    if options.high_quality {
        return decoded;
    }

    let (width, height) = decoded.dimensions();
    if width.max(height) <= MAX_DIMENSION {
        return decoded;
    }

    // Lanczos keeps glyph edges free of the aliasing nearest-neighbour introduces
    let image = decoded
        .image
        .resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3);

    tracing::debug!(
        "Downscaled {}x{} to {}x{}",
        width,
        height,
        image.width(),
        image.height()
    );

    DecodedImage { image, ..decoded }
}
