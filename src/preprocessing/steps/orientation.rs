use super::decode::DecodedImage;
use std::io::Cursor;

/// Correction requested by the EXIF orientation tag (0x0112).
///
/// Only the pure rotations are acted on; mirrored variants (2, 4, 5, 7) and
/// unknown values are treated as `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Tag 1, or no usable tag
    #[default]
    Normal,
    /// Tag 3
    Rotate180,
    /// Tag 6: turn a quarter clockwise (270° counter-clockwise)
    Rotate90Cw,
    /// Tag 8: turn a quarter counter-clockwise (90° counter-clockwise)
    Rotate270Cw,
}

impl Orientation {
    pub fn from_exif(value: u32) -> Self {
        match value {
            3 => Self::Rotate180,
            6 => Self::Rotate90Cw,
            8 => Self::Rotate270Cw,
            _ => Self::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Rotate180 => "rotate-180",
            Self::Rotate90Cw => "rotate-90-cw",
            Self::Rotate270Cw => "rotate-270-cw",
        }
    }
}

/// Read the orientation tag from raw image bytes.
///
/// Missing, corrupt, or unsupported metadata all yield `Normal`.
pub fn read_orientation(raw: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(raw);
    let metadata = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::trace!("No usable EXIF metadata: {}", e);
            return Orientation::Normal;
        }
    };

    metadata
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from_exif)
        .unwrap_or_default()
}

/// Rotate the pixels so they display upright without any metadata.
///
/// Canvas is expanded for quarter turns (width and height swap), never
/// cropped. The result carries `Orientation::Normal`, so applying this twice
/// is the same as applying it once.
pub fn normalize_orientation(decoded: DecodedImage) -> DecodedImage {
    let DecodedImage {
        image,
        format,
        orientation,
    } = decoded;

    let image = match orientation {
        Orientation::Normal => image,
        Orientation::Rotate180 => image.rotate180(),
        Orientation::Rotate90Cw => image.rotate90(),
        Orientation::Rotate270Cw => image.rotate270(),
    };

    if orientation != Orientation::Normal {
        tracing::debug!(
            "Applied {} orientation correction, now {}x{}",
            orientation.as_str(),
            image.width(),
            image.height()
        );
    }

    DecodedImage {
        image,
        format,
        orientation: Orientation::Normal,
    }
}
