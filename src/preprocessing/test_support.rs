//! Fixture builders for preprocessing tests: encoded images and hand-built EXIF blocks

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// RGB image where neighbouring pixels differ, so rotations are observable
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 7 % 256) as u8,
            (y * 13 % 256) as u8,
            ((x + 3 * y) * 5 % 256) as u8,
        ])
    })
}

pub fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn jpeg_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .encode_image(img)
        .unwrap();
    buf
}

/// Little-endian TIFF block with a single IFD0 entry: Orientation (SHORT)
pub fn exif_orientation_block(tag: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&tag.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff
}

/// Insert an APP1 EXIF segment right after the JPEG SOI marker
pub fn jpeg_with_orientation(jpeg: &[u8], tag: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

    let tiff = exif_orientation_block(tag);
    let segment_len = (2 + 6 + tiff.len()) as u16;

    let mut out = Vec::with_capacity(jpeg.len() + segment_len as usize + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Insert an `eXIf` chunk right after the PNG IHDR chunk
pub fn png_with_orientation(png: &[u8], tag: u16) -> Vec<u8> {
    // 8-byte signature + IHDR (4 len + 4 type + 13 data + 4 crc)
    const IHDR_END: usize = 33;
    assert_eq!(&png[12..16], b"IHDR");

    let tiff = exif_orientation_block(tag);
    let mut chunk_body = Vec::with_capacity(4 + tiff.len());
    chunk_body.extend_from_slice(b"eXIf");
    chunk_body.extend_from_slice(&tiff);

    let mut out = Vec::with_capacity(png.len() + chunk_body.len() + 8);
    out.extend_from_slice(&png[..IHDR_END]);
    out.extend_from_slice(&(tiff.len() as u32).to_be_bytes());
    out.extend_from_slice(&chunk_body);
    out.extend_from_slice(&crc32fast::hash(&chunk_body).to_be_bytes());
    out.extend_from_slice(&png[IHDR_END..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_with_orientation_chunk_is_well_formed() {
        let png = png_with_orientation(&png_bytes(&gradient(4, 4)), 6);
        let len = u32::from_be_bytes([png[33], png[34], png[35], png[36]]) as usize;
        assert_eq!(&png[37..41], b"eXIf");

        let crc_at = 37 + 4 + len;
        let stored = u32::from_be_bytes([
            png[crc_at],
            png[crc_at + 1],
            png[crc_at + 2],
            png[crc_at + 3],
        ]);
        assert_eq!(stored, crc32fast::hash(&png[37..crc_at]));

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
    }
}
