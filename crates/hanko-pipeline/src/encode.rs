//! Lossless PNG encoding of the rendered stamp.
//!
//! The stamp's alpha channel carries the whole rendering, so the result
//! must survive encoding bit-for-bit — PNG, never a lossy codec.

use image::ImageEncoder;

use crate::types::{RgbaImage, StampError};

/// Encode an RGBA buffer as PNG bytes.
///
/// # Errors
///
/// Returns [`StampError::PngEncode`] if the encoder fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, StampError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| StampError::PngEncode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encoded_png_decodes_back_identically() {
        let image = RgbaImage::from_fn(7, 5, |x, y| {
            image::Rgba([x as u8, y as u8, 128, (x * y) as u8])
        });
        let png = encode_png(&image).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), image.as_raw());
    }

    #[test]
    fn output_starts_with_png_signature() {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 0]));
        let png = encode_png(&image).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
