//! Shared types for the hanko stamp pipeline.

use serde::{Deserialize, Serialize};

use crate::segmentation::SegmentationError;

/// Re-export `RgbaImage` so downstream crates can reference the
/// working pixel buffer without depending on `image` directly.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// The ink color a stamp is rendered in.
///
/// A fixed RGB triple, constant for the whole job. Pixels never blend
/// toward it; the stamp look comes entirely from the computed alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InkColor {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
}

impl InkColor {
    /// Create an ink color from raw channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` hex string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`StampError::InvalidColor`] if the string is not a
    /// six-digit hex color with a leading `#`.
    pub fn parse(hex: &str) -> Result<Self, StampError> {
        let digits = hex
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| StampError::InvalidColor(hex.to_string()))?;

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| StampError::InvalidColor(hex.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl std::fmt::Display for InkColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One stamp job as received from the caller.
///
/// Owned exclusively by the worker for the duration of the job; a
/// worker processes at most one job at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInput {
    /// Raw source image bytes (PNG, JPEG, BMP, WebP).
    pub file: Vec<u8>,
    /// Requested ink color as a `#RRGGBB` string, parsed at intake.
    pub color_hex: String,
}

/// Errors that can occur while processing a stamp job.
///
/// Every variant's `Display` string is what reaches the caller inside
/// the terminal error event.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The requested ink color did not parse as `#RRGGBB`.
    #[error("invalid ink color {0:?}: expected #RRGGBB")]
    InvalidColor(String),

    /// Failed to decode an image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The background removal stage failed.
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    /// Failed to encode the rendered stamp as PNG.
    #[error("failed to encode stamp: {0}")]
    PngEncode(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercase_hex() {
        let ink = InkColor::parse("#2a2a2a").unwrap();
        assert_eq!(ink, InkColor::new(42, 42, 42));
    }

    #[test]
    fn parse_uppercase_hex() {
        let ink = InkColor::parse("#FF007F").unwrap();
        assert_eq!(ink, InkColor::new(255, 0, 127));
    }

    #[test]
    fn parse_rejects_missing_hash() {
        assert!(matches!(
            InkColor::parse("2A2A2A"),
            Err(StampError::InvalidColor(_)),
        ));
    }

    #[test]
    fn parse_rejects_short_string() {
        assert!(matches!(
            InkColor::parse("#FFF"),
            Err(StampError::InvalidColor(_)),
        ));
    }

    #[test]
    fn parse_rejects_non_hex_digits() {
        assert!(matches!(
            InkColor::parse("#GG0011"),
            Err(StampError::InvalidColor(_)),
        ));
    }

    #[test]
    fn display_round_trips() {
        let ink = InkColor::new(42, 42, 42);
        assert_eq!(ink.to_string(), "#2A2A2A");
        assert_eq!(InkColor::parse(&ink.to_string()).unwrap(), ink);
    }

    #[test]
    fn ink_color_serde_round_trip() {
        let ink = InkColor::new(10, 20, 30);
        let json = serde_json::to_string(&ink).unwrap();
        let deserialized: InkColor = serde_json::from_str(&json).unwrap();
        assert_eq!(ink, deserialized);
    }

    #[test]
    fn error_empty_input_display() {
        assert_eq!(
            StampError::EmptyInput.to_string(),
            "input image data is empty",
        );
    }

    #[test]
    fn error_invalid_color_display_names_the_input() {
        let err = StampError::InvalidColor("oops".to_string());
        assert!(err.to_string().contains("oops"));
        assert!(err.to_string().contains("#RRGGBB"));
    }
}
