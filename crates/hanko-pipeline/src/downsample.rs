//! Downscaling to the stamp working resolution.
//!
//! The pixel loop runs over every pixel, so the alpha-matted subject is
//! capped at [`MAX_DIMENSION`] on its longer axis before rendering.
//! Aspect ratio is preserved; target dimensions round to the nearest
//! integer. Images already within the cap pass through unchanged.

use image::DynamicImage;

/// Largest allowed dimension of the stamp pixel buffer.
pub const MAX_DIMENSION: u32 = 1024;

/// Downscale `image` so its longer axis is at most `max_dimension`
/// pixels, preserving aspect ratio.
///
/// Returns the (possibly unchanged) image and whether scaling was
/// actually applied.
#[must_use]
pub fn downsample(image: &DynamicImage, max_dimension: u32) -> (DynamicImage, bool) {
    let long_axis = image.width().max(image.height());
    if long_axis <= max_dimension {
        return (image.clone(), false);
    }

    let resized = image.resize(
        max_dimension,
        max_dimension,
        image::imageops::FilterType::Triangle,
    );
    (resized, true)
}
