//! The ink pass: turn an alpha-matted subject into a stamp rendering.
//!
//! Operates in place on an RGBA buffer. Each visited pixel's luminance
//! is mapped to an ink density ([`crate::density`]), perturbed by grit
//! noise ([`crate::grit`]), and written back as the requested ink color
//! at the computed alpha. Pixels the background removal already drove
//! near-transparent are skipped entirely.

use image::DynamicImage;

use crate::types::{InkColor, RgbaImage};
use crate::{density, downsample, grit};

/// Pixels with original alpha below this are skipped — never visited,
/// left byte-for-byte untouched.
pub const ALPHA_VISIT_THRESHOLD: u8 = 10;

/// Computed alphas below this collapse to fully transparent; faint
/// speckles read as dirt rather than ink.
pub const ALPHA_KEEP_THRESHOLD: u8 = 20;

/// Render an alpha-matted subject as a stamp in the given ink color.
///
/// Downscales to the working resolution ([`downsample::MAX_DIMENSION`])
/// and runs the ink pass over the resulting buffer.
#[must_use]
pub fn render(matted: &DynamicImage, ink: InkColor) -> RgbaImage {
    let (scaled, _) = downsample::downsample(matted, downsample::MAX_DIMENSION);
    let mut buffer = scaled.to_rgba8();
    apply_ink(&mut buffer, ink);
    buffer
}

/// Apply the ink transform to every sufficiently opaque pixel, in place.
///
/// All intermediate math is `f64`; only the final alpha is rounded to a
/// byte. The computed alpha can exceed 255 before rounding (noise
/// factor up to 1.2 on a fully opaque pixel) and saturates at 255.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn apply_ink(buffer: &mut RgbaImage, ink: InkColor) {
    for (x, y, pixel) in buffer.enumerate_pixels_mut() {
        let [r, g, b, alpha] = pixel.0;
        if alpha < ALPHA_VISIT_THRESHOLD {
            continue;
        }

        let gray = density::luminance(r, g, b);
        let shaped = density::smoothstep(density::ink_density(gray));
        let noise = grit::noise_factor(x, y);
        let final_alpha = (shaped * f64::from(alpha) * noise).round().min(255.0) as u8;

        if final_alpha < ALPHA_KEEP_THRESHOLD {
            pixel.0[3] = 0;
        } else {
            pixel.0 = [ink.r, ink.g, ink.b, final_alpha];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: InkColor = InkColor::new(42, 42, 42);

    fn single_pixel(r: u8, g: u8, b: u8, a: u8) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, image::Rgba([r, g, b, a]))
    }

    #[test]
    fn nearly_transparent_pixel_is_left_untouched() {
        // Alpha 5 sits below the visit threshold: the pixel keeps its
        // original channels, including the alpha — it is skipped, not
        // cleared.
        let mut buffer = single_pixel(200, 150, 100, 5);
        apply_ink(&mut buffer, INK);
        assert_eq!(buffer.get_pixel(0, 0).0, [200, 150, 100, 5]);
    }

    #[test]
    fn dark_pixel_becomes_transparent() {
        // Luminance 50 is below the density floor: zero ink regardless
        // of noise, so the pixel collapses to alpha 0. RGB is left
        // alone — only the alpha matters once invisible.
        let mut buffer = single_pixel(50, 50, 50, 255);
        apply_ink(&mut buffer, INK);
        assert_eq!(buffer.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn bright_pixel_gets_full_density_ink() {
        // Luminance 255 saturates density at 1.0; the final alpha is
        // original_alpha × noise, capped at 255.
        let mut buffer = single_pixel(255, 255, 255, 255);
        apply_ink(&mut buffer, INK);
        let [r, g, b, a] = buffer.get_pixel(0, 0).0;
        assert_eq!([r, g, b], [42, 42, 42]);
        let noise = grit::noise_factor(0, 0);
        let expected = (255.0 * noise).round().min(255.0);
        assert!((f64::from(a) - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn final_alpha_never_exceeds_a_fifth_over_original() {
        // original_alpha × 1.2 is the ceiling the noise factor allows.
        let mut buffer = RgbaImage::from_fn(32, 32, |_, _| image::Rgba([255, 255, 255, 200]));
        apply_ink(&mut buffer, INK);
        for pixel in buffer.pixels() {
            assert!(f64::from(pixel.0[3]) <= (200.0_f64 * 1.2).round());
        }
    }

    #[test]
    fn mid_gray_renders_ink_at_half_density() {
        // Luminance 130 → raw density 0.5 → smoothstep 0.5, so the
        // alpha lands in 0.5 × 255 × [0.8, 1.2) ≈ [102, 153].
        let mut buffer = RgbaImage::from_fn(16, 16, |_, _| image::Rgba([130, 130, 130, 255]));
        apply_ink(&mut buffer, INK);
        for pixel in buffer.pixels() {
            let [r, g, b, a] = pixel.0;
            assert_eq!([r, g, b], [42, 42, 42]);
            assert!((102..=153).contains(&a), "alpha {a} outside half-density band");
        }
    }

    #[test]
    fn ink_pass_is_deterministic() {
        let make = || {
            let mut buffer =
                RgbaImage::from_fn(24, 24, |x, y| {
                    let v = ((x * 37 + y * 101) % 256) as u8;
                    image::Rgba([v, v, v, 255])
                });
            apply_ink(&mut buffer, INK);
            buffer
        };
        assert_eq!(make().as_raw(), make().as_raw());
    }

    #[test]
    fn render_downscales_oversized_input() {
        let matted = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2048,
            1024,
            image::Rgba([130, 130, 130, 255]),
        ));
        let rendered = render(&matted, INK);
        assert_eq!(rendered.width(), 1024);
        assert_eq!(rendered.height(), 512);
    }

    #[test]
    fn render_keeps_small_input_dimensions() {
        let matted = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            100,
            100,
            image::Rgba([130, 130, 130, 255]),
        ));
        let rendered = render(&matted, INK);
        assert_eq!(rendered.width(), 100);
        assert_eq!(rendered.height(), 100);
    }
}
