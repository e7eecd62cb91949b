//! Luminance-to-ink-density mapping.
//!
//! A stamped fingertip deposits ink where raised ridges touch the
//! paper. Ridges read *lighter* in a photograph, so higher luminance
//! maps to higher ink density: the mapping windows luminance onto
//! `[DENSITY_FLOOR, DENSITY_FLOOR + DENSITY_WINDOW]`, normalizes to
//! `[0, 1]`, then sharpens the transition with a smoothstep curve.
//!
//! The constants here define the stamp's look and are part of the
//! output contract, not tunables.

/// Standard luma weight for the red channel.
pub const LUMA_RED: f64 = 0.299;
/// Standard luma weight for the green channel.
pub const LUMA_GREEN: f64 = 0.587;
/// Standard luma weight for the blue channel.
pub const LUMA_BLUE: f64 = 0.114;

/// Luminance below which no ink is deposited.
pub const DENSITY_FLOOR: f64 = 80.0;
/// Width of the luminance window mapped onto density 0..1.
///
/// Luminance at or above `DENSITY_FLOOR + DENSITY_WINDOW` (180)
/// saturates at full density.
pub const DENSITY_WINDOW: f64 = 100.0;

/// Weighted luminance of an RGB pixel: `0.299r + 0.587g + 0.114b`.
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    LUMA_RED.mul_add(
        f64::from(r),
        LUMA_GREEN.mul_add(f64::from(g), LUMA_BLUE * f64::from(b)),
    )
}

/// Raw ink density for a luminance value: `(gray - 80) / 100`, clamped
/// to `[0, 1]`.
#[must_use]
pub fn ink_density(gray: f64) -> f64 {
    ((gray - DENSITY_FLOOR) / DENSITY_WINDOW).clamp(0.0, 1.0)
}

/// Cubic Hermite smoothstep: `d² × (3 − 2d)`.
///
/// Sharpens the density ramp between the saturation ends instead of
/// crossing it linearly. Input must already be in `[0, 1]`.
#[must_use]
pub fn smoothstep(d: f64) -> f64 {
    d * d * 2.0f64.mul_add(-d, 3.0)
}
