//! Deterministic per-pixel grit noise.
//!
//! Simulates paper and ink texture by perturbing each pixel's ink
//! density with a value derived purely from its coordinates — the
//! classic GLSL sine-hash. Determinism matters: the same image must
//! render the same stamp every time, which also keeps golden-image
//! tests stable. This is a hash, not an RNG.

/// X coordinate weight of the sine hash.
const GRIT_X: f64 = 12.9898;
/// Y coordinate weight of the sine hash.
const GRIT_Y: f64 = 78.233;
/// Post-sine scale that spreads the fractional part across `[0, 1)`.
const GRIT_SCALE: f64 = 43758.545_312_3;

/// Lower bound of the noise factor.
pub const NOISE_BASE: f64 = 0.8;
/// Span of the noise factor above [`NOISE_BASE`].
pub const NOISE_SPAN: f64 = 0.4;

/// Hash pixel coordinates to a grit value in `[0, 1)`:
/// `frac(sin(x·12.9898 + y·78.233) × 43758.5453123)`.
#[must_use]
pub fn grit(x: u32, y: u32) -> f64 {
    let v = f64::from(x)
        .mul_add(GRIT_X, f64::from(y) * GRIT_Y)
        .sin()
        * GRIT_SCALE;
    v - v.floor()
}

/// Noise factor applied to a pixel's ink density: `0.8 + grit × 0.4`,
/// range `[0.8, 1.2)`.
#[must_use]
pub fn noise_factor(x: u32, y: u32) -> f64 {
    grit(x, y).mul_add(NOISE_SPAN, NOISE_BASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grit_is_deterministic() {
        for (x, y) in [(0, 0), (1, 0), (0, 1), (17, 31), (1023, 767)] {
            assert!(
                (grit(x, y) - grit(x, y)).abs() < f64::EPSILON,
                "grit({x}, {y}) is not stable",
            );
        }
    }

    #[test]
    fn grit_stays_in_unit_range() {
        for y in 0..64 {
            for x in 0..64 {
                let g = grit(x, y);
                assert!((0.0..1.0).contains(&g), "grit({x}, {y}) = {g}");
            }
        }
    }

    #[test]
    fn grit_varies_between_neighbors() {
        // The hash should not be constant across a scanline.
        let row: Vec<f64> = (0..16).map(|x| grit(x, 0)).collect();
        let min = row.iter().copied().fold(f64::INFINITY, f64::min);
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.1, "grit is nearly constant: {row:?}");
    }

    #[test]
    fn noise_factor_range() {
        for y in 0..32 {
            for x in 0..32 {
                let n = noise_factor(x, y);
                assert!((NOISE_BASE..NOISE_BASE + NOISE_SPAN).contains(&n));
            }
        }
    }
}
