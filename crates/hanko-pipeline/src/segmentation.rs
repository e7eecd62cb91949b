//! The background removal boundary.
//!
//! Segmentation is an external capability: something that takes raw
//! image bytes and hands back the same picture with every non-subject
//! pixel driven toward alpha 0, preserving soft edges. The pipeline
//! only defines the contract; the worker crate supplies the real
//! implementation and tests substitute [`IdentityRemover`].
//!
//! A failure here aborts the whole job — there is no "un-removed"
//! fallback and no retry.

use std::rc::Rc;

use image::DynamicImage;

/// Sub-progress callback: `(current, total)` work units completed by
/// the capability. Shared via `Rc` — jobs are single-threaded, and the
/// browser implementation hands the callback to a JS closure that must
/// own it.
pub type ProgressFn = Rc<dyn Fn(u64, u64)>;

/// Errors surfaced by a background removal capability.
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    /// The capability is not present in this environment.
    #[error("background removal is unavailable: {0}")]
    Unavailable(String),

    /// Fetching the segmentation model asset failed.
    #[error("failed to fetch segmentation model: {0}")]
    ModelFetch(String),

    /// The model ran but inference failed or rejected the image.
    #[error("background removal failed: {0}")]
    Inference(String),

    /// The capability returned bytes that do not decode as an image.
    #[error("failed to decode background removal output: {0}")]
    Decode(String),
}

/// An injectable background removal strategy.
///
/// Takes the raw source image bytes and returns the decoded
/// alpha-matted subject. Implementations report sub-progress through
/// `progress` as `(current, total)` pairs; the caller rescales those
/// into its overall progress band.
pub trait BackgroundRemover {
    /// Remove the background from `image`.
    ///
    /// # Errors
    ///
    /// Returns a [`SegmentationError`] if the capability is missing,
    /// the model cannot be fetched, inference fails, or the output
    /// does not decode.
    fn remove(
        &self,
        image: &[u8],
        progress: ProgressFn,
    ) -> impl Future<Output = Result<DynamicImage, SegmentationError>>;
}

/// A removal strategy that removes nothing: decodes the input and
/// returns it unchanged, existing alpha preserved.
///
/// Lets the stamp renderer run without any model — native builds and
/// tests use it, and it doubles as the path for pre-matted input.
pub struct IdentityRemover;

impl BackgroundRemover for IdentityRemover {
    async fn remove(
        &self,
        image: &[u8],
        progress: ProgressFn,
    ) -> Result<DynamicImage, SegmentationError> {
        let decoded = image::load_from_memory(image)
            .map_err(|e| SegmentationError::Decode(e.to_string()))?;
        progress(1, 1);
        Ok(decoded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([9, 8, 7, 200]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn identity_remover_returns_input_unchanged() {
        let png = tiny_png();
        let result =
            pollster::block_on(IdentityRemover.remove(&png, Rc::new(|_, _| {}))).unwrap();
        let rgba = result.to_rgba8();
        assert_eq!(rgba.dimensions(), (3, 2));
        assert_eq!(rgba.get_pixel(0, 0).0, [9, 8, 7, 200]);
    }

    #[test]
    fn identity_remover_reports_completion() {
        let seen = Rc::new(Cell::new((0_u64, 0_u64)));
        let progress: ProgressFn = {
            let seen = Rc::clone(&seen);
            Rc::new(move |current, total| seen.set((current, total)))
        };
        pollster::block_on(IdentityRemover.remove(&tiny_png(), progress)).unwrap();
        assert_eq!(seen.get(), (1, 1));
    }

    #[test]
    fn identity_remover_rejects_garbage() {
        let result = pollster::block_on(IdentityRemover.remove(&[0xFF, 0x00], Rc::new(|_, _| {})));
        assert!(matches!(result, Err(SegmentationError::Decode(_))));
    }
}
