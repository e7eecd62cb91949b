//! hanko-pipeline: Pure stamp-rendering pipeline (sans-IO).
//!
//! Turns a photo into a procedural ink-stamp rendering through:
//! background removal (injected capability) -> downscale ->
//! luminance-to-density mapping -> grit noise -> ink compositing ->
//! PNG encoding, streaming progress events along the way.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and emits events through a caller-supplied sink. All
//! browser interaction lives in `hanko-worker` and `hanko-io`.

pub mod density;
pub mod downsample;
pub mod encode;
pub mod grit;
pub mod job;
pub mod progress;
pub mod segmentation;
pub mod stamp;
pub mod types;

pub use progress::{JobEvent, ProgressSink, Reporter};
pub use segmentation::{BackgroundRemover, IdentityRemover, ProgressFn, SegmentationError};
pub use types::{Dimensions, InkColor, JobInput, RgbaImage, StampError};
