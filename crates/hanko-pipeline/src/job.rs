//! Per-job orchestration: intake, background removal, ink pass,
//! encoding, and the single terminal event.
//!
//! [`run`] is the one entry point a transport calls per job. Every
//! failure from any stage funnels into one `Error` event; nothing is
//! emitted after the terminal event (enforced by
//! [`Reporter`](crate::progress::Reporter)).
//!
//! # Progress bands
//!
//! Background removal owns 0-60% of the overall bar, rescaled linearly
//! from the capability's `(current, total)` sub-progress. The stamp
//! stage reports coarse checkpoints: 60% entering the raster pass, 90%
//! after the pixel loop, 100% after encoding. The pixel loop itself is
//! synchronous and never yields mid-way.

use std::cell::RefCell;
use std::rc::Rc;

use crate::progress::{ProgressSink, Reporter};
use crate::segmentation::{BackgroundRemover, ProgressFn};
use crate::types::{InkColor, JobInput, StampError};
use crate::{encode, stamp};

/// Share of the overall bar owned by background removal.
pub const REMOVAL_BAND_END: u8 = 60;
/// Checkpoint after the ink pass, before encoding.
pub const INK_DONE_PERCENT: u8 = 90;

const STATUS_REMOVING: &str = "removing background";
const STATUS_INKING: &str = "rendering stamp";
const STATUS_ENCODING: &str = "encoding result";

/// Process one stamp job, emitting progress and exactly one terminal
/// event through `sink`.
///
/// Never returns an error: failures become the terminal `Error` event.
pub async fn run<R, S>(input: JobInput, remover: &R, sink: S)
where
    R: BackgroundRemover,
    S: ProgressSink + 'static,
{
    let reporter = Rc::new(RefCell::new(Reporter::new(sink)));
    let outcome = execute(&input, remover, &reporter).await;
    let mut reporter = reporter.borrow_mut();
    match outcome {
        Ok(png) => reporter.complete(png),
        Err(e) => reporter.error(e.to_string()),
    }
}

/// The fallible pipeline body. Kept separate so `?` propagation stays
/// idiomatic while [`run`] owns the error funnel.
async fn execute<R, S>(
    input: &JobInput,
    remover: &R,
    reporter: &Rc<RefCell<Reporter<S>>>,
) -> Result<Vec<u8>, StampError>
where
    R: BackgroundRemover,
    S: ProgressSink + 'static,
{
    if input.file.is_empty() {
        return Err(StampError::EmptyInput);
    }
    let ink = InkColor::parse(&input.color_hex)?;

    reporter.borrow_mut().progress(0, STATUS_REMOVING);
    let on_removal: ProgressFn = {
        let reporter = Rc::clone(reporter);
        Rc::new(move |current, total| {
            reporter
                .borrow_mut()
                .progress(removal_percent(current, total), STATUS_REMOVING);
        })
    };
    let matted = remover.remove(&input.file, on_removal).await?;

    reporter
        .borrow_mut()
        .progress(REMOVAL_BAND_END, STATUS_INKING);
    let rendered = stamp::render(&matted, ink);

    reporter
        .borrow_mut()
        .progress(INK_DONE_PERCENT, STATUS_ENCODING);
    let png = encode::encode_png(&rendered)?;

    reporter.borrow_mut().progress(100, STATUS_ENCODING);
    Ok(png)
}

/// Rescale capability sub-progress `(current, total)` into the removal
/// band. A zero or unreported total maps to the band's start.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn removal_percent(current: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let fraction = (current as f64 / total as f64).clamp(0.0, 1.0);
    (fraction * f64::from(REMOVAL_BAND_END)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_percent_spans_the_band() {
        assert_eq!(removal_percent(0, 10), 0);
        assert_eq!(removal_percent(5, 10), 30);
        assert_eq!(removal_percent(10, 10), 60);
    }

    #[test]
    fn removal_percent_handles_degenerate_totals() {
        assert_eq!(removal_percent(3, 0), 0);
        // current beyond total saturates at the band end.
        assert_eq!(removal_percent(20, 10), 60);
    }
}
