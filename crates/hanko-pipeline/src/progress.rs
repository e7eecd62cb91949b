//! Job events and the progress reporter.
//!
//! Every message a job sends to its caller flows through one
//! [`Reporter`], which enforces the two lifecycle invariants:
//!
//! - percent never regresses within a job (late or out-of-band updates
//!   are clamped up to the high-water mark), and
//! - exactly one terminal event is emitted, with nothing after it.

use serde::{Deserialize, Serialize};

/// One message from a running job to its caller.
///
/// Serializes to the wire shape (`type` tag plus payload fields); the
/// worker maps `Complete` pixels to a raw byte buffer instead of JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JobEvent {
    /// Intermediate progress update.
    Progress {
        /// Overall completion, 0-100. Non-decreasing within a job.
        value: u8,
        /// Human-readable description of the current stage.
        status: String,
    },
    /// Terminal success: the PNG-encoded stamp.
    Complete {
        /// PNG bytes of the rendered stamp.
        file: Vec<u8>,
    },
    /// Terminal failure.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl JobEvent {
    /// Whether this event ends the job.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

/// Receiver of job events.
///
/// Implementations deliver events to the caller — a `postMessage` in
/// the worker, a plain `Vec` in tests.
pub trait ProgressSink {
    /// Deliver one event. Called in emission order; the last call for
    /// any job carries a terminal event.
    fn emit(&mut self, event: JobEvent);
}

/// The single emission channel for one job.
///
/// Owns the sink for the job's duration. Progress percent is clamped
/// to the running high-water mark, and once a terminal event has been
/// emitted every further call is ignored.
pub struct Reporter<S> {
    sink: S,
    high_water: u8,
    terminated: bool,
}

impl<S: ProgressSink> Reporter<S> {
    /// Wrap a sink for a fresh job.
    pub const fn new(sink: S) -> Self {
        Self {
            sink,
            high_water: 0,
            terminated: false,
        }
    }

    /// Emit a progress update. Values above 100 are capped; values
    /// below the high-water mark are raised to it so the caller never
    /// observes a regression.
    pub fn progress(&mut self, percent: u8, status: &str) {
        if self.terminated {
            return;
        }
        // high_water is itself capped at 100, so the bounds are ordered.
        let clamped = percent.clamp(self.high_water, 100);
        self.high_water = clamped;
        self.sink.emit(JobEvent::Progress {
            value: clamped,
            status: status.to_string(),
        });
    }

    /// Emit the successful terminal event. No-op if the job already
    /// terminated.
    pub fn complete(&mut self, file: Vec<u8>) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.sink.emit(JobEvent::Complete { file });
    }

    /// Emit the failure terminal event. No-op if the job already
    /// terminated.
    pub fn error(&mut self, message: String) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.sink.emit(JobEvent::Error { message });
    }

    /// Highest percent emitted so far.
    #[must_use]
    pub const fn high_water(&self) -> u8 {
        self.high_water
    }
}
