//! hanko-io: Browser-side client for the stamp worker.
//!
//! Spawns the `hanko-worker` WASM module in a dedicated `Worker`,
//! submits one job at a time, surfaces progress through a callback,
//! and resolves on the terminal event. Also provides Blob-URL helpers
//! for displaying the resulting PNG.

pub mod raster;
pub mod worker;

pub use worker::{StampWorker, WorkerError};
