//! Web worker communication for off-main-thread stamp processing.
//!
//! [`StampWorker`] wraps a `web_sys::Worker` running the
//! `hanko-worker` WASM module. It posts one job — image bytes plus an
//! ink color — and receives a stream of progress messages followed by
//! exactly one terminal message.
//!
//! The worker is created from embedded JS + WASM blobs, so no extra
//! static files need to be served by the dev server.

use std::cell::RefCell;
use std::rc::Rc;

use hanko_pipeline::JobEvent;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Errors surfaced by the worker client.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The worker process itself errored (crashed, failed to load).
    #[error("worker error: {0}")]
    Worker(String),

    /// The worker sent a message outside the job protocol.
    #[error("unexpected worker message: {0}")]
    Protocol(String),

    /// The job ran and reported a failure.
    #[error("{0}")]
    Job(String),
}

/// A stamp worker that renders jobs in a dedicated web worker.
///
/// Create one at app startup and reuse it for all stamp runs, one job
/// at a time. Call [`cancel`](Self::cancel) to abort an in-progress
/// run — this kills the worker and spawns a fresh one, so no messages
/// from the old job can arrive afterwards.
pub struct StampWorker {
    /// The embedded JS glue for the worker (from `include_str!` in the
    /// app crate's build.rs).
    worker_js: &'static str,
    /// The embedded WASM binary for the worker (from `include_bytes!`
    /// in the app crate's build.rs).
    worker_wasm: &'static [u8],
    /// The current worker instance. Replaced on cancel.
    inner: RefCell<web_sys::Worker>,
}

impl StampWorker {
    /// Create a new stamp worker from embedded JS and WASM blobs.
    ///
    /// # Panics
    ///
    /// Panics if the worker cannot be created (e.g. in a non-browser
    /// environment).
    #[must_use]
    pub fn new(worker_js: &'static str, worker_wasm: &'static [u8]) -> Self {
        let worker = create_worker(worker_js, worker_wasm);
        Self {
            worker_js,
            worker_wasm,
            inner: RefCell::new(worker),
        }
    }

    /// Render one stamp job in the worker.
    ///
    /// Posts the job, invokes `on_progress` for every progress message,
    /// and resolves with the PNG bytes on `complete`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Job`] if the job reported a failure,
    /// [`WorkerError::Protocol`] if a message violates the job
    /// protocol, and [`WorkerError::Worker`] if the worker itself
    /// errors or is terminated mid-job.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    pub async fn run(
        &self,
        file: &[u8],
        color_hex: &str,
        on_progress: impl Fn(u8, &str) + 'static,
    ) -> Result<Vec<u8>, WorkerError> {
        // Create a JS message object: { file: Uint8Array, colorHex: string }
        let message = js_sys::Object::new();
        let file_array = js_sys::Uint8Array::from(file);
        js_sys::Reflect::set(&message, &JsValue::from_str("file"), &file_array)
            .map_err(|_| WorkerError::Protocol("failed to set file".into()))?;
        js_sys::Reflect::set(
            &message,
            &JsValue::from_str("colorHex"),
            &JsValue::from_str(color_hex),
        )
        .map_err(|_| WorkerError::Protocol("failed to set colorHex".into()))?;

        // Create a promise that resolves when the worker posts the
        // terminal message.
        let result = Rc::new(RefCell::new(None::<Result<Vec<u8>, WorkerError>>));
        let result_clone = Rc::clone(&result);

        let (promise, resolve, reject) = new_promise();

        // Progress messages keep arriving until the terminal one; the
        // handler stays installed for the whole run.
        let resolve_clone = resolve.clone();
        let onmessage = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
            move |event: web_sys::MessageEvent| match parse_event(&event.data()) {
                Ok(JobEvent::Progress { value, status }) => on_progress(value, &status),
                Ok(JobEvent::Complete { file }) => {
                    *result_clone.borrow_mut() = Some(Ok(file));
                    resolve_clone.call0(&JsValue::NULL).ok();
                }
                Ok(JobEvent::Error { message }) => {
                    *result_clone.borrow_mut() = Some(Err(WorkerError::Job(message)));
                    resolve_clone.call0(&JsValue::NULL).ok();
                }
                Err(e) => {
                    *result_clone.borrow_mut() = Some(Err(e));
                    resolve_clone.call0(&JsValue::NULL).ok();
                }
            },
        );

        // Set up error handler.
        let onerror =
            Closure::<dyn FnMut(web_sys::ErrorEvent)>::new(move |event: web_sys::ErrorEvent| {
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str(&event.message()));
            });

        {
            let worker = self.inner.borrow();
            worker.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
            worker.set_onerror(Some(onerror.as_ref().unchecked_ref()));

            // Post the job to the worker.
            worker
                .post_message(&message)
                .map_err(|_| WorkerError::Worker("failed to postMessage".into()))?;
        }

        // Prevent closures from being dropped while we await.
        // They will be cleaned up when the future completes.
        let _onmessage_guard = onmessage;
        let _onerror_guard = onerror;

        // Await the promise — this yields to the browser event loop.
        let await_result = wasm_bindgen_futures::JsFuture::from(promise).await;

        // Clean up the handlers.
        {
            let worker = self.inner.borrow();
            worker.set_onmessage(None);
            worker.set_onerror(None);
        }

        match await_result {
            Ok(_) => result
                .borrow_mut()
                .take()
                .unwrap_or(Err(WorkerError::Protocol(
                    "worker completed but no result captured".into(),
                ))),
            Err(e) => {
                let msg = e
                    .as_string()
                    .unwrap_or_else(|| "unknown worker error".into());
                Err(WorkerError::Worker(msg))
            }
        }
    }

    /// Cancel any in-progress stamp run by terminating the worker and
    /// creating a fresh one.
    ///
    /// This is instant and abrupt — the worker is killed immediately
    /// regardless of what stage the job is in; no partial result is
    /// flushed.
    pub fn cancel(&self) {
        self.inner.borrow().terminate();
        let new_worker = create_worker(self.worker_js, self.worker_wasm);
        *self.inner.borrow_mut() = new_worker;
    }
}

/// Parse an inbound worker message into a [`JobEvent`].
fn parse_event(data: &JsValue) -> Result<JobEvent, WorkerError> {
    let kind = js_sys::Reflect::get(data, &JsValue::from_str("type"))
        .ok()
        .and_then(|v| v.as_string())
        .ok_or_else(|| WorkerError::Protocol("message has no type field".into()))?;

    match kind.as_str() {
        "progress" => {
            let value = js_sys::Reflect::get(data, &JsValue::from_str("value"))
                .ok()
                .and_then(|v| v.as_f64())
                .ok_or_else(|| WorkerError::Protocol("progress message has no value".into()))?;
            let status = js_sys::Reflect::get(data, &JsValue::from_str("status"))
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = value.clamp(0.0, 100.0) as u8;
            Ok(JobEvent::Progress { value, status })
        }
        "complete" => {
            let file: js_sys::Uint8Array =
                js_sys::Reflect::get(data, &JsValue::from_str("file"))
                    .ok()
                    .and_then(|v| v.dyn_into().ok())
                    .ok_or_else(|| {
                        WorkerError::Protocol("complete message has no file buffer".into())
                    })?;
            Ok(JobEvent::Complete {
                file: file.to_vec(),
            })
        }
        "error" => {
            let message = js_sys::Reflect::get(data, &JsValue::from_str("message"))
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_else(|| "unknown job error".into());
            Ok(JobEvent::Error { message })
        }
        other => Err(WorkerError::Protocol(format!("unknown type {other:?}"))),
    }
}

/// Create a web worker from embedded JS glue and WASM binary.
///
/// 1. Creates a Blob URL for the WASM binary
/// 2. Wraps the JS glue in a self-initializing script that loads the
///    WASM from the Blob URL
/// 3. Creates a Blob URL for the wrapper script
/// 4. Creates a Worker from the wrapper Blob URL
fn create_worker(worker_js: &str, worker_wasm: &[u8]) -> web_sys::Worker {
    // Create a Blob URL for the WASM binary.
    let wasm_array = js_sys::Uint8Array::from(worker_wasm);
    let wasm_blob_parts = js_sys::Array::new();
    wasm_blob_parts.push(&wasm_array.buffer());
    let wasm_blob_opts = web_sys::BlobPropertyBag::new();
    wasm_blob_opts.set_type("application/wasm");
    let wasm_blob = web_sys::Blob::new_with_buffer_source_sequence_and_options(
        &wasm_blob_parts,
        &wasm_blob_opts,
    )
    .expect_throw("failed to create WASM Blob");
    let wasm_url = web_sys::Url::create_object_url_with_blob(&wasm_blob)
        .expect_throw("failed to create WASM Blob URL");

    // Create a wrapper script that:
    // 1. Defines the wasm_bindgen JS glue
    // 2. Calls wasm_bindgen(wasm_url) to initialize
    let wrapper_js = format!(
        r#"// Worker wrapper — loads embedded wasm_bindgen glue and WASM blob.
{worker_js}

// Initialize the WASM module from the embedded blob URL.
wasm_bindgen("{wasm_url}")
    .catch(function(e) {{ console.error("Worker WASM init failed:", e); }});
"#
    );

    // Create a Blob URL for the wrapper script.
    let js_blob_parts = js_sys::Array::new();
    js_blob_parts.push(&JsValue::from_str(&wrapper_js));
    let js_blob_opts = web_sys::BlobPropertyBag::new();
    js_blob_opts.set_type("application/javascript");
    let js_blob = web_sys::Blob::new_with_str_sequence_and_options(&js_blob_parts, &js_blob_opts)
        .expect_throw("failed to create JS Blob");
    let js_url = web_sys::Url::create_object_url_with_blob(&js_blob)
        .expect_throw("failed to create JS Blob URL");

    // Create the worker.
    let worker = web_sys::Worker::new(&js_url).expect_throw("failed to create Worker");

    // Clean up the Blob URLs (the worker has already fetched them).
    // Note: we revoke the JS URL but keep the WASM URL alive since
    // the worker's async init may still be fetching it. The WASM URL
    // will be leaked but is small (just a blob: reference).
    web_sys::Url::revoke_object_url(&js_url).ok();

    worker
}

/// Create a JS Promise along with its resolve and reject functions.
fn new_promise() -> (js_sys::Promise, js_sys::Function, js_sys::Function) {
    let resolve = Rc::new(RefCell::new(None::<js_sys::Function>));
    let reject = Rc::new(RefCell::new(None::<js_sys::Function>));
    let resolve_clone = Rc::clone(&resolve);
    let reject_clone = Rc::clone(&reject);

    let promise = js_sys::Promise::new(&mut move |res, rej| {
        *resolve_clone.borrow_mut() = Some(res);
        *reject_clone.borrow_mut() = Some(rej);
    });

    let resolve_fn = resolve
        .borrow_mut()
        .take()
        .expect_throw("resolve not captured");
    let reject_fn = reject
        .borrow_mut()
        .take()
        .expect_throw("reject not captured");

    (promise, resolve_fn, reject_fn)
}
