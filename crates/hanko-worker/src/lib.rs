//! Web worker entry point for hanko stamp processing.
//!
//! This crate compiles to a standalone WASM module that runs inside a
//! `Worker`. It receives one job per message — raw image bytes and an
//! ink color — runs the stamp pipeline, and streams progress back via
//! `postMessage`, ending with exactly one terminal message.
//!
//! The result PNG is sent as a raw `Uint8Array` buffer to avoid the
//! massive overhead of JSON-encoding megabytes of pixel data as number
//! arrays; progress and error payloads are small scalar fields.
//!
//! Running the pipeline in a worker keeps the browser's main thread
//! free for UI updates, animations, and user interaction. Terminating
//! the worker is the only way to cancel a running job.

use hanko_pipeline::JobInput;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

mod preflight;
mod remover;
mod sink;

/// Base URL the segmentation capability fetches its model assets from.
const MODEL_ASSET_BASE_URL: &str = "https://static.hanko.app/models/segmentation/";

/// Message protocol: the main thread sends a JS object with:
/// - `file`: `Uint8Array` containing the raw image file bytes
/// - `colorHex`: `String` ink color, `#RRGGBB`
///
/// The worker responds with zero or more progress messages
/// `{ type: "progress", value, status }` followed by exactly one of
/// `{ type: "complete", file: Uint8Array }` or
/// `{ type: "error", message }`.
///
/// # Worker entry point
///
/// Called automatically when the WASM module is instantiated in the
/// worker context.
#[wasm_bindgen(start)]
pub fn worker_main() {
    console_error_panic_hook::set_once();

    // Get the worker global scope.
    let global: web_sys::DedicatedWorkerGlobalScope = js_sys::global()
        .dyn_into()
        .expect_throw("not running in a DedicatedWorkerGlobalScope");

    // Set up the message handler.
    let onmessage =
        Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |event: web_sys::MessageEvent| {
            handle_message(event);
        });
    global.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget(); // leak — lives for the worker lifetime
}

/// Handle the job message from the main thread.
///
/// Extracts the image bytes and ink color, then hands the job to the
/// pipeline. Every outcome — including malformed colors and
/// undecodable images — flows back through the event sink; only a
/// message that violates the transport shape itself throws.
#[allow(clippy::expect_used, clippy::needless_pass_by_value)]
fn handle_message(event: web_sys::MessageEvent) {
    let data = event.data();

    // Extract fields from the message object.
    let file_val =
        js_sys::Reflect::get(&data, &JsValue::from_str("file")).expect_throw("missing file field");
    let color_val = js_sys::Reflect::get(&data, &JsValue::from_str("colorHex"))
        .expect_throw("missing colorHex field");

    // Convert JS types to Rust types.
    let file_js: js_sys::Uint8Array = file_val
        .dyn_into()
        .expect_throw("file is not a Uint8Array");
    let file = file_js.to_vec();

    let color_hex = color_val
        .as_string()
        .expect_throw("colorHex is not a string");

    let input = JobInput { file, color_hex };

    // Fire-and-forget reachability probe. Diagnostic only: the job
    // below starts without waiting for it.
    wasm_bindgen_futures::spawn_local(preflight::probe_model_assets(MODEL_ASSET_BASE_URL));

    // One job per worker message. The future runs on this worker's
    // single thread; the pixel loop inside blocks it, which is the
    // point — the main thread stays free.
    wasm_bindgen_futures::spawn_local(async move {
        let remover = remover::JsBackgroundRemover::new(MODEL_ASSET_BASE_URL);
        hanko_pipeline::job::run(input, &remover, sink::PostMessageSink).await;
    });
}
