//! Diagnostic connectivity probe for the segmentation model host.
//!
//! Runs once before the job starts and only logs the outcome. A failed
//! probe is a diagnostic signal for the console, never a job error —
//! the real model fetch happens inside the capability and reports its
//! own failure through the job's error path.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Probe the model asset host and log the result.
pub async fn probe_model_assets(base_url: &str) {
    let Ok(global) = js_sys::global().dyn_into::<web_sys::WorkerGlobalScope>() else {
        return;
    };

    match JsFuture::from(global.fetch_with_str(base_url)).await {
        Ok(response) => {
            let status = response
                .dyn_ref::<web_sys::Response>()
                .map_or(0, web_sys::Response::status);
            web_sys::console::log_1(&JsValue::from_str(&format!(
                "model asset host reachable: {base_url} (status {status})"
            )));
        }
        Err(e) => {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "model asset host probe failed: {base_url} ({e:?})"
            )));
        }
    }
}
