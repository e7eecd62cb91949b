//! `postMessage` delivery of job events to the main thread.

use hanko_pipeline::{JobEvent, ProgressSink};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Sink that posts each job event to the worker's owner.
///
/// Event fields map one-to-one onto the outbound message objects; the
/// result PNG crosses the boundary as a raw `Uint8Array`.
pub struct PostMessageSink;

impl ProgressSink for PostMessageSink {
    fn emit(&mut self, event: JobEvent) {
        let message = js_sys::Object::new();
        let set = |key: &str, val: &JsValue| {
            // Setting a field on a fresh object cannot fail; ignore the
            // Result rather than risk throwing mid-job.
            let _ = js_sys::Reflect::set(&message, &JsValue::from_str(key), val);
        };

        match event {
            JobEvent::Progress { value, status } => {
                set("type", &JsValue::from_str("progress"));
                set("value", &JsValue::from_f64(f64::from(value)));
                set("status", &JsValue::from_str(&status));
            }
            JobEvent::Complete { file } => {
                set("type", &JsValue::from_str("complete"));
                set("file", &js_sys::Uint8Array::from(file.as_slice()));
            }
            JobEvent::Error { message: text } => {
                set("type", &JsValue::from_str("error"));
                set("message", &JsValue::from_str(&text));
            }
        }

        if let Ok(global) = js_sys::global().dyn_into::<web_sys::DedicatedWorkerGlobalScope>() {
            let _ = global.post_message(&message);
        }
    }
}
