//! JS-bridged background removal.
//!
//! The worker wrapper script exposes the segmentation capability as a
//! global `removeBackground(bytes, config)` function returning a
//! promise of the alpha-matted image bytes, where `config` carries
//! `publicPath` (the model asset base URL) and a
//! `progress(key, current, total)` callback. This adapter wires that
//! surface to the pipeline's [`BackgroundRemover`] contract.

use hanko_pipeline::segmentation::{BackgroundRemover, ProgressFn, SegmentationError};
use image::DynamicImage;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Background removal backed by the worker-scope JS capability.
pub struct JsBackgroundRemover {
    model_base_url: String,
}

impl JsBackgroundRemover {
    /// Create a remover that points the capability at `model_base_url`
    /// for its model asset fetches.
    pub fn new(model_base_url: &str) -> Self {
        Self {
            model_base_url: model_base_url.to_string(),
        }
    }

    /// Look up the `removeBackground` function on the worker global.
    fn capability() -> Result<js_sys::Function, SegmentationError> {
        let func = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("removeBackground"))
            .map_err(|e| SegmentationError::Unavailable(js_error_message(&e)))?;
        func.dyn_into::<js_sys::Function>().map_err(|_| {
            SegmentationError::Unavailable(
                "removeBackground is not a function in the worker scope".to_string(),
            )
        })
    }
}

impl BackgroundRemover for JsBackgroundRemover {
    async fn remove(
        &self,
        image: &[u8],
        progress: ProgressFn,
    ) -> Result<DynamicImage, SegmentationError> {
        let capability = Self::capability()?;

        let config = js_sys::Object::new();
        set(&config, "publicPath", &JsValue::from_str(&self.model_base_url));

        // The capability fires `progress` repeatedly while the promise
        // below is pending, so the JS closure must own its end of the
        // callback — that is what the `Rc` in `ProgressFn` is for.
        let on_progress = Closure::<dyn Fn(JsValue, f64, f64)>::new(
            move |_key: JsValue, current: f64, total: f64| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                progress(current.max(0.0) as u64, total.max(0.0) as u64);
            },
        );
        set(&config, "progress", on_progress.as_ref());

        let image_js = js_sys::Uint8Array::from(image);
        let promise: js_sys::Promise = capability
            .call2(&JsValue::NULL, &image_js, &config)
            .map_err(|e| SegmentationError::Inference(js_error_message(&e)))?
            .dyn_into()
            .map_err(|_| {
                SegmentationError::Inference("removeBackground did not return a promise".to_string())
            })?;

        let output = JsFuture::from(promise)
            .await
            .map_err(|e| SegmentationError::Inference(js_error_message(&e)))?;
        drop(on_progress); // capability settled; no more callbacks

        let bytes = output_bytes(output).await?;
        image::load_from_memory(&bytes).map_err(|e| SegmentationError::Decode(e.to_string()))
    }
}

/// Extract the raw bytes from the capability's resolved value — a
/// `Uint8Array` or a `Blob`.
async fn output_bytes(output: JsValue) -> Result<Vec<u8>, SegmentationError> {
    if let Some(array) = output.dyn_ref::<js_sys::Uint8Array>() {
        return Ok(array.to_vec());
    }

    let blob: web_sys::Blob = output.dyn_into().map_err(|_| {
        SegmentationError::Decode(
            "removeBackground returned neither a Uint8Array nor a Blob".to_string(),
        )
    })?;
    let buffer = JsFuture::from(blob.array_buffer())
        .await
        .map_err(|e| SegmentationError::Decode(js_error_message(&e)))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn set(target: &js_sys::Object, key: &str, value: &JsValue) {
    // Setting a field on a fresh object cannot fail.
    let _ = js_sys::Reflect::set(target, &JsValue::from_str(key), value);
}

fn js_error_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
