//! Cropkit WASM - WebAssembly bindings for cropkit
//!
//! This crate exposes the cropkit-core crop pipeline to JavaScript/TypeScript.
//!
//! # Module Structure
//!
//! - `crop` - Crop entry points and the rectangle/sample-size helpers
//! - `types` - WASM-compatible wrapper types for image data
//! - `logging` - Forwards library log records to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { crop_image, set_log_level } from '@cropkit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//! set_log_level('debug');
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const cropped = crop_image(bytes, 90, 0, 0, 300, 200, 300, 200, undefined);
//! ```

use log::LevelFilter;
use wasm_bindgen::prelude::*;

mod crop;
mod logging;
mod types;

pub use crop::{
    calculate_sample_size, crop_image, crop_in_memory, crop_region, map_rect_to_raw_space,
    read_exif_rotation,
};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::install(LevelFilter::Warn);
}

/// Set the console log level (`"off"`, `"error"`, `"warn"`, `"info"`,
/// `"debug"` or `"trace"`). Returns false for an unknown level.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match logging::parse_level(level) {
        Some(filter) => {
            logging::install(filter);
            true
        }
        None => false,
    }
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
