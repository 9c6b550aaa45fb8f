//! WebAssembly Bridge Implementations
//!
//! This crate provides browser implementations of the bridge traits defined in
//! `bridge-traits`, using `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! On native targets it compiles to an empty crate.
//!
//! # Implementations
//!
//! - `WasmHttpClient`: `fetch`-based HTTP transport
//! - `LocalStorageSecureStore`: session token persistence in `localStorage`

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod http;
pub mod storage;

pub use http::WasmHttpClient;
pub use storage::LocalStorageSecureStore;

use bridge_traits::error::BridgeError;
use wasm_bindgen::{JsCast, JsValue};

/// Convert a JavaScript exception into a bridge error with context.
pub(crate) fn js_error(context: &str, err: JsValue) -> BridgeError {
    let message = if err.is_string() {
        err.as_string().unwrap_or_default()
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    };
    BridgeError::OperationFailed(format!("wasm bridge {context}: {message}"))
}
