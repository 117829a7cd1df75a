//! WASM bindings for rich-text documents
//!
//! Compiled only with the `wasm` feature.

pub mod bindings;
pub mod utils;

pub use bindings::WasmDocument;
pub use utils::init_panic_hook;
