//! WASM bindings for Booleang Core.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmParser } from 'booleang_core';
//!
//! await init();
//!
//! const text = WasmParser.parse('circuit main { a & b -> c; }', 'main.bl');
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// JavaScript-facing entry points to the parser.
#[wasm_bindgen]
pub struct WasmParser;

#[wasm_bindgen]
impl WasmParser {
    /// Parse source text and return the program's debug rendering.
    ///
    /// Throws the formatted parse error on failure.
    #[wasm_bindgen]
    pub fn parse(source: &str, file: &str) -> Result<String, JsValue> {
        dsl::parse(source, file)
            .map(|program| program.to_string())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Lex source text and return one token rendering per line.
    #[wasm_bindgen]
    pub fn tokens(source: &str, file: &str) -> String {
        dsl::tokenize(source, file)
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
