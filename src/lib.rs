//! # Booleang Core
//!
//! Front end for booleang, a small language for describing digital logic
//! circuits.
//!
//! This library provides:
//! - A lexer that turns source text into positioned tokens
//! - A recursive descent parser producing an AST of circuits, macros,
//!   calls, pipes and clocks
//! - Structured parse errors carrying source ranges
//!
//! It does not check names, register counts or includes; a [`Program`] is
//! a faithful tree of what was written and nothing more.
//!
//! ## Architecture
//!
//! - [`dsl`] - Tokens, lexer, AST and parser
//! - [`error`] - Error types
//! - [`repl`] - Interactive token echo (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! bl adder.bl          # print the parsed program
//! bl --tokens adder.bl # print every token
//! bl                   # interactive lexer REPL
//! ```
//!
//! ### Library
//!
//! ```
//! let program = booleang_core::dsl::parse("circuit main { a & b -> c; }", "main.bl").unwrap();
//! assert_eq!(program.circuits[0].name, "main");
//! ```

pub mod dsl;
pub mod error;

#[cfg(feature = "cli")]
pub mod repl;

// Re-export main types for convenience
pub use dsl::{parse, Program};
pub use error::{BooleangError, ParseError, ParseErrorKind, Result};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmParser;

/// Name given to a program without a `name: "...";` declaration.
pub const DEFAULT_PROGRAM_NAME: &str = "unnamed";

/// File identifier used for input typed into the REPL.
pub const REPL_FILE: &str = "repl";
