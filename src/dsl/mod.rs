//! Lexer, AST and parser for the booleang circuit language.
//!
//! # Grammar Overview
//!
//! ```text
//! program    = [ "name" ":" string ";" ] { circuit | include }
//! include    = "include" [ "name" ] string ";"
//! circuit    = "circuit" ident [ "(" idents ")" "->" "(" idents ")" ] "{" { statement } "}"
//! statement  = macro | call | pipe | clock
//! macro      = "%" ident "(" params ")" ";"
//! call       = ident "(" exprs ")" [ "->" "(" params ")" ] ";"
//! pipe       = ( expr | "(" exprs ")" ) "->" ( param | "(" params ")" ) ";"
//! clock      = "clock" number unit [ "%" ident ] "{" { statement } "}"
//! expr       = primary [ infix_op expr ]
//! primary    = ident | bit | "(" expr ")" | prefix_op expr | "%" ident
//! param      = [ "%" ] ident
//!
//! unit       = "ns" | "ms" | "s" | "m" | "h"
//! prefix_op  = "!" | "¬"
//! infix_op   = "&" | "|" | "^" | "∧" | "∨" | "⊻"
//! ```
//!
//! Infix operators have no precedence: each one takes the entire rest of
//! the expression as its right operand.
//!
//! Comments run from `#` to the end of the line. Strings may use either
//! `"` or `'` and support the escapes `\n \" \' \a \b \f \r \t \v`.
//!
//! # Example
//!
//! ```text
//! name: "adder";
//! include name "std";
//!
//! circuit half_add (a, b) -> (sum, carry) {
//!     a ⊻ b -> sum;
//!     a ∧ b -> carry;
//! }
//!
//! circuit main {
//!     %num (n0, n1);
//!     clock 500 ms %tick {
//!         half_add (n0, 1) -> (n0, c);
//!         n1 ⊻ c -> n1;
//!     }
//! }
//! ```

mod ast;
mod lexer;
mod parser;
mod token;

pub use ast::*;
pub use lexer::{tokenize, unescape, Lexer, ANONYMOUS_FILE};
pub use parser::{Parser, MAX_NESTING_DEPTH};
pub use token::{lookup_keyword, Position, Range, Token, TokenKind, KEYWORDS};

use crate::error::ParseError;

/// Parse source text into a [`Program`].
///
/// `file` identifies the source in error ranges; an empty name is shown
/// as [`ANONYMOUS_FILE`]. Only the first error is
/// returned; use [`Parser`] directly to see all of them.
pub fn parse(input: &str, file: &str) -> Result<Program, ParseError> {
    let lexer = Lexer::new(input, file);
    let mut parser = Parser::new(lexer);
    parser.parse()
}

/// Parse a source file, naming it by its base name.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> crate::error::Result<Program> {
    let content = read_source(path)?;
    Ok(parse(&content, &file_label(path))?)
}

/// Read a source file.
#[cfg(feature = "cli")]
pub fn read_source(path: &std::path::Path) -> crate::error::Result<String> {
    std::fs::read_to_string(path).map_err(|e| crate::error::BooleangError::FileRead {
        path: path.display().to_string(),
        source: e,
    })
}

/// The identifier used for a file in token ranges: its base name.
#[cfg(feature = "cli")]
pub fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
