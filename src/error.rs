//! Error types for the booleang front end.
//!
//! [`ParseError`] is the structured error the parser records for every
//! problem it finds. [`BooleangError`] wraps it together with the I/O
//! failures that the file-reading entry points can hit.

use thiserror::Error;

use crate::dsl::{Range, Token, TokenKind};

/// Result type alias using [`BooleangError`].
pub type Result<T> = std::result::Result<T, BooleangError>;

/// Unified error type for all booleang operations.
#[derive(Error, Debug)]
pub enum BooleangError {
    /// Error while lexing or parsing source text
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Error reading a source file
    #[error("Failed to read source file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error on standard input/output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character no lexeme matches
    Lexical,
    /// The parser expected one token and found another
    Structural,
    /// A token of the right kind carried an unacceptable value
    /// (bit literals, clock delays)
    Semantic,
}

/// A parse error with its source range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{{* Parse Error @ [{range}] *}} {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub range: Range,
}

impl ParseError {
    /// Create a parse error.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, range: Range) -> Self {
        Self {
            kind,
            message: message.into(),
            range,
        }
    }

    /// An illegal character reached the token stream.
    pub fn illegal_token(token: &Token) -> Self {
        Self::new(
            ParseErrorKind::Lexical,
            format!("illegal token found: `{}`", token.literal),
            token.range.clone(),
        )
    }

    /// The next token was not the one the grammar requires.
    pub fn expected(expected: TokenKind, found: &Token) -> Self {
        Self::new(
            ParseErrorKind::Structural,
            format!("expected {}, got {}", expected, found.kind),
            found.range.clone(),
        )
    }

    /// A token that cannot appear where it was found.
    pub fn unexpected(found: &Token, context: &str) -> Self {
        Self::new(
            ParseErrorKind::Structural,
            format!("unexpected token '{}' {}", found.kind, context),
            found.range.clone(),
        )
    }

    /// A well-formed token with an unacceptable value.
    pub fn semantic(message: impl Into<String>, range: Range) -> Self {
        Self::new(ParseErrorKind::Semantic, message, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::Position;

    #[test]
    fn test_parse_error_display() {
        let range = Range::new(Position::new(3, 5, "add.bl"), Position::new(3, 6, "add.bl"));
        let tok = Token::new(TokenKind::Arrow, "->", range);
        let err = ParseError::expected(TokenKind::RightParen, &tok);

        assert_eq!(err.kind, ParseErrorKind::Structural);
        assert_eq!(
            err.to_string(),
            "{* Parse Error @ [add.bl 3:5-3:6] *} expected ), got ->"
        );
    }

    #[test]
    fn test_wrapped_parse_error_is_transparent() {
        let range = Range::point(Position::new(1, 1, "x"));
        let err = ParseError::semantic("a bit literal must be 0 or 1", range);
        let wrapped = BooleangError::from(err.clone());
        assert_eq!(wrapped.to_string(), err.to_string());
    }
}
