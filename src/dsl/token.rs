//! Token and source position types.

use std::fmt;
use std::sync::Arc;

/// A position in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, counted in characters)
    pub col: usize,
    /// Identifier of the source unit (usually a file name)
    pub file: Arc<str>,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, col: usize, file: impl Into<Arc<str>>) -> Self {
        Self {
            line,
            col,
            file: file.into(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.file, self.line, self.col)
    }
}

/// An inclusive range of characters between two positions.
///
/// A single-character token has `start == end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a new range.
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            (start.line, start.col) <= (end.line, end.col),
            "range start must not come after its end"
        );
        Self { start, end }
    }

    /// A range covering exactly one position.
    pub fn point(position: Position) -> Self {
        Self {
            start: position.clone(),
            end: position,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{}-{}:{}",
            self.start.file, self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}

/// Token types in the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input
    Eof,
    /// A character no lexeme matches
    Illegal,

    /// A numeric literal, e.g. `5`, `-2`, `4.33`
    Number,
    /// A string literal (escapes already decoded)
    String,
    /// A register, circuit or macro name
    Ident,

    /// Prefix operator: `!` or `¬`
    Prefix,
    /// Infix operator: `&`, `|`, `^`, `∧`, `∨` or `⊻`
    Infix,

    /// `;`
    Semi,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `%`
    Macro,
    /// `->`
    Arrow,
    /// `:`
    Colon,

    /// Keyword `clock`
    Clock,
    /// Keyword `name`
    Name,
    /// Keyword `circuit`
    Circuit,
    /// Keyword `include`
    Include,
}

/// Keyword spellings and the token kinds they lex as.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("clock", TokenKind::Clock),
    ("name", TokenKind::Name),
    ("circuit", TokenKind::Circuit),
    ("include", TokenKind::Include),
];

/// Look up the keyword kind for an identifier, if it is one.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == ident)
        .map(|(_, kind)| *kind)
}

impl TokenKind {
    /// Check whether this kind appears in the keyword table.
    pub fn is_keyword(&self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| kind == self)
    }

    /// Human-readable name, used in token renderings and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eof => "EOF",
            Self::Illegal => "illegal",
            Self::Number => "number",
            Self::String => "string",
            Self::Ident => "identifier",
            Self::Prefix => "prefix",
            Self::Infix => "infix",
            Self::Semi => ";",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Comma => ",",
            Self::Macro => "%",
            Self::Arrow => "->",
            Self::Colon => ":",
            Self::Clock => "clock",
            Self::Name => "name",
            Self::Circuit => "circuit",
            Self::Include => "include",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text, after any literal transformation
    pub literal: String,
    /// Where the token's full lexeme sits in the source
    pub range: Range,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, literal: impl Into<String>, range: Range) -> Self {
        Self {
            kind,
            literal: literal.into(),
            range,
        }
    }

    /// An end-of-input token at the given position.
    pub fn eof(position: Position) -> Self {
        Self::new(TokenKind::Eof, "", Range::point(position))
    }

    /// Check whether this token is of the given kind.
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} `{}`", self.range, self.kind, self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table() {
        assert!(TokenKind::Clock.is_keyword());
        assert!(TokenKind::Include.is_keyword());
        assert!(!TokenKind::Ident.is_keyword());
        assert!(!TokenKind::Arrow.is_keyword());

        assert_eq!(lookup_keyword("circuit"), Some(TokenKind::Circuit));
        assert_eq!(lookup_keyword("Circuit"), None);
        assert_eq!(lookup_keyword("clocks"), None);
    }

    #[test]
    fn test_token_display() {
        let range = Range::new(Position::new(2, 3, "main.bl"), Position::new(2, 4, "main.bl"));
        let tok = Token::new(TokenKind::Arrow, "->", range);
        assert_eq!(tok.to_string(), "[main.bl 2:3-2:4] -> `->`");

        let eof = Token::eof(Position::new(7, 1, "main.bl"));
        assert_eq!(eof.to_string(), "[main.bl 7:1-7:1] EOF ``");
    }
}
