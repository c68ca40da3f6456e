//! Lexer (tokenizer) for the circuit DSL.
//!
//! Tokens are produced on demand: each call to [`Lexer::next_token`] scans
//! exactly one lexeme from the current cursor. Nothing runs between pulls,
//! so a parser that stops early simply drops the lexer.
//!
//! Lexemes are matched by trying an ordered table of anchored patterns. The
//! first pattern that matches wins, so the order of [`LEXEMES`] decides, for
//! example, that `-2` is a number rather than something starting with `-`,
//! and that `->` is never split.

use std::iter::FusedIterator;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::token::{lookup_keyword, Position, Range, Token, TokenKind};

/// What to do with a lexeme's captured text once it has matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    /// Keep the captured text as-is
    None,
    /// Decode backslash escapes (string literals)
    Unescape,
    /// Re-classify the token if the text is a keyword (identifiers)
    Keyword,
}

/// One entry of the lexeme table.
struct Lexeme {
    pattern: Regex,
    kind: TokenKind,
    /// Capture group holding the token's literal
    group: usize,
    transform: Transform,
}

impl Lexeme {
    fn new(pattern: &str, kind: TokenKind, group: usize, transform: Transform) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("lexeme patterns are valid regular expressions"),
            kind,
            group,
            transform,
        }
    }

    fn classify(&self, captured: &str) -> (TokenKind, String) {
        match self.transform {
            Transform::None => (self.kind, captured.to_string()),
            Transform::Unescape => (self.kind, unescape(captured)),
            Transform::Keyword => (
                lookup_keyword(captured).unwrap_or(self.kind),
                captured.to_string(),
            ),
        }
    }
}

/// The lexeme table, in priority order.
static LEXEMES: Lazy<Vec<Lexeme>> = Lazy::new(|| {
    use TokenKind::*;

    vec![
        // literals
        Lexeme::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?", Number, 0, Transform::None),
        Lexeme::new(r#"^"((?:\\"|[^"])*)""#, String, 1, Transform::Unescape),
        Lexeme::new(r"^'((?:\\'|[^'])*)'", String, 1, Transform::Unescape),
        Lexeme::new(r"^[\p{L}\p{M}_][\p{L}\p{M}0-9_!?]*", Ident, 0, Transform::Keyword),
        // punctuation
        Lexeme::new(r"^;", Semi, 0, Transform::None),
        Lexeme::new(r"^\(", LeftParen, 0, Transform::None),
        Lexeme::new(r"^\)", RightParen, 0, Transform::None),
        Lexeme::new(r"^\{", LeftBrace, 0, Transform::None),
        Lexeme::new(r"^\}", RightBrace, 0, Transform::None),
        Lexeme::new(r"^,", Comma, 0, Transform::None),
        Lexeme::new(r"^%", Macro, 0, Transform::None),
        Lexeme::new(r"^->", Arrow, 0, Transform::None),
        Lexeme::new(r"^:", Colon, 0, Transform::None),
        // prefix operators
        Lexeme::new(r"^!", Prefix, 0, Transform::None),
        Lexeme::new(r"^¬", Prefix, 0, Transform::None),
        // infix operators
        Lexeme::new(r"^&", Infix, 0, Transform::None),
        Lexeme::new(r"^\|", Infix, 0, Transform::None),
        Lexeme::new(r"^\^", Infix, 0, Transform::None),
        Lexeme::new(r"^∧", Infix, 0, Transform::None),
        Lexeme::new(r"^∨", Infix, 0, Transform::None),
        Lexeme::new(r"^⊻", Infix, 0, Transform::None),
    ]
});

/// Decode a single escape character, if it is in the escape table.
fn escape_for(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        '"' => Some('"'),
        '\'' => Some('\''),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0C'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0B'),
        _ => None,
    }
}

/// Decode backslash escapes in a string literal's body.
///
/// A backslash followed by a character outside the escape table is kept
/// verbatim, together with that character.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some(esc) => match escape_for(esc) {
                Some(decoded) => out.push(decoded),
                None => {
                    out.push('\\');
                    out.push(esc);
                }
            },
            None => out.push('\\'),
        }
    }

    out
}

/// File identifier used when the caller supplies an empty one.
pub const ANONYMOUS_FILE: &str = "<input>";

/// Lexer for tokenizing circuit DSL input.
pub struct Lexer {
    source: String,
    /// Byte offset of the cursor into `source`
    offset: usize,
    line: usize,
    col: usize,
    file: Arc<str>,
    /// Set once the iterator has observed `EOF`
    exhausted: bool,
}

impl Lexer {
    /// Create a new lexer for the given input.
    ///
    /// `file` identifies the source unit in every token's range. An empty
    /// identifier is replaced by [`ANONYMOUS_FILE`].
    pub fn new(input: &str, file: impl Into<Arc<str>>) -> Self {
        let mut file: Arc<str> = file.into();
        if file.is_empty() {
            file = Arc::from(ANONYMOUS_FILE);
        }

        let mut source = String::with_capacity(input.len() + 1);
        source.push_str(input);
        // A trailing newline guarantees every line comment is terminated.
        source.push('\n');

        Self {
            source,
            offset: 0,
            line: 1,
            col: 1,
            file,
            exhausted: false,
        }
    }

    /// Get the next token.
    ///
    /// Once the input is exhausted this keeps returning `EOF` tokens.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        if self.offset >= self.source.len() {
            return Token::eof(self.cursor());
        }

        let start = self.cursor();
        let (kind, literal, len) = self.match_lexeme();
        let (end_line, end_col) = self.advance(len);
        let end = Position::new(end_line, end_col, self.file.clone());

        let token = Token::new(kind, literal, Range::new(start, end));
        trace!(kind = %token.kind, literal = %token.literal, range = %token.range, "lexed token");

        self.skip_trailing();
        token
    }

    /// Current cursor position.
    fn cursor(&self) -> Position {
        Position::new(self.line, self.col, self.file.clone())
    }

    fn current_char(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    /// Find the first lexeme matching at the cursor.
    ///
    /// Returns the token kind, its literal, and the byte length of the whole
    /// match. Unmatched input yields a one-character `Illegal` token.
    fn match_lexeme(&self) -> (TokenKind, String, usize) {
        let rest = &self.source[self.offset..];

        for lexeme in LEXEMES.iter() {
            if let Some(caps) = lexeme.pattern.captures(rest) {
                let whole = caps.get(0).map_or("", |m| m.as_str());
                if whole.is_empty() {
                    continue;
                }
                let captured = caps.get(lexeme.group).map_or("", |m| m.as_str());
                let (kind, literal) = lexeme.classify(captured);
                return (kind, literal, whole.len());
            }
        }

        match rest.chars().next() {
            Some(ch) => (TokenKind::Illegal, ch.to_string(), ch.len_utf8()),
            None => (TokenKind::Eof, String::new(), 0),
        }
    }

    /// Move the cursor `len` bytes forward, tracking line and column.
    ///
    /// Returns the line and column of the last character passed over.
    fn advance(&mut self, len: usize) -> (usize, usize) {
        let end = (self.offset + len).min(self.source.len());
        let mut last = (self.line, self.col);

        for ch in self.source[self.offset..end].chars() {
            last = (self.line, self.col);
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }

        self.offset = end;
        last
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance(ch.len_utf8());
            } else if ch == '#' {
                self.skip_comment();
            } else {
                break;
            }
        }
    }

    /// Skip same-line whitespace and a trailing comment after a token.
    fn skip_trailing(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() && ch != '\n' {
                self.advance(ch.len_utf8());
            } else {
                break;
            }
        }

        if self.current_char() == Some('#') {
            self.skip_comment();
        }
    }

    /// Skip up to, but not including, the end of the line.
    fn skip_comment(&mut self) {
        let rest = &self.source[self.offset..];
        let len = rest.find('\n').unwrap_or(rest.len());
        self.advance(len);
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields every token before `EOF`, then `None` forever.
    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }

        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            self.exhausted = true;
            None
        } else {
            Some(token)
        }
    }
}

impl FusedIterator for Lexer {}

/// Tokenize a whole input, excluding the final `EOF`.
pub fn tokenize(input: &str, file: &str) -> Vec<Token> {
    Lexer::new(input, file).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input, "test").into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lexer_every_lexeme() {
        let input = r#"
            5 -2 +4.33 0.1290; # some numbers
            ident_1 π___05xyz 5a;
            "hello \" world" 'foo \' bar';

            # the prefixes:
            ! ¬

            # the infixes:
            & | ^ ∧ ∨ ⊻

            ; ( ) { } , % -> :

            clock name circuit include

            $ # this token is illegal
        "#;

        use TokenKind::*;
        let expected = vec![
            Number, Number, Number, Number, Semi,
            Ident, Ident, Number, Ident, Semi,
            String, String, Semi,
            Prefix, Prefix,
            Infix, Infix, Infix, Infix, Infix, Infix,
            Semi, LeftParen, RightParen, LeftBrace, RightBrace,
            Comma, Macro, Arrow, Colon,
            Clock, Name, Circuit, Include,
            Illegal,
        ];

        let tokens = tokenize(input, "test");
        assert_eq!(tokens.iter().map(|t| t.kind).collect::<Vec<_>>(), expected);
        for tok in &tokens {
            assert_eq!(&*tok.range.start.file, "test");
            assert_eq!(&*tok.range.end.file, "test");
        }
    }

    #[test]
    fn test_lexer_positions() {
        let tokens = tokenize("ab -> c;\n  %d", "pos");

        let spans: Vec<_> = tokens
            .iter()
            .map(|t| {
                (
                    t.range.start.line,
                    t.range.start.col,
                    t.range.end.line,
                    t.range.end.col,
                )
            })
            .collect();

        assert_eq!(
            spans,
            vec![(1, 1, 1, 2), (1, 4, 1, 5), (1, 7, 1, 7), (1, 8, 1, 8), (2, 3, 2, 3), (2, 4, 2, 4)]
        );
    }

    #[test]
    fn test_lexer_unicode_columns() {
        let tokens = tokenize("a ∧ b", "u");
        assert_eq!(tokens[1].literal, "∧");
        assert_eq!(tokens[1].range.start.col, 3);
        assert_eq!(tokens[2].range.start.col, 5);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""hello \" world" 'tab\there' "keep \q""#, "s");
        assert_eq!(tokens[0].literal, "hello \" world");
        assert_eq!(tokens[1].literal, "tab\there");
        assert_eq!(tokens[2].literal, "keep \\q");
        // The range covers the quotes, the literal does not.
        assert_eq!(tokens[0].range.start.col, 1);
        assert_eq!(tokens[0].range.end.col, 16);
    }

    #[test]
    fn test_escape_table_both_quotes() {
        let table = [
            (r"\n", "\n"),
            (r#"\""#, "\""),
            (r"\'", "'"),
            (r"\a", "\u{7}"),
            (r"\b", "\u{8}"),
            (r"\f", "\u{c}"),
            (r"\r", "\r"),
            (r"\t", "\t"),
            (r"\v", "\u{b}"),
        ];

        for (escape, decoded) in table {
            for quote in ['"', '\''] {
                let source = format!("{quote}x{escape}y{quote}");
                let tokens = tokenize(&source, "esc");
                assert_eq!(tokens.len(), 1, "{} lexed as {:?}", source, tokens);
                assert_eq!(tokens[0].kind, TokenKind::String);
                assert_eq!(tokens[0].literal, format!("x{}y", decoded), "decoding {}", source);
            }
        }
    }

    #[test]
    fn test_empty_file_name_gets_placeholder() {
        let tokens = tokenize("a", "");
        assert_eq!(&*tokens[0].range.start.file, ANONYMOUS_FILE);
        assert_eq!(&*tokens[0].range.end.file, ANONYMOUS_FILE);

        let mut lexer = Lexer::new("", "");
        assert_eq!(&*lexer.next_token().range.start.file, ANONYMOUS_FILE);
    }

    #[test]
    fn test_multiline_string_keeps_lines() {
        let tokens = tokenize("\"a\nb\" x", "m");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].range.end.line, 2);
        assert_eq!(tokens[1].range.start.line, 2);
        assert_eq!(tokens[1].range.start.col, 4);
    }

    #[test]
    fn test_illegal_character() {
        let tokens = tokenize("a $ b", "i");
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].literal, "$");
        assert_eq!(tokens[1].range.start, tokens[1].range.end);
    }

    #[test]
    fn test_next_token_tracks_cursor() {
        let mut lexer = Lexer::new("a\n  ->", "cur");

        let first = lexer.next_token();
        assert_eq!(first.range.to_string(), "cur 1:1-1:1");

        let arrow = lexer.next_token();
        assert_eq!(arrow.kind, TokenKind::Arrow);
        assert_eq!(arrow.range.to_string(), "cur 2:3-2:4");

        let eof = lexer.next_token();
        assert_eq!((eof.range.start.line, eof.range.start.col), (3, 1));
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x", "e");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn test_iterator_is_fused() {
        let mut lexer = Lexer::new("x y", "f");
        assert!(lexer.next().is_some());
        assert!(lexer.next().is_some());
        assert!(lexer.next().is_none());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_comments_are_invisible() {
        assert_eq!(
            kinds("# leading\na # trailing\n#only\nb"),
            vec![TokenKind::Ident, TokenKind::Ident]
        );
        assert!(kinds("# nothing but a comment").is_empty());
    }

    #[test]
    fn test_arrow_not_split() {
        assert_eq!(
            kinds("a->b -1"),
            vec![TokenKind::Ident, TokenKind::Arrow, TokenKind::Ident, TokenKind::Number]
        );
    }
}
