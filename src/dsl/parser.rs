//! Recursive descent parser for the circuit DSL.
//!
//! The parser keeps one token of lookahead: `current` is the token being
//! parsed and `peek` the one after it. Every `parse_*` method is entered
//! with `current` on the first token of its production and returns with
//! `current` on the last token it consumed.
//!
//! Errors are recorded in an ordered list as they are found. A failed
//! production returns `Err` and the failure propagates all the way up, so
//! the first structural error ends the parse. Illegal characters are
//! recorded as soon as they appear in `peek` but do not stop parsing by
//! themselves.

use std::num::IntErrorKind;
use std::time::Duration;

use tracing::debug;

use super::ast::*;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::error::{ParseError, ParseErrorKind};

type ParseResult<T> = std::result::Result<T, ParseError>;

/// Units accepted after a clock delay, for error messages.
const TIME_UNITS: &str = "ns, ms, s, m, h";

/// How deep prefix operators, parentheses and clock blocks may nest.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parser for circuit DSL.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
    depth: usize,
}

impl Parser {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer) -> Self {
        let peek = lexer.next_token();
        let mut parser = Self {
            current: Token::eof(peek.range.start.clone()),
            peek,
            lexer,
            errors: Vec::new(),
            depth: 0,
        };
        parser.check_peek();
        parser.advance();
        parser
    }

    /// Parse the entire source into a [`Program`].
    ///
    /// Returns the first recorded error, if any. The full list stays
    /// available through [`Parser::errors`].
    pub fn parse(&mut self) -> ParseResult<Program> {
        let result = self.parse_program();

        if let Ok(program) = &result {
            debug!(
                name = %program.name,
                circuits = program.circuits.len(),
                includes = program.includes.len(),
                errors = self.errors.len(),
                "parsed program"
            );
        }

        match self.errors.first() {
            Some(err) => Err(err.clone()),
            None => result,
        }
    }

    /// Every error recorded so far, in the order they were found.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Consume the parser, keeping its errors.
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    // ============ Token handling ============

    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
        self.check_peek();
    }

    /// Illegal tokens are reported as soon as they are looked at.
    fn check_peek(&mut self) {
        if self.peek.is(TokenKind::Illegal) {
            let err = ParseError::illegal_token(&self.peek);
            self.record(err);
        }
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Advance if `peek` is of the given kind, otherwise record an error.
    fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.peek_is(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.fail(ParseError::expected(kind, &self.peek)))
        }
    }

    /// Expect an identifier and return its name.
    fn expect_ident(&mut self) -> ParseResult<String> {
        self.expect(TokenKind::Ident)?;
        Ok(self.current.literal.clone())
    }

    fn record(&mut self, err: ParseError) {
        debug!(kind = ?err.kind, range = %err.range, "{}", err.message);
        self.errors.push(err);
    }

    /// Record an error and hand it back for propagation.
    fn fail(&mut self, err: ParseError) -> ParseError {
        self.record(err.clone());
        err
    }

    /// Run a nested production, refusing to go deeper than
    /// [`MAX_NESTING_DEPTH`].
    fn nested<T>(&mut self, inner: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            let err = ParseError::semantic(
                format!("nested more than {} levels deep", MAX_NESTING_DEPTH),
                self.current.range.clone(),
            );
            return Err(self.fail(err));
        }

        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    // ============ Top level ============

    fn parse_program(&mut self) -> ParseResult<Program> {
        let mut program = Program::new();

        if self.current_is(TokenKind::Name) {
            self.expect(TokenKind::Colon)?;
            self.expect(TokenKind::String)?;
            program.name = self.current.literal.clone();
            self.expect(TokenKind::Semi)?;
            self.advance();
        }

        while !self.current_is(TokenKind::Eof) {
            match self.current.kind {
                TokenKind::Circuit => {
                    let circuit = self.parse_circuit()?;
                    debug!(name = %circuit.name, statements = circuit.statements.len(), "parsed circuit");
                    program.circuits.push(circuit);
                }
                TokenKind::Include => {
                    let include = self.parse_include()?;
                    debug!(value = %include.value, by_name = include.by_name, "parsed include");
                    program.includes.push(include);
                }
                _ => {
                    let err = ParseError::new(
                        ParseErrorKind::Structural,
                        "only circuits and include statements can be written in the top-level of a file",
                        self.current.range.clone(),
                    );
                    return Err(self.fail(err));
                }
            }
            self.advance();
        }

        Ok(program)
    }

    fn parse_include(&mut self) -> ParseResult<Include> {
        let by_name = self.peek_is(TokenKind::Name);
        if by_name {
            self.advance();
        }

        self.expect(TokenKind::String)?;
        let value = self.current.literal.clone();
        self.expect(TokenKind::Semi)?;

        Ok(Include { by_name, value })
    }

    fn parse_circuit(&mut self) -> ParseResult<Circuit> {
        let name = self.expect_ident()?;
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();

        if self.peek_is(TokenKind::LeftParen) {
            self.advance();
            inputs = self.parse_list(TokenKind::RightParen, Self::parse_ident)?;
            self.expect(TokenKind::Arrow)?;
            self.expect(TokenKind::LeftParen)?;
            outputs = self.parse_list(TokenKind::RightParen, Self::parse_ident)?;
        }

        self.expect(TokenKind::LeftBrace)?;
        let statements = self.parse_block()?;

        Ok(Circuit {
            name,
            inputs,
            outputs,
            statements,
        })
    }

    // ============ Lists ============

    /// Parse a comma-separated list; `current` is the opening delimiter.
    ///
    /// A terminator straight after a comma closes the list, so trailing
    /// commas are accepted.
    fn parse_list<T>(
        &mut self,
        end: TokenKind,
        element: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        self.parse_delimited(end, element).map(|(items, _)| items)
    }

    /// Like [`Parser::parse_list`], also reporting whether any comma was seen.
    fn parse_delimited<T>(
        &mut self,
        end: TokenKind,
        mut element: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<(Vec<T>, bool)> {
        let mut items = Vec::new();
        let mut comma = false;

        if self.peek_is(end) {
            self.advance();
            return Ok((items, comma));
        }

        self.advance();
        items.push(element(self)?);

        while self.peek_is(TokenKind::Comma) {
            comma = true;
            self.advance();
            if self.peek_is(end) {
                break;
            }
            self.advance();
            items.push(element(self)?);
        }

        self.expect(end)?;
        Ok((items, comma))
    }

    fn parse_ident(&mut self) -> ParseResult<String> {
        if self.current_is(TokenKind::Ident) {
            Ok(self.current.literal.clone())
        } else {
            Err(self.fail(ParseError::expected(TokenKind::Ident, &self.current)))
        }
    }

    fn parse_param(&mut self) -> ParseResult<Parameter> {
        match self.current.kind {
            TokenKind::Macro => Ok(Parameter::macro_group(self.expect_ident()?)),
            TokenKind::Ident => Ok(Parameter::register(self.current.literal.clone())),
            _ => Err(self.fail(ParseError::unexpected(
                &self.current,
                "where a parameter was expected",
            ))),
        }
    }

    // ============ Statements ============

    /// Parse statements up to the closing brace; `current` is the `{`.
    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();

        while !self.peek_is(TokenKind::RightBrace) {
            if self.peek_is(TokenKind::Eof) {
                return Err(self.fail(ParseError::expected(TokenKind::RightBrace, &self.peek)));
            }
            self.advance();
            statements.push(self.parse_statement()?);
        }
        self.advance();

        Ok(statements)
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Macro => self.parse_macro(),
            TokenKind::Clock => self.parse_clock(),
            TokenKind::Ident if self.peek_is(TokenKind::LeftParen) => self.parse_call(),
            TokenKind::Ident | TokenKind::Number | TokenKind::Prefix => {
                let input = self.parse_expression()?;
                self.finish_pipe(vec![input])
            }
            TokenKind::LeftParen => self.parse_multi_pipe(),
            _ => Err(self.fail(ParseError::unexpected(
                &self.current,
                "at the start of a statement",
            ))),
        }
    }

    /// `%name (params);`, or a pipe whose input starts with `%name`.
    fn parse_macro(&mut self) -> ParseResult<Statement> {
        let name = self.expect_ident()?;

        if !self.peek_is(TokenKind::LeftParen) {
            let input = self.parse_infix_tail(Expression::Macro(name))?;
            return self.finish_pipe(vec![input]);
        }

        self.advance();
        let registers = self.parse_list(TokenKind::RightParen, Self::parse_param)?;
        self.expect(TokenKind::Semi)?;

        Ok(Statement::Macro { name, registers })
    }

    fn parse_clock(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Number)?;
        let delay = self.parse_duration()?;

        let counter = if self.peek_is(TokenKind::Macro) {
            self.advance();
            Some(self.expect_ident()?)
        } else {
            None
        };

        self.expect(TokenKind::LeftBrace)?;
        let body = self.nested(Self::parse_block)?;

        Ok(Statement::Clock {
            delay,
            counter,
            body,
        })
    }

    fn parse_call(&mut self) -> ParseResult<Statement> {
        let circuit = self.current.literal.clone();
        self.advance();
        let inputs = self.parse_list(TokenKind::RightParen, Self::parse_expression)?;

        let outputs = if self.peek_is(TokenKind::Arrow) {
            self.advance();
            self.expect(TokenKind::LeftParen)?;
            self.parse_list(TokenKind::RightParen, Self::parse_param)?
        } else {
            Vec::new()
        };

        self.expect(TokenKind::Semi)?;

        Ok(Statement::Call {
            circuit,
            inputs,
            outputs,
        })
    }

    /// `(exprs) -> outputs;`
    fn parse_multi_pipe(&mut self) -> ParseResult<Statement> {
        let (mut inputs, comma) =
            self.parse_delimited(TokenKind::RightParen, Self::parse_expression)?;

        // `(a | b) & c -> d;` is a single parenthesised operand, not a list.
        // `(a,) & b` stays a list and fails at the operator.
        if inputs.len() == 1 && !comma && self.peek_is(TokenKind::Infix) {
            if let Some(first) = inputs.pop() {
                inputs.push(self.parse_infix_tail(first)?);
            }
        }

        self.finish_pipe(inputs)
    }

    /// Parse `-> outputs;` after a pipe's inputs.
    fn finish_pipe(&mut self, inputs: Vec<Expression>) -> ParseResult<Statement> {
        self.expect(TokenKind::Arrow)?;

        let outputs = if self.peek_is(TokenKind::LeftParen) {
            self.advance();
            self.parse_list(TokenKind::RightParen, Self::parse_param)?
        } else {
            self.advance();
            vec![self.parse_param()?]
        };

        self.expect(TokenKind::Semi)?;

        Ok(Statement::Pipe { inputs, outputs })
    }

    /// Parse a clock delay; `current` is the number.
    ///
    /// Delays must be whole, non-negative amounts of one of the time units.
    fn parse_duration(&mut self) -> ParseResult<Duration> {
        let literal = self.current.literal.clone();
        let range = self.current.range.clone();

        // A zero fraction (`2.0`) still counts as whole.
        let (whole, fraction) = literal.split_once('.').unwrap_or((literal.as_str(), ""));
        if whole.starts_with('-') || fraction.bytes().any(|b| b != b'0') {
            let err = ParseError::semantic(
                format!("clock delay must be a whole, non-negative number, got {}", literal),
                range,
            );
            return Err(self.fail(err));
        }

        let amount: u64 = match whole.trim_start_matches('+').parse() {
            Ok(amount) => amount,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                let err = ParseError::semantic(format!("clock delay {} is too long", literal), range);
                return Err(self.fail(err));
            }
            Err(_) => {
                let err = ParseError::semantic(format!("invalid clock delay: {}", literal), range);
                return Err(self.fail(err));
            }
        };

        if !self.peek_is(TokenKind::Ident) {
            let err = ParseError::semantic(
                format!("expected a time unit ({}), got {}", TIME_UNITS, self.peek.kind),
                self.peek.range.clone(),
            );
            return Err(self.fail(err));
        }
        self.advance();

        let unit = self.current.literal.clone();
        let delay = match unit.as_str() {
            "ns" => Some(Duration::from_nanos(amount)),
            "ms" => Some(Duration::from_millis(amount)),
            "s" => Some(Duration::from_secs(amount)),
            "m" => amount.checked_mul(60).map(Duration::from_secs),
            "h" => amount.checked_mul(3600).map(Duration::from_secs),
            _ => {
                let err = ParseError::semantic(
                    format!("unknown time unit `{}`, expected one of {}", unit, TIME_UNITS),
                    self.current.range.clone(),
                );
                return Err(self.fail(err));
            }
        };

        match delay {
            Some(delay) => Ok(delay),
            None => {
                let err = ParseError::semantic(
                    format!("clock delay {} {} is too long", literal, unit),
                    range,
                );
                Err(self.fail(err))
            }
        }
    }

    // ============ Expressions ============

    /// Parse an expression.
    ///
    /// There is no precedence table: after a primary, an infix operator
    /// takes the whole remaining expression as its right operand, so
    /// `a & b | c` is `a & (b | c)`.
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let left = self.parse_primary()?;
        self.parse_infix_tail(left)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current.kind {
            TokenKind::Ident => Ok(Expression::Identifier(self.current.literal.clone())),
            TokenKind::Number => {
                let literal = self.current.literal.clone();
                match literal.as_str() {
                    "0" => Ok(Expression::Bit(false)),
                    "1" => Ok(Expression::Bit(true)),
                    _ => {
                        let err = ParseError::semantic(
                            format!("a bit literal must be 0 or 1, got {}", literal),
                            self.current.range.clone(),
                        );
                        Err(self.fail(err))
                    }
                }
            }
            TokenKind::LeftParen => self.nested(|p| {
                p.advance();
                let inner = p.parse_expression()?;
                p.expect(TokenKind::RightParen)?;
                Ok(inner)
            }),
            TokenKind::Prefix => self.nested(|p| {
                let operator = p.current.literal.clone();
                p.advance();
                let right = p.parse_expression()?;
                Ok(Expression::prefix(operator, right))
            }),
            TokenKind::Macro => Ok(Expression::Macro(self.expect_ident()?)),
            _ => Err(self.fail(ParseError::unexpected(&self.current, "in expression"))),
        }
    }

    /// Collect `left (op primary)*` and fold it from the right, so
    /// `a & b | c` becomes `a & (b | c)` without recursing per operator.
    fn parse_infix_tail(&mut self, left: Expression) -> ParseResult<Expression> {
        let mut tail = Vec::new();

        while self.peek_is(TokenKind::Infix) {
            self.advance();
            let operator = self.current.literal.clone();
            self.advance();
            tail.push((operator, self.parse_primary()?));
        }

        let Some((mut operator, mut expression)) = tail.pop() else {
            return Ok(left);
        };
        while let Some((previous, operand)) = tail.pop() {
            expression = Expression::infix(operand, operator, expression);
            operator = previous;
        }

        Ok(Expression::infix(left, operator, expression))
    }
}
