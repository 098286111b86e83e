//! Token stream for the Cool AST dump format.
//!
//! [`Lexer`] is a lazy, forward-only iterator over `Result<Token>`. It stops for
//! good after the end of input or after the first lexical error; there is no
//! resynchronization. Quoted strings are handed to a small nested state machine
//! ([`StringState`]) that decodes escapes as it goes.

use std::iter::{FusedIterator, Peekable};
use std::str::CharIndices;

use tracing::debug;

use crate::ast::{LineNumber, NodeKind, NO_TYPE_KEYWORD};
use crate::diagnostics::{lexical_error, to_error_source, ErrorContext, Result, SourceArc};
use crate::syntax::{Span, Token, TokenKind};

pub const DEFAULT_SOURCE_NAME: &str = "<input>";

pub struct Lexer<'a> {
    source: &'a str,
    name: String,
    chars: Peekable<CharIndices<'a>>,
    line: LineNumber,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_name(source, DEFAULT_SOURCE_NAME)
    }

    /// Creates a lexer whose diagnostics name the input `name`.
    pub fn with_name(source: &'a str, name: impl Into<String>) -> Self {
        let name = name.into();
        debug!(source = %name, bytes = source.len(), "lexing");
        Self {
            source,
            name,
            chars: source.char_indices().peekable(),
            line: 0,
            finished: false,
        }
    }

    /// Value of the most recent line-number marker.
    pub fn line(&self) -> LineNumber {
        self.line
    }

    /// Byte offset of the next unread character.
    pub fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.source.len(), |&(offset, _)| offset)
    }

    /// Source handle for diagnostics pointing into this input.
    pub fn error_source(&self) -> SourceArc {
        to_error_source(&self.name, self.source)
    }

    pub fn error_context(&self, span: Span) -> ErrorContext {
        ErrorContext::with_source_and_span(self.error_source(), span)
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();
        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(None);
        };

        let kind = match c {
            '#' => self.line_marker(start)?,
            '0'..='9' => self.integer(),
            c if is_word_char(c) => self.word(),
            '(' => self.punct(TokenKind::LParen),
            ')' => self.punct(TokenKind::RParen),
            ':' => self.punct(TokenKind::Colon),
            '"' => self.string(start)?,
            other => {
                let span = Span {
                    start,
                    end: start + other.len_utf8(),
                };
                return Err(lexical_error(
                    format!("unrecognized character {other:?}"),
                    other.to_string(),
                    self.line,
                    self.error_context(span),
                ));
            }
        };

        let span = Span {
            start,
            end: self.offset(),
        };
        Ok(Some(Token {
            kind,
            span,
            line: self.line,
        }))
    }

    fn skip_whitespace(&mut self) {
        while self
            .chars
            .next_if(|&(_, c)| matches!(c, ' ' | '\t' | '\r' | '\n'))
            .is_some()
        {}
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.chars.next();
        kind
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset();
        while self.chars.next_if(|&(_, c)| pred(c)).is_some() {}
        let end = self.offset();
        &self.source[start..end]
    }

    fn line_marker(&mut self, start: usize) -> Result<TokenKind> {
        self.chars.next();
        let digits = self.take_while(|c| c.is_ascii_digit());
        let end = self.offset();
        let text = &self.source[start..end];
        if digits.is_empty() {
            return Err(lexical_error(
                "line number marker `#` must be followed by digits",
                text,
                self.line,
                self.error_context(Span { start, end }),
            ));
        }
        let value = digits.parse::<LineNumber>().map_err(|_| {
            lexical_error(
                format!("line number {text} is out of range"),
                text,
                self.line,
                self.error_context(Span { start, end }),
            )
        })?;
        self.line = value;
        Ok(TokenKind::LineNumber(value))
    }

    fn integer(&mut self) -> TokenKind {
        let digits = self.take_while(|c| c.is_ascii_digit());
        TokenKind::IntConst(digits.to_string())
    }

    fn word(&mut self) -> TokenKind {
        let text = self.take_while(is_word_char);
        if text == NO_TYPE_KEYWORD {
            return TokenKind::NoType;
        }
        match NodeKind::from_keyword(text) {
            Some(kind) => TokenKind::Keyword(kind),
            None => TokenKind::Identifier(text.to_string()),
        }
    }

    fn string(&mut self, start: usize) -> Result<TokenKind> {
        self.chars.next();
        let mut value = String::new();
        let mut state = StringState::Body;
        loop {
            let Some((_, c)) = self.chars.next() else {
                let end = self.source.len();
                return Err(lexical_error(
                    "unterminated string literal",
                    &self.source[start..end],
                    self.line,
                    self.error_context(Span { start, end })
                        .with_help("string literals end with an unescaped `\"`"),
                ));
            };
            state = match (state, c) {
                (StringState::Body, '"') => return Ok(TokenKind::StrConst(value)),
                (StringState::Body, '\\') => StringState::Escape,
                (StringState::Body, c) => {
                    value.push(c);
                    StringState::Body
                }
                (StringState::Escape, c) => {
                    value.push(decode_escape(c));
                    StringState::Body
                }
            };
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Lexer<'_> {}

/// States of the string-literal sub-lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringState {
    Body,
    /// Just consumed a backslash.
    Escape,
}

/// Decodes the character following a backslash inside a string literal.
pub fn decode_escape(c: char) -> char {
    match c {
        'b' => '\u{8}',
        't' => '\t',
        'n' => '\n',
        'f' => '\u{c}',
        other => other,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lexes the whole input eagerly. Mostly useful for tests and tooling.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).collect()
}
