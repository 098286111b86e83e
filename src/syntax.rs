//! Syntax module for the Cool AST dump format.
//!
//! The [`lexer`] turns dump text into [`Token`]s and the [`parser`] assembles
//! them into the typed tree defined in [`crate::ast`].

use std::fmt;

use serde::Serialize;

use crate::ast::{LineNumber, NodeKind, NO_TYPE_KEYWORD};

pub mod lexer;
pub mod parser;

/// Byte range in the dump text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One lexical token of the dump format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Value of the most recent `#<n>` marker, or 0 before the first one.
    pub line: LineNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `#<digits>`
    LineNumber(LineNumber),
    /// A reserved `_word` naming a node variant.
    Keyword(NodeKind),
    /// `_no_type`
    NoType,
    Identifier(String),
    /// Digit run, kept as written.
    IntConst(String),
    /// Decoded string literal contents.
    StrConst(String),
    LParen,
    RParen,
    Colon,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LineNumber(n) => write!(f, "line number marker `#{n}`"),
            TokenKind::Keyword(kind) => write!(f, "keyword `{}`", kind.keyword()),
            TokenKind::NoType => write!(f, "keyword `{NO_TYPE_KEYWORD}`"),
            TokenKind::Identifier(name) => write!(f, "identifier `{name}`"),
            TokenKind::IntConst(n) => write!(f, "integer `{n}`"),
            TokenKind::StrConst(s) => write!(f, "string {s:?}"),
            TokenKind::LParen => write!(f, "`(`"),
            TokenKind::RParen => write!(f, "`)`"),
            TokenKind::Colon => write!(f, "`:`"),
        }
    }
}
