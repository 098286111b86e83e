//! Unified, `miette`-based diagnostics for coolast.
//!
//! Every failure produced by the lexer, the parser, the AST model or the symbol
//! table is a [`CoolAstError`]. Lexical and syntax errors carry an
//! [`ErrorContext`] pointing into the dump text so that a `miette::Report`
//! renders a labelled snippet; the narrower model and symbol-table errors carry
//! only the data needed to explain themselves.
//!
//! # Constructors
//!
//! - [`lexical_error`] and [`syntax_error`] for fatal input problems.
//! - [`schema_violation`] for parser/model mismatches (engine bugs).
//! - [`io_error`] for reading input from disk or stdin.
//!
//! Symbol-table and type-slot errors are built in place by their owners.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::ast::{LineNumber, NodeKind};
use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

pub type Result<T> = std::result::Result<T, CoolAstError>;

/// Type-safe error classification, used by the harness and by tests instead of
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Unrecognized character, malformed marker, unterminated string.
    Lexical,
    /// Token sequence matching no production.
    Syntax,
    /// Field or shape not part of a variant's schema.
    Schema,
    /// Second write to an expression's type slot.
    Type,
    /// Duplicate, missing or underflowing symbol-table operations.
    Symbol,
    /// Reading input failed.
    Io,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Lexical => "Lexical",
            ErrorType::Syntax => "Syntax",
            ErrorType::Schema => "Schema",
            ErrorType::Type => "Type",
            ErrorType::Symbol => "Symbol",
            ErrorType::Io => "Io",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal error context for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    /// The dump text the error points into.
    pub source: Option<SourceArc>,
    /// Byte range of the offending text.
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Unified error type for every coolast failure mode.
#[derive(Debug, Error)]
pub enum CoolAstError {
    #[error("Lexical error on line {line}: {message}")]
    Lexical {
        message: String,
        offending: String,
        line: LineNumber,
        ctx: ErrorContext,
    },
    #[error("Syntax error on line {line}: unexpected {found}, expected {expected}")]
    Syntax {
        found: String,
        expected: String,
        line: LineNumber,
        ctx: ErrorContext,
    },
    #[error("Schema violation on {kind}: {message}")]
    SchemaViolation { kind: NodeKind, message: String },
    #[error("Type already assigned: expression on line {line} is typed as {current}")]
    TypeAlreadyAssigned { line: LineNumber, current: String },
    #[error("Symbol '{name}' is already defined in the current scope")]
    DuplicateSymbol { name: String },
    #[error("Symbol '{name}' is not defined in the current scope")]
    MissingSymbol { name: String },
    #[error("Cannot leave the global scope")]
    ScopeUnderflow,
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl CoolAstError {
    fn get_ctx(&self) -> Option<&ErrorContext> {
        match self {
            CoolAstError::Lexical { ctx, .. } | CoolAstError::Syntax { ctx, .. } => Some(ctx),
            _ => None,
        }
    }

    /// Returns the type-safe classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            CoolAstError::Lexical { .. } => ErrorType::Lexical,
            CoolAstError::Syntax { .. } => ErrorType::Syntax,
            CoolAstError::SchemaViolation { .. } => ErrorType::Schema,
            CoolAstError::TypeAlreadyAssigned { .. } => ErrorType::Type,
            CoolAstError::DuplicateSymbol { .. }
            | CoolAstError::MissingSymbol { .. }
            | CoolAstError::ScopeUnderflow => ErrorType::Symbol,
            CoolAstError::Io { .. } => ErrorType::Io,
        }
    }

    /// The original-source line the error refers to, when there is one.
    pub fn line(&self) -> Option<LineNumber> {
        match self {
            CoolAstError::Lexical { line, .. }
            | CoolAstError::Syntax { line, .. }
            | CoolAstError::TypeAlreadyAssigned { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl Diagnostic for CoolAstError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self.error_type() {
            ErrorType::Lexical => "coolast::lexical",
            ErrorType::Syntax => "coolast::syntax",
            ErrorType::Schema => "coolast::schema",
            ErrorType::Type => "coolast::type_slot",
            ErrorType::Symbol => "coolast::symbol",
            ErrorType::Io => "coolast::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        if let CoolAstError::SchemaViolation { .. } = self {
            return Some(Box::new(
                "This is an internal parser/model mismatch. Please report it as a bug.",
            ));
        }
        self.get_ctx()?
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()?
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx()?;
        let span = ctx.span?;
        let text = match self {
            CoolAstError::Lexical { message, .. } => message.clone(),
            CoolAstError::Syntax { expected, .. } => format!("expected {expected}"),
            _ => return None,
        };
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(text), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Converts a source string into an `Arc<NamedSource<String>>` for error contexts.
pub fn to_error_source(name: impl AsRef<str>, source: impl AsRef<str>) -> SourceArc {
    Arc::new(NamedSource::new(name.as_ref(), source.as_ref().to_string()))
}

/// Constructs a lexical error.
pub fn lexical_error(
    message: impl Into<String>,
    offending: impl Into<String>,
    line: LineNumber,
    ctx: ErrorContext,
) -> CoolAstError {
    CoolAstError::Lexical {
        message: message.into(),
        offending: offending.into(),
        line,
        ctx,
    }
}

/// Constructs a syntax error naming the unexpected token and what the parser wanted.
pub fn syntax_error(
    found: impl Into<String>,
    expected: impl Into<String>,
    line: LineNumber,
    ctx: ErrorContext,
) -> CoolAstError {
    CoolAstError::Syntax {
        found: found.into(),
        expected: expected.into(),
        line,
        ctx,
    }
}

/// Constructs a schema violation. These indicate engine bugs, not input errors.
pub fn schema_violation(kind: NodeKind, message: impl Into<String>) -> CoolAstError {
    CoolAstError::SchemaViolation {
        kind,
        message: message.into(),
    }
}

/// Constructs an I/O error for the given input path.
pub fn io_error(path: impl std::fmt::Display, err: std::io::Error) -> CoolAstError {
    CoolAstError::Io {
        message: format!("failed to read '{path}': {err}"),
        source: Some(err),
    }
}
