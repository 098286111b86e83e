//! Cool AST dump parser.
//!
//! Recursive descent with one token of lookahead. The grammar is driven by the
//! per-variant schema in [`crate::ast::schema`]: after the line marker and the
//! keyword, each field is read according to its [`FieldShape`], so adding a
//! variant to the schema is enough for the parser to accept it. The first
//! mismatch aborts the parse; there is no recovery.

use tracing::{debug, trace};

use crate::ast::{
    Branch, Class, Expr, Feature, FieldShape, FieldSpec, FieldValue, Formal, IntLiteral,
    LineNumber, Node, NodeCategory, NodeKind, Program, StaticType,
};
use crate::diagnostics::{syntax_error, CoolAstError, Result};
use crate::syntax::lexer::{Lexer, DEFAULT_SOURCE_NAME};
use crate::syntax::{Span, Token, TokenKind};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a complete dump into a [`Program`].
pub fn parse(source: &str) -> Result<Program> {
    parse_named(source, DEFAULT_SOURCE_NAME)
}

/// Like [`parse`], naming the input `name` in diagnostics.
pub fn parse_named(source: &str, name: &str) -> Result<Program> {
    let mut parser = Parser::new(source, name)?;
    let program = parser.program()?;
    parser.expect_end()?;
    debug!(
        source = name,
        classes = program.classes.len(),
        "parse completed"
    );
    Ok(program)
}

/// Parses a single typed expression, such as the body of a method.
pub fn parse_expression(source: &str) -> Result<Expr> {
    let mut parser = Parser::new(source, DEFAULT_SOURCE_NAME)?;
    let expr = parser.expr()?;
    parser.expect_end()?;
    Ok(expr)
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<Token>,
    /// Span of the most recently consumed token, for end-of-input diagnostics.
    last_span: Span,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, name: &str) -> Result<Self> {
        let mut lexer = Lexer::with_name(source, name);
        let lookahead = lexer.next().transpose()?;
        Ok(Self {
            lexer,
            lookahead,
            last_span: Span::default(),
        })
    }

    // ========================================================================
    // NONTERMINALS
    // ========================================================================

    pub fn program(&mut self) -> Result<Program> {
        self.node(NodeCategory::Program)?.into_program()
    }

    pub fn class(&mut self) -> Result<Class> {
        self.node(NodeCategory::Class)?.into_class()
    }

    pub fn feature(&mut self) -> Result<Feature> {
        self.node(NodeCategory::Feature)?.into_feature()
    }

    pub fn formal(&mut self) -> Result<Formal> {
        self.node(NodeCategory::Formal)?.into_formal()
    }

    pub fn simple_case(&mut self) -> Result<Branch> {
        self.node(NodeCategory::Case)?.into_branch()
    }

    /// `expr_aux ':' (NO_TYPE | ID)`; the annotation fills the type slot.
    pub fn expr(&mut self) -> Result<Expr> {
        self.node(NodeCategory::Expression)?.into_expr()
    }

    /// Fails unless every token has been consumed.
    pub fn expect_end(&mut self) -> Result<()> {
        match self.lookahead {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }

    /// `LINENO KEYWORD field*`, with the fields read in schema order.
    fn node(&mut self, category: NodeCategory) -> Result<Node> {
        let line = self.line_marker(category)?;
        let kind = self.keyword(category)?;
        trace!(%kind, line, "production");

        let values = kind
            .fields()
            .iter()
            .map(|spec| self.field(spec))
            .collect::<Result<Vec<_>>>()?;
        let node = Node::build(kind, line, values)?;

        if let Node::Expr(expr) = &node {
            self.type_annotation(expr)?;
        }
        Ok(node)
    }

    fn field(&mut self, spec: &FieldSpec) -> Result<FieldValue> {
        let value = match spec.shape {
            FieldShape::Symbol => FieldValue::Symbol(self.identifier(spec.name)?),
            FieldShape::Integer => FieldValue::Integer(self.integer()?),
            FieldShape::Boolean => FieldValue::Boolean(self.boolean()?),
            FieldShape::String => FieldValue::String(self.string()?),
            FieldShape::Expr => FieldValue::Expr(self.expr()?),
            FieldShape::Block => FieldValue::Exprs(self.repeated(1, Self::expr)?),
            FieldShape::Actuals => FieldValue::Exprs(self.parenthesized(Self::expr)?),
            FieldShape::Formals => FieldValue::Formals(self.repeated(0, Self::formal)?),
            FieldShape::Features => FieldValue::Features(self.parenthesized(Self::feature)?),
            FieldShape::Cases => FieldValue::Cases(self.repeated(1, Self::simple_case)?),
            FieldShape::Classes => FieldValue::Classes(self.repeated(1, Self::class)?),
        };
        Ok(value)
    }

    /// At least `min` items, then as many more as start with a line marker.
    fn repeated<T>(
        &mut self,
        min: usize,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while items.len() < min || self.at_line_marker() {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// `'(' item* ')'`
    fn parenthesized<T>(&mut self, item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        self.punct(TokenKind::LParen)?;
        let items = self.repeated(0, item)?;
        self.punct(TokenKind::RParen)?;
        Ok(items)
    }

    fn type_annotation(&mut self, expr: &Expr) -> Result<()> {
        self.punct(TokenKind::Colon)?;
        match self.peek() {
            Some(TokenKind::NoType) => {
                self.advance()?;
                Ok(())
            }
            Some(TokenKind::Identifier(_)) => {
                let name = self.identifier("type")?;
                expr.assign_type(StaticType::named(name))
            }
            _ => Err(self.unexpected(format!("a type name or `{}`", crate::ast::NO_TYPE_KEYWORD))),
        }
    }

    // ========================================================================
    // TERMINALS
    // ========================================================================

    fn line_marker(&mut self, category: NodeCategory) -> Result<LineNumber> {
        match self.peek() {
            Some(&TokenKind::LineNumber(line)) => {
                self.advance()?;
                Ok(line)
            }
            _ => Err(self.unexpected(format!(
                "a line number marker starting {}",
                category.describe()
            ))),
        }
    }

    fn keyword(&mut self, category: NodeCategory) -> Result<NodeKind> {
        match self.peek() {
            Some(&TokenKind::Keyword(kind)) if kind.category() == category => {
                self.advance()?;
                Ok(kind)
            }
            _ => Err(self.unexpected(expected_keywords(category))),
        }
    }

    fn identifier(&mut self, what: &str) -> Result<String> {
        match self.advance_if(|kind| matches!(kind, TokenKind::Identifier(_)))? {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => Ok(name),
            _ => Err(self.unexpected(format!("an identifier ({what})"))),
        }
    }

    fn integer(&mut self) -> Result<IntLiteral> {
        match self.advance_if(|kind| matches!(kind, TokenKind::IntConst(_)))? {
            Some(Token {
                kind: TokenKind::IntConst(digits),
                ..
            }) => IntLiteral::new(digits),
            _ => Err(self.unexpected("an integer literal")),
        }
    }

    fn boolean(&mut self) -> Result<bool> {
        let is_flag =
            |kind: &TokenKind| matches!(kind, TokenKind::IntConst(d) if d == "0" || d == "1");
        match self.advance_if(is_flag)? {
            Some(Token {
                kind: TokenKind::IntConst(digits),
                ..
            }) => Ok(digits == "1"),
            _ => Err(self.unexpected("`0` or `1`")),
        }
    }

    fn string(&mut self) -> Result<String> {
        match self.advance_if(|kind| matches!(kind, TokenKind::StrConst(_)))? {
            Some(Token {
                kind: TokenKind::StrConst(value),
                ..
            }) => Ok(value),
            _ => Err(self.unexpected("a string literal")),
        }
    }

    fn punct(&mut self, expected: TokenKind) -> Result<()> {
        match self.advance_if(|kind| *kind == expected)? {
            Some(_) => Ok(()),
            None => Err(self.unexpected(expected.to_string())),
        }
    }

    // ========================================================================
    // TOKEN CURSOR
    // ========================================================================

    fn peek(&self) -> Option<&TokenKind> {
        self.lookahead.as_ref().map(|t| &t.kind)
    }

    fn at_line_marker(&self) -> bool {
        matches!(self.peek(), Some(TokenKind::LineNumber(_)))
    }

    /// Consumes the lookahead and pulls the next token from the lexer.
    fn advance(&mut self) -> Result<Option<Token>> {
        let next = self.lexer.next().transpose()?;
        let current = std::mem::replace(&mut self.lookahead, next);
        if let Some(token) = &current {
            self.last_span = token.span;
        }
        Ok(current)
    }

    fn advance_if(&mut self, pred: impl Fn(&TokenKind) -> bool) -> Result<Option<Token>> {
        if self.peek().is_some_and(pred) {
            self.advance()
        } else {
            Ok(None)
        }
    }

    /// Syntax error at the lookahead, or at end of input.
    fn unexpected(&self, expected: impl Into<String>) -> CoolAstError {
        let (found, line, span) = match &self.lookahead {
            Some(token) => (token.kind.to_string(), token.line, token.span),
            None => ("end of input".to_string(), self.lexer.line(), self.last_span),
        };
        syntax_error(found, expected, line, self.lexer.error_context(span))
    }
}

fn expected_keywords(category: NodeCategory) -> String {
    match category {
        NodeCategory::Expression => "an expression keyword".to_string(),
        other => {
            let keywords: Vec<_> = NodeKind::ALL
                .iter()
                .filter(|kind| kind.category() == other)
                .map(|kind| format!("`{}`", kind.keyword()))
                .collect();
            format!("keyword {}", keywords.join(" or "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprKind;
    use crate::diagnostics::ErrorType;

    #[test]
    fn test_minimal_program() {
        let program = parse("#1 _program #1 _class Main Object \"a.cl\" ( )").unwrap();
        assert_eq!(program.line, 1);
        assert_eq!(program.classes.len(), 1);
        let class = &program.classes[0];
        assert_eq!(class.name, "Main");
        assert_eq!(class.parent, "Object");
        assert_eq!(class.filename, "a.cl");
        assert!(class.features.is_empty());
    }

    #[test]
    fn test_type_annotation_fills_slot() {
        let expr = parse_expression("#4 _int 42 : Int").unwrap();
        assert_eq!(expr.static_type(), &StaticType::named("Int"));
        assert!(matches!(&expr.kind, ExprKind::IntConst { value } if value.as_str() == "42"));

        let untyped = parse_expression("#4 _int 42 : _no_type").unwrap();
        assert!(!untyped.is_typed());
    }

    #[test]
    fn test_integer_literal_beyond_i64_parses() {
        let expr = parse_expression("#1 _int 99999999999999999999 : Int").unwrap();
        match &expr.kind {
            ExprKind::IntConst { value } => {
                assert_eq!(value.as_str(), "99999999999999999999");
                assert_eq!(value.to_i64(), None);
            }
            other => panic!("expected an integer constant, got {other:?}"),
        }
    }

    #[test]
    fn test_class_with_parenthesized_name_is_syntax_error() {
        let err = parse("#1 _class (A) ()").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Syntax);
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_empty_input_is_syntax_error() {
        let err = parse("  \n").unwrap_err();
        match err {
            CoolAstError::Syntax { found, .. } => assert_eq!(found, "end of input"),
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        let err = parse("#1 _program #1 _class A Object \"a.cl\" ( ) )").unwrap_err();
        match err {
            CoolAstError::Syntax {
                found, expected, ..
            } => {
                assert_eq!(found, "`)`");
                assert_eq!(expected, "end of input");
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_bool_accepts_only_zero_or_one() {
        assert!(parse_expression("#2 _bool 1 : Bool").is_ok());
        let err = parse_expression("#2 _bool 2 : Bool").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Syntax);
        let err = parse_expression("#2 _bool 01 : Bool").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Syntax);
    }

    #[test]
    fn test_empty_block_is_rejected() {
        let err = parse_expression("#2 _block : _no_type").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Syntax);
    }

    #[test]
    fn test_missing_annotation_is_rejected() {
        let err = parse_expression("#2 _object x").unwrap_err();
        match err {
            CoolAstError::Syntax { expected, line, .. } => {
                assert_eq!(expected, "`:`");
                assert_eq!(line, 2);
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_feature_keyword_in_expression_position() {
        let err = parse_expression("#2 _attr x Int").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Syntax);
    }

    #[test]
    fn test_lexical_error_surfaces_through_parser() {
        let err = parse("#1 _program #1 _class A Object \"a.cl\" ( ; )").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Lexical);
    }
}
