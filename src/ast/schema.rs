//! Per-variant field schema.
//!
//! Every node variant has a fixed, ordered list of named fields. The order is
//! the order in which fields appear in the dump format, so the parser reads
//! them and the printer writes them by walking the same table.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Keyword that spells the unset static type.
pub const NO_TYPE_KEYWORD: &str = "_no_type";

/// Variant tag for every node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Program,
    Class,
    Attribute,
    Method,
    Formal,
    Branch,
    NoExpr,
    Object,
    BoolConst,
    IntConst,
    StringConst,
    Complement,
    LessEq,
    Equal,
    LessThan,
    Negate,
    Divide,
    Multiply,
    Subtract,
    Add,
    IsVoid,
    New,
    TypeCase,
    Let,
    Block,
    Loop,
    Conditional,
    Dispatch,
    StaticDispatch,
    Assign,
}

/// Which nonterminal a node variant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeCategory {
    Program,
    Class,
    Feature,
    Formal,
    Case,
    Expression,
}

impl NodeCategory {
    /// Article plus name, for "expected ..." messages.
    pub fn describe(self) -> &'static str {
        match self {
            NodeCategory::Program => "a program",
            NodeCategory::Class => "a class",
            NodeCategory::Feature => "a feature",
            NodeCategory::Formal => "a formal",
            NodeCategory::Case => "a case branch",
            NodeCategory::Expression => "an expression",
        }
    }
}

/// How a field is spelled in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldShape {
    /// Bare identifier or type name.
    Symbol,
    Integer,
    /// `0` or `1`.
    Boolean,
    /// Double-quoted, escaped string.
    String,
    Expr,
    /// One or more expressions, no delimiters.
    Block,
    /// `(` zero or more expressions `)`.
    Actuals,
    /// Zero or more formals, no delimiters.
    Formals,
    /// `(` zero or more features `)`.
    Features,
    /// One or more case branches.
    Cases,
    /// One or more classes.
    Classes,
}

impl FieldShape {
    /// Sequences printed between bracket lines.
    pub fn is_parenthesized(self) -> bool {
        matches!(self, FieldShape::Actuals | FieldShape::Features)
    }

    /// Fewest elements the grammar allows for a sequence field.
    pub fn min_len(self) -> usize {
        match self {
            FieldShape::Block | FieldShape::Cases | FieldShape::Classes => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: FieldShape,
}

const fn field(name: &'static str, shape: FieldShape) -> FieldSpec {
    FieldSpec { name, shape }
}

const PROGRAM: &[FieldSpec] = &[field("classes", FieldShape::Classes)];
const CLASS: &[FieldSpec] = &[
    field("name", FieldShape::Symbol),
    field("parent", FieldShape::Symbol),
    field("filename", FieldShape::String),
    field("features", FieldShape::Features),
];
const ATTRIBUTE: &[FieldSpec] = &[
    field("name", FieldShape::Symbol),
    field("type_decl", FieldShape::Symbol),
    field("init", FieldShape::Expr),
];
const METHOD: &[FieldSpec] = &[
    field("name", FieldShape::Symbol),
    field("formals", FieldShape::Formals),
    field("return_type", FieldShape::Symbol),
    field("body", FieldShape::Expr),
];
const FORMAL: &[FieldSpec] = &[
    field("name", FieldShape::Symbol),
    field("type_decl", FieldShape::Symbol),
];
const BRANCH: &[FieldSpec] = &[
    field("name", FieldShape::Symbol),
    field("type_decl", FieldShape::Symbol),
    field("expr", FieldShape::Expr),
];
const NONE: &[FieldSpec] = &[];
const NAME: &[FieldSpec] = &[field("name", FieldShape::Symbol)];
const BOOL_VALUE: &[FieldSpec] = &[field("value", FieldShape::Boolean)];
const INT_VALUE: &[FieldSpec] = &[field("value", FieldShape::Integer)];
const STRING_VALUE: &[FieldSpec] = &[field("value", FieldShape::String)];
const UNARY: &[FieldSpec] = &[field("e1", FieldShape::Expr)];
const BINARY: &[FieldSpec] = &[field("e1", FieldShape::Expr), field("e2", FieldShape::Expr)];
const NEW: &[FieldSpec] = &[field("type_name", FieldShape::Symbol)];
const TYPE_CASE: &[FieldSpec] = &[
    field("expr", FieldShape::Expr),
    field("cases", FieldShape::Cases),
];
const LET: &[FieldSpec] = &[
    field("identifier", FieldShape::Symbol),
    field("type_decl", FieldShape::Symbol),
    field("init", FieldShape::Expr),
    field("body", FieldShape::Expr),
];
const BLOCK: &[FieldSpec] = &[field("body", FieldShape::Block)];
const LOOP: &[FieldSpec] = &[
    field("pred", FieldShape::Expr),
    field("body", FieldShape::Expr),
];
const CONDITIONAL: &[FieldSpec] = &[
    field("pred", FieldShape::Expr),
    field("then_exp", FieldShape::Expr),
    field("else_exp", FieldShape::Expr),
];
const DISPATCH: &[FieldSpec] = &[
    field("expr", FieldShape::Expr),
    field("name", FieldShape::Symbol),
    field("actual", FieldShape::Actuals),
];
const STATIC_DISPATCH: &[FieldSpec] = &[
    field("expr", FieldShape::Expr),
    field("type_name", FieldShape::Symbol),
    field("name", FieldShape::Symbol),
    field("actual", FieldShape::Actuals),
];
const ASSIGN: &[FieldSpec] = &[
    field("name", FieldShape::Symbol),
    field("expr", FieldShape::Expr),
];

static KEYWORDS: Lazy<HashMap<&'static str, NodeKind>> =
    Lazy::new(|| NodeKind::ALL.iter().map(|k| (k.keyword(), *k)).collect());

impl NodeKind {
    pub const ALL: [NodeKind; 30] = [
        NodeKind::Program,
        NodeKind::Class,
        NodeKind::Attribute,
        NodeKind::Method,
        NodeKind::Formal,
        NodeKind::Branch,
        NodeKind::NoExpr,
        NodeKind::Object,
        NodeKind::BoolConst,
        NodeKind::IntConst,
        NodeKind::StringConst,
        NodeKind::Complement,
        NodeKind::LessEq,
        NodeKind::Equal,
        NodeKind::LessThan,
        NodeKind::Negate,
        NodeKind::Divide,
        NodeKind::Multiply,
        NodeKind::Subtract,
        NodeKind::Add,
        NodeKind::IsVoid,
        NodeKind::New,
        NodeKind::TypeCase,
        NodeKind::Let,
        NodeKind::Block,
        NodeKind::Loop,
        NodeKind::Conditional,
        NodeKind::Dispatch,
        NodeKind::StaticDispatch,
        NodeKind::Assign,
    ];

    /// The reserved word that introduces this variant in the dump.
    pub fn keyword(self) -> &'static str {
        match self {
            NodeKind::Program => "_program",
            NodeKind::Class => "_class",
            NodeKind::Attribute => "_attr",
            NodeKind::Method => "_method",
            NodeKind::Formal => "_formal",
            NodeKind::Branch => "_branch",
            NodeKind::NoExpr => "_no_expr",
            NodeKind::Object => "_object",
            NodeKind::BoolConst => "_bool",
            NodeKind::IntConst => "_int",
            NodeKind::StringConst => "_string",
            NodeKind::Complement => "_comp",
            NodeKind::LessEq => "_leq",
            NodeKind::Equal => "_eq",
            NodeKind::LessThan => "_lt",
            NodeKind::Negate => "_neg",
            NodeKind::Divide => "_divide",
            NodeKind::Multiply => "_mul",
            NodeKind::Subtract => "_sub",
            NodeKind::Add => "_plus",
            NodeKind::IsVoid => "_isvoid",
            NodeKind::New => "_new",
            NodeKind::TypeCase => "_typcase",
            NodeKind::Let => "_let",
            NodeKind::Block => "_block",
            NodeKind::Loop => "_loop",
            NodeKind::Conditional => "_cond",
            NodeKind::Dispatch => "_dispatch",
            NodeKind::StaticDispatch => "_static_dispatch",
            NodeKind::Assign => "_assign",
        }
    }

    /// Case-sensitive reserved-word lookup.
    pub fn from_keyword(word: &str) -> Option<NodeKind> {
        KEYWORDS.get(word).copied()
    }

    pub fn category(self) -> NodeCategory {
        match self {
            NodeKind::Program => NodeCategory::Program,
            NodeKind::Class => NodeCategory::Class,
            NodeKind::Attribute | NodeKind::Method => NodeCategory::Feature,
            NodeKind::Formal => NodeCategory::Formal,
            NodeKind::Branch => NodeCategory::Case,
            _ => NodeCategory::Expression,
        }
    }

    /// Ordered field schema of this variant.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            NodeKind::Program => PROGRAM,
            NodeKind::Class => CLASS,
            NodeKind::Attribute => ATTRIBUTE,
            NodeKind::Method => METHOD,
            NodeKind::Formal => FORMAL,
            NodeKind::Branch => BRANCH,
            NodeKind::NoExpr => NONE,
            NodeKind::Object => NAME,
            NodeKind::BoolConst => BOOL_VALUE,
            NodeKind::IntConst => INT_VALUE,
            NodeKind::StringConst => STRING_VALUE,
            NodeKind::Complement | NodeKind::Negate | NodeKind::IsVoid => UNARY,
            NodeKind::LessEq
            | NodeKind::Equal
            | NodeKind::LessThan
            | NodeKind::Divide
            | NodeKind::Multiply
            | NodeKind::Subtract
            | NodeKind::Add => BINARY,
            NodeKind::New => NEW,
            NodeKind::TypeCase => TYPE_CASE,
            NodeKind::Let => LET,
            NodeKind::Block => BLOCK,
            NodeKind::Loop => LOOP,
            NodeKind::Conditional => CONDITIONAL,
            NodeKind::Dispatch => DISPATCH,
            NodeKind::StaticDispatch => STATIC_DISPATCH,
            NodeKind::Assign => ASSIGN,
        }
    }

    /// Position of `name` in this variant's schema.
    pub fn field_index(self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
