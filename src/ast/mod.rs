//! AST module for Cool programs reconstructed from a parse-phase dump.
//!
//! The tree is a set of closed types that downstream passes match on
//! exhaustively. The [`schema`] module describes each variant's ordered fields;
//! [`node`] offers a uniform, name-based view over the same data; [`visit`]
//! provides traversal. A pass receives `&Program`: every structural field is
//! read-only through that borrow, and the only thing it can write is an
//! expression's [`TypeSlot`].
//!
//! # Mutation boundary
//!
//! Fields are public so that passes can destructure nodes with `match`. The
//! read-only guarantee is the borrow, not field privacy: whoever owns the tree
//! or holds `&mut` to it can rebuild nodes, and replacing an [`Expr`] yields a
//! fresh, unset slot. Passes are therefore handed `&Program`.
//!
//! ```compile_fail
//! fn rename(program: &coolast::Program) {
//!     program.classes[0].name.push('X');
//! }
//! ```
//!
//! Through the same shared borrow each type slot accepts exactly one write:
//!
//! ```
//! use coolast::{parse, Program, Result, StaticType};
//!
//! fn annotate(program: &Program) -> Result<()> {
//!     for class in &program.classes {
//!         for attr in class.attributes() {
//!             attr.init.assign_type(StaticType::named(attr.type_decl.as_str()))?;
//!         }
//!     }
//!     Ok(())
//! }
//!
//! let program =
//!     parse("#1 _program #1 _class A Object \"a.cl\" ( #2 _attr n Int #2 _int 007 : _no_type )")
//!         .unwrap();
//! annotate(&program).unwrap();
//! assert!(annotate(&program).is_err());
//! ```

// ============================================================================
// IMPORTS
// ============================================================================

use serde::Serialize;

use crate::diagnostics::{CoolAstError, Result};

pub mod node;
pub mod schema;
pub mod types;
pub mod visit;

pub use node::{Field, FieldValue, Node, NodeRef};
pub use schema::{FieldShape, FieldSpec, NodeCategory, NodeKind, NO_TYPE_KEYWORD};
pub use types::{IntLiteral, StaticType, TypeSlot};

/// Original-source line number, taken from `#<n>` markers.
pub type LineNumber = u32;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Root of the tree. Exclusively owns every class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub line: LineNumber,
    pub classes: Vec<Class>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    pub line: LineNumber,
    pub name: String,
    pub parent: String,
    pub filename: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Feature {
    Attribute(Attribute),
    Method(Method),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub line: LineNumber,
    pub name: String,
    pub type_decl: String,
    pub init: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub line: LineNumber,
    pub name: String,
    pub formals: Vec<Formal>,
    pub return_type: String,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Formal {
    pub line: LineNumber,
    pub name: String,
    pub type_decl: String,
}

/// One arm of a `case` expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub line: LineNumber,
    pub name: String,
    pub type_decl: String,
    pub expr: Expr,
}

/// An expression together with its static-type annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub line: LineNumber,
    pub kind: ExprKind,
    #[serde(rename = "type")]
    ty: TypeSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    NoExpr,
    Object { name: String },
    BoolConst { value: bool },
    IntConst { value: IntLiteral },
    StringConst { value: String },
    Complement { e1: Box<Expr> },
    LessEq { e1: Box<Expr>, e2: Box<Expr> },
    Equal { e1: Box<Expr>, e2: Box<Expr> },
    LessThan { e1: Box<Expr>, e2: Box<Expr> },
    Negate { e1: Box<Expr> },
    Divide { e1: Box<Expr>, e2: Box<Expr> },
    Multiply { e1: Box<Expr>, e2: Box<Expr> },
    Subtract { e1: Box<Expr>, e2: Box<Expr> },
    Add { e1: Box<Expr>, e2: Box<Expr> },
    IsVoid { e1: Box<Expr> },
    New { type_name: String },
    TypeCase { expr: Box<Expr>, cases: Vec<Branch> },
    Let {
        identifier: String,
        type_decl: String,
        init: Box<Expr>,
        body: Box<Expr>,
    },
    Block { body: Vec<Expr> },
    Loop { pred: Box<Expr>, body: Box<Expr> },
    Conditional {
        pred: Box<Expr>,
        then_exp: Box<Expr>,
        else_exp: Box<Expr>,
    },
    Dispatch {
        expr: Box<Expr>,
        name: String,
        actual: Vec<Expr>,
    },
    StaticDispatch {
        expr: Box<Expr>,
        type_name: String,
        name: String,
        actual: Vec<Expr>,
    },
    Assign { name: String, expr: Box<Expr> },
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Program {
    /// Every class name in declaration order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }
}

impl Class {
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.features.iter().filter_map(|f| match f {
            Feature::Attribute(attr) => Some(attr),
            Feature::Method(_) => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.features.iter().filter_map(|f| match f {
            Feature::Method(method) => Some(method),
            Feature::Attribute(_) => None,
        })
    }
}

impl Feature {
    pub fn line(&self) -> LineNumber {
        match self {
            Feature::Attribute(attr) => attr.line,
            Feature::Method(method) => method.line,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Feature::Attribute(attr) => &attr.name,
            Feature::Method(method) => &method.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Feature::Attribute(_) => NodeKind::Attribute,
            Feature::Method(_) => NodeKind::Method,
        }
    }
}

impl Expr {
    /// Builds an expression whose type slot is unset.
    pub fn new(line: LineNumber, kind: ExprKind) -> Self {
        Self {
            line,
            kind,
            ty: TypeSlot::unset(),
        }
    }

    /// The inferred static type, or [`StaticType::NoType`] if none was recorded.
    pub fn static_type(&self) -> &StaticType {
        self.ty.get()
    }

    pub fn is_typed(&self) -> bool {
        self.ty.is_assigned()
    }

    /// Records the static type of this expression. Only the first call
    /// succeeds; later calls fail with `TypeAlreadyAssigned` and leave the slot
    /// unchanged.
    pub fn assign_type(&self, ty: StaticType) -> Result<()> {
        self.ty
            .assign(ty)
            .map_err(|_| CoolAstError::TypeAlreadyAssigned {
                line: self.line,
                current: self.ty.get().to_string(),
            })
    }

    pub fn node_kind(&self) -> NodeKind {
        self.kind.node_kind()
    }
}

impl ExprKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            ExprKind::NoExpr => NodeKind::NoExpr,
            ExprKind::Object { .. } => NodeKind::Object,
            ExprKind::BoolConst { .. } => NodeKind::BoolConst,
            ExprKind::IntConst { .. } => NodeKind::IntConst,
            ExprKind::StringConst { .. } => NodeKind::StringConst,
            ExprKind::Complement { .. } => NodeKind::Complement,
            ExprKind::LessEq { .. } => NodeKind::LessEq,
            ExprKind::Equal { .. } => NodeKind::Equal,
            ExprKind::LessThan { .. } => NodeKind::LessThan,
            ExprKind::Negate { .. } => NodeKind::Negate,
            ExprKind::Divide { .. } => NodeKind::Divide,
            ExprKind::Multiply { .. } => NodeKind::Multiply,
            ExprKind::Subtract { .. } => NodeKind::Subtract,
            ExprKind::Add { .. } => NodeKind::Add,
            ExprKind::IsVoid { .. } => NodeKind::IsVoid,
            ExprKind::New { .. } => NodeKind::New,
            ExprKind::TypeCase { .. } => NodeKind::TypeCase,
            ExprKind::Let { .. } => NodeKind::Let,
            ExprKind::Block { .. } => NodeKind::Block,
            ExprKind::Loop { .. } => NodeKind::Loop,
            ExprKind::Conditional { .. } => NodeKind::Conditional,
            ExprKind::Dispatch { .. } => NodeKind::Dispatch,
            ExprKind::StaticDispatch { .. } => NodeKind::StaticDispatch,
            ExprKind::Assign { .. } => NodeKind::Assign,
        }
    }
}
