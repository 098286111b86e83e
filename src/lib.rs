pub use crate::diagnostics::{CoolAstError, ErrorContext, ErrorType, Result};

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod printer;
pub mod symbol_table;
pub mod syntax;
pub mod test_harness;

pub use crate::ast::{
    Attribute, Branch, Class, Expr, ExprKind, Feature, Formal, IntLiteral, Method, NodeKind, NodeRef,
    Program, StaticType,
};
pub use crate::printer::{print, print_with, PrintConfig};
pub use crate::symbol_table::{ScopeGuard, SymbolTable};
pub use crate::syntax::parser::{parse, parse_expression, parse_named};
