//! Tree traversal.
//!
//! Two styles are offered. [`preorder`] is a plain depth-first iterator over
//! [`NodeRef`]s for passes that only look at nodes one at a time. [`Visitor`]
//! is for passes that need to act on the way in and out of a subtree, such as
//! opening and closing symbol-table scopes: override the `visit_*` methods you
//! care about and call the matching `walk_*` function to recurse.

use crate::ast::{Branch, Class, Expr, ExprKind, Feature, Formal, NodeRef, Program};

// ============================================================================
// PRE-ORDER ITERATOR
// ============================================================================

/// Depth-first, parent-before-children iterator.
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

/// Visits `root` and every node below it, children in schema order.
pub fn preorder<'a>(root: impl Into<NodeRef<'a>>) -> Preorder<'a> {
    Preorder {
        stack: vec![root.into()],
    }
}

// ============================================================================
// VISITOR
// ============================================================================

/// A fallible walk over the typed tree. Every method defaults to a full walk
/// of the node's children.
pub trait Visitor<'a> {
    type Error;

    fn visit_program(&mut self, program: &'a Program) -> Result<(), Self::Error> {
        walk_program(self, program)
    }

    fn visit_class(&mut self, class: &'a Class) -> Result<(), Self::Error> {
        walk_class(self, class)
    }

    fn visit_feature(&mut self, feature: &'a Feature) -> Result<(), Self::Error> {
        walk_feature(self, feature)
    }

    fn visit_formal(&mut self, _formal: &'a Formal) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_branch(&mut self, branch: &'a Branch) -> Result<(), Self::Error> {
        walk_branch(self, branch)
    }

    fn visit_expr(&mut self, expr: &'a Expr) -> Result<(), Self::Error> {
        walk_expr(self, expr)
    }
}

pub fn walk_program<'a, V>(visitor: &mut V, program: &'a Program) -> Result<(), V::Error>
where
    V: Visitor<'a> + ?Sized,
{
    program
        .classes
        .iter()
        .try_for_each(|class| visitor.visit_class(class))
}

pub fn walk_class<'a, V>(visitor: &mut V, class: &'a Class) -> Result<(), V::Error>
where
    V: Visitor<'a> + ?Sized,
{
    class
        .features
        .iter()
        .try_for_each(|feature| visitor.visit_feature(feature))
}

pub fn walk_feature<'a, V>(visitor: &mut V, feature: &'a Feature) -> Result<(), V::Error>
where
    V: Visitor<'a> + ?Sized,
{
    match feature {
        Feature::Attribute(attr) => visitor.visit_expr(&attr.init),
        Feature::Method(method) => {
            for formal in &method.formals {
                visitor.visit_formal(formal)?;
            }
            visitor.visit_expr(&method.body)
        }
    }
}

pub fn walk_branch<'a, V>(visitor: &mut V, branch: &'a Branch) -> Result<(), V::Error>
where
    V: Visitor<'a> + ?Sized,
{
    visitor.visit_expr(&branch.expr)
}

pub fn walk_expr<'a, V>(visitor: &mut V, expr: &'a Expr) -> Result<(), V::Error>
where
    V: Visitor<'a> + ?Sized,
{
    match &expr.kind {
        ExprKind::NoExpr
        | ExprKind::Object { .. }
        | ExprKind::BoolConst { .. }
        | ExprKind::IntConst { .. }
        | ExprKind::StringConst { .. }
        | ExprKind::New { .. } => Ok(()),
        ExprKind::Complement { e1 } | ExprKind::Negate { e1 } | ExprKind::IsVoid { e1 } => {
            visitor.visit_expr(e1)
        }
        ExprKind::LessEq { e1, e2 }
        | ExprKind::Equal { e1, e2 }
        | ExprKind::LessThan { e1, e2 }
        | ExprKind::Divide { e1, e2 }
        | ExprKind::Multiply { e1, e2 }
        | ExprKind::Subtract { e1, e2 }
        | ExprKind::Add { e1, e2 } => {
            visitor.visit_expr(e1)?;
            visitor.visit_expr(e2)
        }
        ExprKind::TypeCase { expr, cases } => {
            visitor.visit_expr(expr)?;
            cases
                .iter()
                .try_for_each(|branch| visitor.visit_branch(branch))
        }
        ExprKind::Let { init, body, .. } => {
            visitor.visit_expr(init)?;
            visitor.visit_expr(body)
        }
        ExprKind::Block { body } => body.iter().try_for_each(|e| visitor.visit_expr(e)),
        ExprKind::Loop { pred, body } => {
            visitor.visit_expr(pred)?;
            visitor.visit_expr(body)
        }
        ExprKind::Conditional {
            pred,
            then_exp,
            else_exp,
        } => {
            visitor.visit_expr(pred)?;
            visitor.visit_expr(then_exp)?;
            visitor.visit_expr(else_exp)
        }
        ExprKind::Dispatch { expr, actual, .. } | ExprKind::StaticDispatch { expr, actual, .. } => {
            visitor.visit_expr(expr)?;
            actual.iter().try_for_each(|e| visitor.visit_expr(e))
        }
        ExprKind::Assign { expr, .. } => visitor.visit_expr(expr),
    }
}
