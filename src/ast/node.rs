//! Uniform views over the typed tree.
//!
//! [`NodeRef`] borrows any node and answers schema questions about it (kind,
//! line, named fields, children) without the caller matching on every
//! variant. [`Node`] and [`FieldValue`] go the other way: they assemble a typed
//! node from a variant tag and its ordered field values, which is how the
//! parser builds the tree.

use crate::ast::{
    Attribute, Branch, Class, Expr, ExprKind, Feature, FieldShape, FieldSpec, Formal, IntLiteral,
    LineNumber, Method, NodeKind, Program, StaticType,
};
use crate::diagnostics::{schema_violation, Result};

// ============================================================================
// BORROWED VIEW
// ============================================================================

/// A borrowed reference to any node in the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Class(&'a Class),
    Feature(&'a Feature),
    Formal(&'a Formal),
    Branch(&'a Branch),
    Expr(&'a Expr),
}

/// The value of one schema field, borrowed from its node.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<'a> {
    Symbol(&'a str),
    Integer(&'a IntLiteral),
    Boolean(bool),
    String(&'a str),
    Node(NodeRef<'a>),
    Nodes(Vec<NodeRef<'a>>),
}

impl<'a> NodeRef<'a> {
    pub fn kind(self) -> NodeKind {
        match self {
            NodeRef::Program(_) => NodeKind::Program,
            NodeRef::Class(_) => NodeKind::Class,
            NodeRef::Feature(feature) => feature.kind(),
            NodeRef::Formal(_) => NodeKind::Formal,
            NodeRef::Branch(_) => NodeKind::Branch,
            NodeRef::Expr(expr) => expr.node_kind(),
        }
    }

    pub fn line(self) -> LineNumber {
        match self {
            NodeRef::Program(program) => program.line,
            NodeRef::Class(class) => class.line,
            NodeRef::Feature(feature) => feature.line(),
            NodeRef::Formal(formal) => formal.line,
            NodeRef::Branch(branch) => branch.line,
            NodeRef::Expr(expr) => expr.line,
        }
    }

    /// The type slot's contents for expressions, `None` for every other node.
    pub fn static_type(self) -> Option<&'a StaticType> {
        match self {
            NodeRef::Expr(expr) => Some(expr.static_type()),
            _ => None,
        }
    }

    /// Every field paired with its schema entry, in schema order.
    pub fn fields(self) -> Vec<(&'static FieldSpec, Field<'a>)> {
        self.kind()
            .fields()
            .iter()
            .zip(self.field_values())
            .collect()
    }

    /// Looks a field up by its schema name.
    pub fn field(self, name: &str) -> Result<Field<'a>> {
        let kind = self.kind();
        let index = kind
            .field_index(name)
            .ok_or_else(|| schema_violation(kind, format!("no field named '{name}'")))?;
        self.field_values()
            .into_iter()
            .nth(index)
            .ok_or_else(|| schema_violation(kind, format!("field '{name}' has no value")))
    }

    /// Direct child nodes in schema order, sequences flattened in place.
    pub fn children(self) -> Vec<NodeRef<'a>> {
        let mut children = Vec::new();
        for value in self.field_values() {
            match value {
                Field::Node(child) => children.push(child),
                Field::Nodes(nodes) => children.extend(nodes),
                _ => {}
            }
        }
        children
    }

    fn field_values(self) -> Vec<Field<'a>> {
        match self {
            NodeRef::Program(program) => vec![nodes(&program.classes)],
            NodeRef::Class(class) => vec![
                Field::Symbol(&class.name),
                Field::Symbol(&class.parent),
                Field::String(&class.filename),
                nodes(&class.features),
            ],
            NodeRef::Feature(Feature::Attribute(attr)) => vec![
                Field::Symbol(&attr.name),
                Field::Symbol(&attr.type_decl),
                node(&attr.init),
            ],
            NodeRef::Feature(Feature::Method(method)) => vec![
                Field::Symbol(&method.name),
                nodes(&method.formals),
                Field::Symbol(&method.return_type),
                node(&method.body),
            ],
            NodeRef::Formal(formal) => vec![
                Field::Symbol(&formal.name),
                Field::Symbol(&formal.type_decl),
            ],
            NodeRef::Branch(branch) => vec![
                Field::Symbol(&branch.name),
                Field::Symbol(&branch.type_decl),
                node(&branch.expr),
            ],
            NodeRef::Expr(expr) => expr_field_values(&expr.kind),
        }
    }
}

fn expr_field_values(kind: &ExprKind) -> Vec<Field<'_>> {
    match kind {
        ExprKind::NoExpr => vec![],
        ExprKind::Object { name } => vec![Field::Symbol(name)],
        ExprKind::BoolConst { value } => vec![Field::Boolean(*value)],
        ExprKind::IntConst { value } => vec![Field::Integer(value)],
        ExprKind::StringConst { value } => vec![Field::String(value)],
        ExprKind::Complement { e1 } | ExprKind::Negate { e1 } | ExprKind::IsVoid { e1 } => {
            vec![node(&**e1)]
        }
        ExprKind::LessEq { e1, e2 }
        | ExprKind::Equal { e1, e2 }
        | ExprKind::LessThan { e1, e2 }
        | ExprKind::Divide { e1, e2 }
        | ExprKind::Multiply { e1, e2 }
        | ExprKind::Subtract { e1, e2 }
        | ExprKind::Add { e1, e2 } => vec![node(&**e1), node(&**e2)],
        ExprKind::New { type_name } => vec![Field::Symbol(type_name)],
        ExprKind::TypeCase { expr, cases } => vec![node(&**expr), nodes(cases)],
        ExprKind::Let {
            identifier,
            type_decl,
            init,
            body,
        } => vec![
            Field::Symbol(identifier),
            Field::Symbol(type_decl),
            node(&**init),
            node(&**body),
        ],
        ExprKind::Block { body } => vec![nodes(body)],
        ExprKind::Loop { pred, body } => vec![node(&**pred), node(&**body)],
        ExprKind::Conditional {
            pred,
            then_exp,
            else_exp,
        } => vec![
            node(&**pred),
            node(&**then_exp),
            node(&**else_exp),
        ],
        ExprKind::Dispatch { expr, name, actual } => {
            vec![node(&**expr), Field::Symbol(name), nodes(actual)]
        }
        ExprKind::StaticDispatch {
            expr,
            type_name,
            name,
            actual,
        } => vec![
            node(&**expr),
            Field::Symbol(type_name),
            Field::Symbol(name),
            nodes(actual),
        ],
        ExprKind::Assign { name, expr } => vec![Field::Symbol(name), node(&**expr)],
    }
}

fn node<'a, T>(value: &'a T) -> Field<'a>
where
    &'a T: Into<NodeRef<'a>>,
{
    Field::Node(value.into())
}

fn nodes<'a, T>(values: &'a [T]) -> Field<'a>
where
    &'a T: Into<NodeRef<'a>>,
{
    Field::Nodes(values.iter().map(Into::into).collect())
}

macro_rules! node_ref_from {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for NodeRef<'a> {
                fn from(value: &'a $ty) -> Self {
                    NodeRef::$ty(value)
                }
            }
        )*
    };
}

node_ref_from!(Program, Class, Feature, Formal, Branch, Expr);

// ============================================================================
// OWNED CONSTRUCTION
// ============================================================================

/// An owned field value handed to [`Node::build`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Symbol(String),
    Integer(IntLiteral),
    Boolean(bool),
    String(String),
    Expr(Expr),
    /// Elements of a block body or of dispatch actuals.
    Exprs(Vec<Expr>),
    Formals(Vec<Formal>),
    Features(Vec<Feature>),
    Cases(Vec<Branch>),
    Classes(Vec<Class>),
}

impl FieldValue {
    /// Whether this value may fill a field of the given shape.
    pub fn fits(&self, shape: FieldShape) -> bool {
        matches!(
            (self, shape),
            (FieldValue::Symbol(_), FieldShape::Symbol)
                | (FieldValue::Integer(_), FieldShape::Integer)
                | (FieldValue::Boolean(_), FieldShape::Boolean)
                | (FieldValue::String(_), FieldShape::String)
                | (FieldValue::Expr(_), FieldShape::Expr)
                | (FieldValue::Exprs(_), FieldShape::Block | FieldShape::Actuals)
                | (FieldValue::Formals(_), FieldShape::Formals)
                | (FieldValue::Features(_), FieldShape::Features)
                | (FieldValue::Cases(_), FieldShape::Cases)
                | (FieldValue::Classes(_), FieldShape::Classes)
        )
    }

    /// Element count for sequence values.
    pub fn len(&self) -> Option<usize> {
        match self {
            FieldValue::Exprs(v) => Some(v.len()),
            FieldValue::Formals(v) => Some(v.len()),
            FieldValue::Features(v) => Some(v.len()),
            FieldValue::Cases(v) => Some(v.len()),
            FieldValue::Classes(v) => Some(v.len()),
            _ => None,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldValue::Symbol(_) => "a symbol",
            FieldValue::Integer(_) => "an integer",
            FieldValue::Boolean(_) => "a boolean",
            FieldValue::String(_) => "a string",
            FieldValue::Expr(_) => "an expression",
            FieldValue::Exprs(_) => "a list of expressions",
            FieldValue::Formals(_) => "a list of formals",
            FieldValue::Features(_) => "a list of features",
            FieldValue::Cases(_) => "a list of case branches",
            FieldValue::Classes(_) => "a list of classes",
        }
    }
}

/// An owned node of any category.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program(Program),
    Class(Class),
    Feature(Feature),
    Formal(Formal),
    Branch(Branch),
    Expr(Expr),
}

impl Node {
    /// Builds a node of `kind` from its field values in schema order.
    ///
    /// Fails with `SchemaViolation` if the number of values differs from the
    /// schema, if a value does not fit its field's shape, or if a sequence is
    /// shorter than its shape allows. Expressions start with an unset type slot.
    pub fn build(kind: NodeKind, line: LineNumber, values: Vec<FieldValue>) -> Result<Node> {
        let mut r = FieldReader::new(kind, values)?;
        let node = match kind {
            NodeKind::Program => Node::Program(Program {
                line,
                classes: r.classes()?,
            }),
            NodeKind::Class => Node::Class(Class {
                line,
                name: r.symbol()?,
                parent: r.symbol()?,
                filename: r.string()?,
                features: r.features()?,
            }),
            NodeKind::Attribute => Node::Feature(Feature::Attribute(Attribute {
                line,
                name: r.symbol()?,
                type_decl: r.symbol()?,
                init: r.expr()?,
            })),
            NodeKind::Method => Node::Feature(Feature::Method(Method {
                line,
                name: r.symbol()?,
                formals: r.formals()?,
                return_type: r.symbol()?,
                body: r.expr()?,
            })),
            NodeKind::Formal => Node::Formal(Formal {
                line,
                name: r.symbol()?,
                type_decl: r.symbol()?,
            }),
            NodeKind::Branch => Node::Branch(Branch {
                line,
                name: r.symbol()?,
                type_decl: r.symbol()?,
                expr: r.expr()?,
            }),
            _ => Node::Expr(Expr::new(line, build_expr_kind(kind, &mut r)?)),
        };
        Ok(node)
    }

    pub fn kind(&self) -> NodeKind {
        self.view().kind()
    }

    pub fn view(&self) -> NodeRef<'_> {
        match self {
            Node::Program(program) => NodeRef::Program(program),
            Node::Class(class) => NodeRef::Class(class),
            Node::Feature(feature) => NodeRef::Feature(feature),
            Node::Formal(formal) => NodeRef::Formal(formal),
            Node::Branch(branch) => NodeRef::Branch(branch),
            Node::Expr(expr) => NodeRef::Expr(expr),
        }
    }

    pub fn into_program(self) -> Result<Program> {
        match self {
            Node::Program(program) => Ok(program),
            other => Err(wrong_category(other.kind(), "a program")),
        }
    }

    pub fn into_class(self) -> Result<Class> {
        match self {
            Node::Class(class) => Ok(class),
            other => Err(wrong_category(other.kind(), "a class")),
        }
    }

    pub fn into_feature(self) -> Result<Feature> {
        match self {
            Node::Feature(feature) => Ok(feature),
            other => Err(wrong_category(other.kind(), "a feature")),
        }
    }

    pub fn into_formal(self) -> Result<Formal> {
        match self {
            Node::Formal(formal) => Ok(formal),
            other => Err(wrong_category(other.kind(), "a formal")),
        }
    }

    pub fn into_branch(self) -> Result<Branch> {
        match self {
            Node::Branch(branch) => Ok(branch),
            other => Err(wrong_category(other.kind(), "a case branch")),
        }
    }

    pub fn into_expr(self) -> Result<Expr> {
        match self {
            Node::Expr(expr) => Ok(expr),
            other => Err(wrong_category(other.kind(), "an expression")),
        }
    }
}

fn wrong_category(kind: NodeKind, wanted: &str) -> crate::CoolAstError {
    schema_violation(kind, format!("node is not {wanted}"))
}

fn build_expr_kind(kind: NodeKind, r: &mut FieldReader) -> Result<ExprKind> {
    let expr = match kind {
        NodeKind::NoExpr => ExprKind::NoExpr,
        NodeKind::Object => ExprKind::Object { name: r.symbol()? },
        NodeKind::BoolConst => ExprKind::BoolConst {
            value: r.boolean()?,
        },
        NodeKind::IntConst => ExprKind::IntConst {
            value: r.integer()?,
        },
        NodeKind::StringConst => ExprKind::StringConst { value: r.string()? },
        NodeKind::Complement => ExprKind::Complement { e1: r.boxed()? },
        NodeKind::Negate => ExprKind::Negate { e1: r.boxed()? },
        NodeKind::IsVoid => ExprKind::IsVoid { e1: r.boxed()? },
        NodeKind::LessEq => ExprKind::LessEq {
            e1: r.boxed()?,
            e2: r.boxed()?,
        },
        NodeKind::Equal => ExprKind::Equal {
            e1: r.boxed()?,
            e2: r.boxed()?,
        },
        NodeKind::LessThan => ExprKind::LessThan {
            e1: r.boxed()?,
            e2: r.boxed()?,
        },
        NodeKind::Divide => ExprKind::Divide {
            e1: r.boxed()?,
            e2: r.boxed()?,
        },
        NodeKind::Multiply => ExprKind::Multiply {
            e1: r.boxed()?,
            e2: r.boxed()?,
        },
        NodeKind::Subtract => ExprKind::Subtract {
            e1: r.boxed()?,
            e2: r.boxed()?,
        },
        NodeKind::Add => ExprKind::Add {
            e1: r.boxed()?,
            e2: r.boxed()?,
        },
        NodeKind::New => ExprKind::New {
            type_name: r.symbol()?,
        },
        NodeKind::TypeCase => ExprKind::TypeCase {
            expr: r.boxed()?,
            cases: r.cases()?,
        },
        NodeKind::Let => ExprKind::Let {
            identifier: r.symbol()?,
            type_decl: r.symbol()?,
            init: r.boxed()?,
            body: r.boxed()?,
        },
        NodeKind::Block => ExprKind::Block { body: r.exprs()? },
        NodeKind::Loop => ExprKind::Loop {
            pred: r.boxed()?,
            body: r.boxed()?,
        },
        NodeKind::Conditional => ExprKind::Conditional {
            pred: r.boxed()?,
            then_exp: r.boxed()?,
            else_exp: r.boxed()?,
        },
        NodeKind::Dispatch => ExprKind::Dispatch {
            expr: r.boxed()?,
            name: r.symbol()?,
            actual: r.exprs()?,
        },
        NodeKind::StaticDispatch => ExprKind::StaticDispatch {
            expr: r.boxed()?,
            type_name: r.symbol()?,
            name: r.symbol()?,
            actual: r.exprs()?,
        },
        NodeKind::Assign => ExprKind::Assign {
            name: r.symbol()?,
            expr: r.boxed()?,
        },
        other => return Err(schema_violation(other, "not an expression variant")),
    };
    Ok(expr)
}

/// Hands out field values in schema order, checking each against its spec.
struct FieldReader {
    kind: NodeKind,
    specs: std::slice::Iter<'static, FieldSpec>,
    values: std::vec::IntoIter<FieldValue>,
}

impl FieldReader {
    fn new(kind: NodeKind, values: Vec<FieldValue>) -> Result<Self> {
        let specs = kind.fields();
        if values.len() != specs.len() {
            return Err(schema_violation(
                kind,
                format!(
                    "expected {} field value(s), got {}",
                    specs.len(),
                    values.len()
                ),
            ));
        }
        Ok(Self {
            kind,
            specs: specs.iter(),
            values: values.into_iter(),
        })
    }

    fn take(&mut self) -> Result<FieldValue> {
        let (Some(spec), Some(value)) = (self.specs.next(), self.values.next()) else {
            return Err(schema_violation(self.kind, "ran out of field values"));
        };
        if !value.fits(spec.shape) {
            return Err(schema_violation(
                self.kind,
                format!(
                    "field '{}' expects {:?}, got {}",
                    spec.name,
                    spec.shape,
                    value.describe()
                ),
            ));
        }
        let min = spec.shape.min_len();
        if value.len().is_some_and(|len| len < min) {
            return Err(schema_violation(
                self.kind,
                format!("field '{}' needs at least {min} element(s)", spec.name),
            ));
        }
        Ok(value)
    }

    fn mismatch(&self, value: &FieldValue) -> crate::CoolAstError {
        schema_violation(self.kind, format!("unexpected {}", value.describe()))
    }

    fn symbol(&mut self) -> Result<String> {
        match self.take()? {
            FieldValue::Symbol(s) => Ok(s),
            other => Err(self.mismatch(&other)),
        }
    }

    fn string(&mut self) -> Result<String> {
        match self.take()? {
            FieldValue::String(s) => Ok(s),
            other => Err(self.mismatch(&other)),
        }
    }

    fn integer(&mut self) -> Result<IntLiteral> {
        match self.take()? {
            FieldValue::Integer(n) => Ok(n),
            other => Err(self.mismatch(&other)),
        }
    }

    fn boolean(&mut self) -> Result<bool> {
        match self.take()? {
            FieldValue::Boolean(b) => Ok(b),
            other => Err(self.mismatch(&other)),
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        match self.take()? {
            FieldValue::Expr(e) => Ok(e),
            other => Err(self.mismatch(&other)),
        }
    }

    fn boxed(&mut self) -> Result<Box<Expr>> {
        self.expr().map(Box::new)
    }

    fn exprs(&mut self) -> Result<Vec<Expr>> {
        match self.take()? {
            FieldValue::Exprs(v) => Ok(v),
            other => Err(self.mismatch(&other)),
        }
    }

    fn formals(&mut self) -> Result<Vec<Formal>> {
        match self.take()? {
            FieldValue::Formals(v) => Ok(v),
            other => Err(self.mismatch(&other)),
        }
    }

    fn features(&mut self) -> Result<Vec<Feature>> {
        match self.take()? {
            FieldValue::Features(v) => Ok(v),
            other => Err(self.mismatch(&other)),
        }
    }

    fn cases(&mut self) -> Result<Vec<Branch>> {
        match self.take()? {
            FieldValue::Cases(v) => Ok(v),
            other => Err(self.mismatch(&other)),
        }
    }

    fn classes(&mut self) -> Result<Vec<Class>> {
        match self.take()? {
            FieldValue::Classes(v) => Ok(v),
            other => Err(self.mismatch(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CoolAstError, ErrorType};

    fn int(line: LineNumber, value: u64) -> Expr {
        Expr::new(
            line,
            ExprKind::IntConst {
                value: value.into(),
            },
        )
    }

    #[test]
    fn test_build_binary_expression() {
        let node = Node::build(
            NodeKind::Add,
            5,
            vec![FieldValue::Expr(int(5, 1)), FieldValue::Expr(int(5, 2))],
        )
        .unwrap();
        let expr = node.into_expr().unwrap();
        assert_eq!(expr.node_kind(), NodeKind::Add);
        assert_eq!(expr.line, 5);
        assert!(!expr.is_typed());
    }

    #[test]
    fn test_build_rejects_wrong_arity() {
        let err = Node::build(NodeKind::Add, 5, vec![FieldValue::Expr(int(5, 1))]).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Schema);
    }

    #[test]
    fn test_build_rejects_wrong_shape() {
        let err = Node::build(
            NodeKind::Object,
            1,
            vec![FieldValue::String("x".into())],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoolAstError::SchemaViolation {
                kind: NodeKind::Object,
                ..
            }
        ));
    }

    #[test]
    fn test_build_rejects_empty_block() {
        let err = Node::build(NodeKind::Block, 1, vec![FieldValue::Exprs(vec![])]).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Schema);

        let dispatch = Node::build(
            NodeKind::Dispatch,
            1,
            vec![
                FieldValue::Expr(Expr::new(1, ExprKind::Object { name: "self".into() })),
                FieldValue::Symbol("f".into()),
                FieldValue::Exprs(vec![]),
            ],
        );
        assert!(dispatch.is_ok());
    }

    #[test]
    fn test_named_field_access() {
        let formal = Formal {
            line: 2,
            name: "n".into(),
            type_decl: "Int".into(),
        };
        let view = NodeRef::from(&formal);
        assert_eq!(view.field("type_decl").unwrap(), Field::Symbol("Int"));
        assert_eq!(view.static_type(), None);

        let err = view.field("init").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Schema);
    }

    #[test]
    fn test_children_follow_schema_order() {
        let cond = Expr::new(
            3,
            ExprKind::Conditional {
                pred: Box::new(Expr::new(3, ExprKind::BoolConst { value: true })),
                then_exp: Box::new(int(4, 1)),
                else_exp: Box::new(int(5, 2)),
            },
        );
        let lines: Vec<_> = NodeRef::from(&cond)
            .children()
            .into_iter()
            .map(|c| c.line())
            .collect();
        assert_eq!(lines, [3, 4, 5]);

        let names: Vec<_> = NodeRef::from(&cond)
            .fields()
            .into_iter()
            .map(|(spec, _)| spec.name)
            .collect();
        assert_eq!(names, ["pred", "then_exp", "else_exp"]);
    }

    #[test]
    fn test_into_wrong_category_is_schema_violation() {
        let node = Node::Expr(int(1, 0));
        assert_eq!(node.into_class().unwrap_err().error_type(), ErrorType::Schema);
    }
}
