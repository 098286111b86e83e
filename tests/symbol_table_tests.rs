// tests/symbol_table_tests.rs

use coolast::ast::visit::{walk_class, walk_expr, walk_feature, Visitor};
use coolast::ast::{Branch, Class, Expr, ExprKind, Feature, LineNumber};
use coolast::{parse, CoolAstError, ErrorType, Result, SymbolTable};

const ALL_KINDS: &str = include_str!("fixtures/all_kinds.ast");

#[test]
fn test_inner_binding_shadows_outer() {
    let mut table = SymbolTable::new();
    table.add("x", 1).unwrap();
    table.enter_scope();
    table.add("x", 2).unwrap();
    assert_eq!(table.find("x"), Some(&2));
    table.leave_scope().unwrap();
    assert_eq!(table.find("x"), Some(&1));
}

#[test]
fn test_duplicate_in_same_scope_keeps_original() {
    let mut table = SymbolTable::new();
    table.add("x", "first").unwrap();
    let err = table.add("x", "second").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Symbol);
    assert_eq!(table.find("x"), Some(&"first"));
    assert_eq!(table.check_scope("x"), Some(&"first"));
}

#[test]
fn test_missing_lookups() {
    let mut table: SymbolTable<i32> = SymbolTable::new();
    assert_eq!(table.find("nope"), None);
    assert!(matches!(
        table.remove("nope"),
        Err(CoolAstError::MissingSymbol { .. })
    ));
}

/// Opens one scope per level, shadowing `x` each time, and fails at `fail_at`.
fn descend(table: &mut SymbolTable<usize>, level: usize, fail_at: Option<usize>) -> Result<()> {
    table.with_scope(|t| {
        t.add("x", level)?;
        assert_eq!(t.find("x"), Some(&level));
        assert_eq!(t.depth(), level);
        if Some(level) == fail_at {
            return Err(CoolAstError::MissingSymbol {
                name: format!("level{level}"),
            });
        }
        if level < 10 {
            descend(t, level + 1, fail_at)?;
        }
        assert_eq!(t.find("x"), Some(&level));
        Ok(())
    })
}

#[test]
fn test_ten_nested_scopes_restore_fully() {
    let mut table = SymbolTable::new();
    table.add("x", 0).unwrap();

    descend(&mut table, 1, None).unwrap();
    assert_eq!(table.depth(), 0);
    assert_eq!(table.find("x"), Some(&0));

    let err = descend(&mut table, 1, Some(6)).unwrap_err();
    assert!(matches!(err, CoolAstError::MissingSymbol { ref name } if name == "level6"));
    assert_eq!(table.depth(), 0);
    assert_eq!(table.find("x"), Some(&0));
}

#[test]
fn test_scope_guard_survives_panic() {
    let mut table: SymbolTable<i32> = SymbolTable::new();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut scope = table.scope();
        scope.add("y", 1).unwrap();
        panic!("traversal aborted");
    }));
    assert!(outcome.is_err());
    assert_eq!(table.depth(), 0);
    assert_eq!(table.find("y"), None);
}

// ---
// A name-resolution pass combining the visitor with scoped acquisition
// ---

struct Resolver<'a, 'r> {
    table: &'r mut SymbolTable<&'a str>,
    unresolved: &'r mut Vec<(LineNumber, &'a str)>,
}

impl<'a> Resolver<'a, '_> {
    fn check(&mut self, line: LineNumber, name: &'a str) {
        if name != "self" && self.table.find(name).is_none() {
            self.unresolved.push((line, name));
        }
    }
}

impl<'a> Visitor<'a> for Resolver<'a, '_> {
    type Error = CoolAstError;

    fn visit_class(&mut self, class: &'a Class) -> Result<()> {
        let mut scope = self.table.scope();
        for attr in class.attributes() {
            scope.add(attr.name.as_str(), attr.type_decl.as_str())?;
        }
        let mut inner = Resolver {
            table: &mut scope,
            unresolved: &mut *self.unresolved,
        };
        walk_class(&mut inner, class)
    }

    fn visit_feature(&mut self, feature: &'a Feature) -> Result<()> {
        let mut scope = self.table.scope();
        if let Feature::Method(method) = feature {
            for formal in &method.formals {
                scope.add(formal.name.as_str(), formal.type_decl.as_str())?;
            }
        }
        let mut inner = Resolver {
            table: &mut scope,
            unresolved: &mut *self.unresolved,
        };
        walk_feature(&mut inner, feature)
    }

    fn visit_branch(&mut self, branch: &'a Branch) -> Result<()> {
        let mut scope = self.table.scope();
        scope.add(branch.name.as_str(), branch.type_decl.as_str())?;
        let mut inner = Resolver {
            table: &mut scope,
            unresolved: &mut *self.unresolved,
        };
        inner.visit_expr(&branch.expr)
    }

    fn visit_expr(&mut self, expr: &'a Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Object { name } => {
                self.check(expr.line, name);
                Ok(())
            }
            ExprKind::Assign { name, .. } => {
                self.check(expr.line, name);
                walk_expr(self, expr)
            }
            ExprKind::Let {
                identifier,
                type_decl,
                init,
                body,
            } => {
                self.visit_expr(init)?;
                let mut scope = self.table.scope();
                scope.add(identifier.as_str(), type_decl.as_str())?;
                let mut inner = Resolver {
                    table: &mut scope,
                    unresolved: &mut *self.unresolved,
                };
                inner.visit_expr(body)
            }
            _ => walk_expr(self, expr),
        }
    }
}

fn resolve(source: &str) -> (Result<()>, Vec<(LineNumber, String)>, usize) {
    let program = parse(source).unwrap();
    let mut table = SymbolTable::new();
    let mut unresolved = Vec::new();
    let result = Resolver {
        table: &mut table,
        unresolved: &mut unresolved,
    }
    .visit_program(&program);
    let names = unresolved
        .into_iter()
        .map(|(line, name)| (line, name.to_string()))
        .collect();
    (result, names, table.depth())
}

#[test]
fn test_resolver_finds_every_binding() {
    let (result, unresolved, depth) = resolve(ALL_KINDS);
    result.unwrap();
    assert!(unresolved.is_empty(), "{unresolved:?}");
    assert_eq!(depth, 0);
}

#[test]
fn test_resolver_reports_unbound_names() {
    let source = "#1 _program #1 _class A Object \"a.cl\" ( \
                  #2 _method f #2 _formal a Int Int \
                  #3 _let b Int #3 _object a : Int #4 _plus #4 _object b : Int #4 _object z : Int : Int : Int \
                  )";
    let (result, unresolved, depth) = resolve(source);
    result.unwrap();
    assert_eq!(unresolved, [(4, "z".to_string())]);
    assert_eq!(depth, 0);
}

#[test]
fn test_resolver_error_leaves_no_scopes_behind() {
    let source = "#1 _program #1 _class A Object \"a.cl\" ( \
                  #2 _method f #2 _formal a Int #2 _formal a Int Int #3 _object a : Int \
                  )";
    let (result, _, depth) = resolve(source);
    assert!(matches!(result, Err(CoolAstError::DuplicateSymbol { ref name }) if name == "a"));
    assert_eq!(depth, 0);
}
