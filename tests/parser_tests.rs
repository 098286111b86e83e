// tests/parser_tests.rs

use coolast::ast::{Field, NodeRef};
use coolast::syntax::lexer::tokenize;
use coolast::syntax::TokenKind;
use coolast::{
    parse, parse_expression, parse_named, CoolAstError, ErrorType, ExprKind, Feature, NodeKind,
    StaticType,
};

const ALL_KINDS: &str = include_str!("fixtures/all_kinds.ast");

#[test]
fn test_classes_and_features_keep_source_order() {
    let program = parse(ALL_KINDS).unwrap();
    let names: Vec<_> = program.class_names().collect();
    assert_eq!(names, ["Main", "Foo"]);

    let main = &program.classes[0];
    let features: Vec<_> = main.features.iter().map(|f| (f.kind(), f.name())).collect();
    assert_eq!(
        features,
        [
            (NodeKind::Attribute, "x"),
            (NodeKind::Attribute, "s"),
            (NodeKind::Method, "main"),
            (NodeKind::Method, "f"),
        ]
    );

    let Feature::Method(f) = &main.features[3] else {
        panic!("expected a method");
    };
    let formals: Vec<_> = f.formals.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(formals, ["a", "b"]);
    assert_eq!(f.line, 23);
}

#[test]
fn test_block_and_actuals_keep_order() {
    let program = parse(ALL_KINDS).unwrap();
    let Feature::Method(main) = &program.classes[0].features[2] else {
        panic!("expected a method");
    };
    let ExprKind::Block { body } = &main.body.kind else {
        panic!("expected a block");
    };
    let lines: Vec<_> = body.iter().map(|e| e.line).collect();
    assert_eq!(lines, [6, 7, 8, 9, 12, 14, 16, 19, 20]);

    match &body[2].kind {
        ExprKind::StaticDispatch {
            type_name,
            name,
            actual,
            ..
        } => {
            assert_eq!(type_name, "IO");
            assert_eq!(name, "out_int");
            assert_eq!(actual.len(), 2);
            match &actual[1].kind {
                ExprKind::IntConst { value } => assert_eq!(value.to_i64(), Some(2)),
                other => panic!("expected an integer constant, got {other:?}"),
            }
        }
        other => panic!("expected a static dispatch, got {other:?}"),
    }
}

#[test]
fn test_annotations_fill_type_slots() {
    let program = parse(ALL_KINDS).unwrap();
    let Feature::Attribute(x) = &program.classes[0].features[0] else {
        panic!("expected an attribute");
    };
    assert_eq!(x.init.static_type(), &StaticType::named("Int"));

    let Feature::Attribute(s) = &program.classes[0].features[1] else {
        panic!("expected an attribute");
    };
    assert!(matches!(s.init.kind, ExprKind::NoExpr));
    assert!(!s.init.is_typed());

    // Parsed annotations count as the one permitted write.
    let err = x.init.assign_type(StaticType::named("Object")).unwrap_err();
    assert!(matches!(err, CoolAstError::TypeAlreadyAssigned { line: 2, .. }));
}

#[test]
fn test_string_literal_decoding() {
    let expr = parse_expression(r#"#1 _string "ab\nc" : String"#).unwrap();
    let ExprKind::StringConst { value } = &expr.kind else {
        panic!("expected a string constant");
    };
    assert_eq!(value.chars().collect::<Vec<_>>(), ['a', 'b', '\n', 'c']);
}

#[test]
fn test_tokens_of_string_literal() {
    let tokens = tokenize(r#""ab\nc""#).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::StrConst("ab\nc".to_string()));
}

#[test]
fn test_named_field_access_on_parsed_nodes() {
    let program = parse(ALL_KINDS).unwrap();
    let class = NodeRef::from(&program.classes[0]);
    assert_eq!(class.field("parent").unwrap(), Field::Symbol("IO"));
    assert_eq!(class.field("filename").unwrap(), Field::String("main.cl"));
    match class.field("features").unwrap() {
        Field::Nodes(features) => assert_eq!(features.len(), 4),
        other => panic!("expected a node list, got {other:?}"),
    }

    let err = class.field("superclass").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Schema);
}

#[test]
fn test_class_with_parenthesized_name() {
    let err = parse("#1 _class (A) ()").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Syntax);
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_syntax_error_reports_marker_line() {
    let source = "#1 _program #4 _class Main Object \"a.cl\" ( #9 _attr x Int #9 _plus #9 _int 1 : Int : Int )";
    let err = parse(source).unwrap_err();
    match err {
        CoolAstError::Syntax {
            found,
            expected,
            line,
            ..
        } => {
            assert_eq!(found, "`:`");
            assert_eq!(expected, "a line number marker starting an expression");
            assert_eq!(line, 9);
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_unterminated_string_is_lexical() {
    let err = parse("#1 _program #1 _class Main Object \"a.cl").unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Lexical);
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_diagnostic_names_input() {
    let err = parse_named("#1 _program #1 _class Main", "broken.ast").unwrap_err();
    let rendered = format!("{:?}", miette::Report::new(err));
    assert!(rendered.contains("broken.ast"));
    assert!(rendered.contains("coolast::syntax"));
}
