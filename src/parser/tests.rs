//! Unit tests for the parser module.
//!
//! Covers declarations, functions, control flow, operator precedence,
//! template literals and the errors reported for malformed input.

use std::rc::Rc;

use rstest::rstest;

use super::parser::parse;
use crate::{
    ast::{
        ast::{Expr, Stmt},
        statements::BlockStmt,
        types::TypeAnnotation,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{lexer::tokenize, tokens::TokenKind},
};

fn parse_source(source: &str) -> Result<BlockStmt, Error> {
    let tokens = tokenize(source.to_string(), Some("test.ts".to_string()))?;
    let (_, result) = parse(tokens, Rc::new("test.ts".to_string()));
    result
}

fn parse_ok(source: &str) -> BlockStmt {
    parse_source(source).unwrap()
}

fn only_expression(source: &str) -> Expr {
    let ast = parse_ok(source);
    assert_eq!(ast.body.len(), 1);
    match ast.body.into_iter().next().unwrap() {
        Stmt::Expression(stmt) => stmt.expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_parse_annotated_declaration() {
    let ast = parse_ok("let age: number = 25;");

    match &ast.body[0] {
        Stmt::VarDecl(decl) => {
            assert_eq!(decl.identifier, "age");
            assert!(!decl.is_constant);
            match &decl.explicit_type {
                Some(TypeAnnotation::Symbol(symbol)) => assert_eq!(symbol.name, "number"),
                other => panic!("unexpected annotation {:?}", other),
            }
            assert!(matches!(decl.assigned_value, Some(Expr::Number(ref n)) if n.value == 25.0));
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_inferred_declaration() {
    let ast = parse_ok("let name = \"John\";");

    match &ast.body[0] {
        Stmt::VarDecl(decl) => {
            assert!(decl.explicit_type.is_none());
            assert!(matches!(decl.assigned_value, Some(Expr::String(ref s)) if s.value == "John"));
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_const_declaration() {
    let ast = parse_ok("const PI = 3.14;");
    assert!(matches!(&ast.body[0], Stmt::VarDecl(decl) if decl.is_constant));
}

#[test]
fn test_parse_annotation_without_initializer() {
    let ast = parse_ok("let value: any;");
    assert!(matches!(&ast.body[0], Stmt::VarDecl(decl) if decl.assigned_value.is_none()));
}

#[rstest]
#[case("let x;")]
#[case("const x: number;")]
fn test_parse_declaration_without_value(#[case] source: &str) {
    let error = parse_source(source).unwrap_err();
    assert_eq!(error.get_kind(), &ErrorImpl::ExpectedExplicitValue);
}

#[test]
fn test_parse_object_type_annotation() {
    let ast = parse_ok("let user: { name: string; age: number } = { name: \"a\", age: 1 };");

    match &ast.body[0] {
        Stmt::VarDecl(decl) => match &decl.explicit_type {
            Some(TypeAnnotation::Object(object)) => {
                let names: Vec<&str> = object.fields.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["name", "age"]);
            }
            other => panic!("unexpected annotation {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_function_declaration() {
    let ast = parse_ok("function add(a: number, b: number): number { return a + b; }");

    match &ast.body[0] {
        Stmt::FnDecl(function) => {
            assert_eq!(function.identifier, "add");
            assert_eq!(function.parameters.len(), 2);
            assert_eq!(function.parameters[1].name, "b");
            assert!(function.return_type.is_some());
            assert!(matches!(function.body.body[0], Stmt::Return(_)));
        }
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_parse_function_without_annotations() {
    let ast = parse_ok("function greet(name) { console.log(name); }");

    match &ast.body[0] {
        Stmt::FnDecl(function) => {
            assert!(function.parameters[0].explicit_type.is_none());
            assert!(function.return_type.is_none());
        }
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_parse_if_else_statement() {
    let ast = parse_ok("if (x > 0) { log(\"positive\"); } else log(\"negative\");");

    match &ast.body[0] {
        Stmt::If(stmt) => {
            assert!(matches!(*stmt.then_body, Stmt::Block(_)));
            assert!(matches!(stmt.else_body.as_deref(), Some(Stmt::Expression(_))));
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_parse_while_loop_with_break() {
    let ast = parse_ok("while (true) { break; }");

    match &ast.body[0] {
        Stmt::While(stmt) => {
            assert!(matches!(stmt.condition, Expr::Boolean(ref b) if b.value));
            match &*stmt.body {
                Stmt::Block(block) => assert!(matches!(block.body[0], Stmt::Break(_))),
                other => panic!("expected block, got {:?}", other),
            }
        }
        other => panic!("expected while, got {:?}", other),
    }
}

#[test]
fn test_parse_throw_new_error() {
    let ast = parse_ok("throw new Error(message);");

    match &ast.body[0] {
        Stmt::Throw(stmt) => match &stmt.value {
            Expr::New(new) => {
                assert_eq!(new.class, "Error");
                assert_eq!(new.arguments.len(), 1);
            }
            other => panic!("expected new expression, got {:?}", other),
        },
        other => panic!("expected throw, got {:?}", other),
    }
}

#[test]
fn test_parse_multiplication_binds_tighter() {
    match only_expression("1 + 2 * 3;") {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator.kind, TokenKind::Plus);
            assert!(matches!(*binary.right, Expr::Binary(ref inner) if inner.operator.kind == TokenKind::Star));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_parse_subtraction_is_left_associative() {
    match only_expression("10 - 4 - 3;") {
        Expr::Binary(binary) => {
            assert!(matches!(*binary.left, Expr::Binary(_)));
            assert!(matches!(*binary.right, Expr::Number(ref n) if n.value == 3.0));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_parse_assignment_is_right_associative() {
    match only_expression("a = b = 1;") {
        Expr::Assignment(assignment) => {
            assert!(matches!(*assignment.assignee, Expr::Symbol(ref s) if s.value == "a"));
            assert!(matches!(*assignment.value, Expr::Assignment(_)));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_parse_prefix_binds_tighter_than_binary() {
    match only_expression("-a + b;") {
        Expr::Binary(binary) => assert!(matches!(*binary.left, Expr::Prefix(_))),
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_parse_member_call() {
    match only_expression("console.log(\"a\", 1);") {
        Expr::Call(call) => {
            assert_eq!(call.arguments.len(), 2);
            match *call.callee {
                Expr::Member(member) => {
                    assert_eq!(member.property, "log");
                    assert!(matches!(*member.object, Expr::Symbol(ref s) if s.value == "console"));
                }
                other => panic!("expected member, got {:?}", other),
            }
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_parse_grouping() {
    match only_expression("(1 + 2) * 3;") {
        Expr::Binary(binary) => {
            assert_eq!(binary.operator.kind, TokenKind::Star);
            assert!(matches!(*binary.left, Expr::Binary(_)));
        }
        other => panic!("expected binary, got {:?}", other),
    }
}

#[test]
fn test_parse_template_literal() {
    match only_expression("`Hello, ${name}! You are ${age + 1}.`;") {
        Expr::Template(template) => {
            assert_eq!(template.quasis, vec!["Hello, ", "! You are ", "."]);
            assert_eq!(template.expressions.len(), 2);
            assert!(matches!(template.expressions[0], Expr::Symbol(ref s) if s.value == "name"));
            assert!(matches!(template.expressions[1], Expr::Binary(_)));
        }
        other => panic!("expected template, got {:?}", other),
    }
}

#[test]
fn test_parse_template_substitution_positions() {
    match only_expression("`ab${x}`;") {
        // `x` is at byte 5: backtick, a, b, $, {
        Expr::Template(template) => assert_eq!(template.expressions[0].get_span().start.0, 5),
        other => panic!("expected template, got {:?}", other),
    }
}

#[test]
fn test_parse_template_escapes() {
    match only_expression("`line\\n\\${not}`;") {
        Expr::Template(template) => {
            assert_eq!(template.quasis, vec!["line\n${not}"]);
            assert!(template.expressions.is_empty());
        }
        other => panic!("expected template, got {:?}", other),
    }
}

#[test]
fn test_parse_unterminated_template_substitution() {
    let error = parse_source("`hello ${name`;").unwrap_err();
    assert_eq!(error.get_kind(), &ErrorImpl::UnterminatedTemplate);
}

#[test]
fn test_parse_object_literal() {
    let ast = parse_ok("let point = { x: 1, y: \"two\", };");

    match &ast.body[0] {
        Stmt::VarDecl(decl) => match &decl.assigned_value {
            Some(Expr::Object(object)) => assert_eq!(object.fields.len(), 2),
            other => panic!("expected object literal, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_nested_blocks() {
    let ast = parse_ok("{ let x = 1; { x = 2; } }");

    match &ast.body[0] {
        Stmt::Block(block) => assert!(matches!(block.body[1], Stmt::Block(_))),
        other => panic!("expected block, got {:?}", other),
    }
}

#[test]
fn test_parse_empty_program() {
    assert!(parse_ok("// nothing here\n").body.is_empty());
}

#[test]
fn test_parse_spans_cover_statement() {
    let ast = parse_ok("let x = 1;");
    let span = ast.body[0].get_span();
    assert_eq!(span.start.0, 0);
    assert_eq!(span.end.0, 10);
}

#[rstest]
#[case("let x = 1")]
#[case("add(1, 2)")]
#[case("return 1")]
#[case("break")]
fn test_parse_missing_semicolon(#[case] source: &str) {
    let error = parse_source(source).unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[rstest]
#[case("if x > 0 { }")]
#[case("while x { }")]
#[case("add(1 2);")]
#[case("function (a) { }")]
#[case("let 5 = 1;")]
#[case("{ let x = 1;")]
fn test_parse_malformed_input(#[case] source: &str) {
    assert!(parse_source(source).is_err());
}

#[test]
fn test_parse_unexpected_token_position() {
    let error = parse_source("let x = * 2;").unwrap_err();
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::UnexpectedToken {
            token: "*".to_string()
        }
    );
    assert_eq!(error.get_position().0, 8);
}
