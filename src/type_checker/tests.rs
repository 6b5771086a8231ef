//! Unit tests for the type checker.
//!
//! Covers annotation and inference, `any`, function signatures and calls,
//! the `void` and `never` return rules, reachability and scoping.

use std::rc::Rc;

use rstest::rstest;

use super::{
    type_checker::{type_check, TypeChecker},
    typed_ast::TypedStmt,
};
use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

fn check(source: &str) -> Result<TypeChecker, Error> {
    let tokens = tokenize(source.to_string(), Some("test.ts".to_string()))?;
    let (_, ast) = parse(tokens, Rc::new("test.ts".to_string()));
    let (type_checker, error) = type_check(ast?);
    match error {
        Some(error) => Err(error),
        None => Ok(type_checker),
    }
}

fn check_ok(source: &str) -> TypeChecker {
    match check(source) {
        Ok(type_checker) => type_checker,
        Err(error) => panic!("expected {:?} to type check, got {:?}", source, error),
    }
}

fn check_err(source: &str) -> Error {
    match check(source) {
        Ok(_) => panic!("expected {:?} to be rejected", source),
        Err(error) => error,
    }
}

fn variable_type(type_checker: &TypeChecker, name: &str) -> Type {
    type_checker.fetch_variable_type(name).unwrap().1
}

fn return_type(type_checker: &TypeChecker, name: &str) -> Type {
    match variable_type(type_checker, name) {
        Type::Function(function) => *function.return_type,
        other => panic!("expected function type, got {}", other),
    }
}

#[test]
fn test_explicit_annotation() {
    let type_checker = check_ok("let age: number = 25;");
    assert_eq!(variable_type(&type_checker, "age"), Type::number());
}

#[test]
fn test_explicit_annotation_rejects_mismatched_assignment() {
    let error = check_err("let age: number = 25;\nage = \"twenty-five\";");
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::TypeMatchError {
            expected: "number".to_string(),
            received: "string".to_string()
        }
    );
    assert_eq!(error.get_position().0, 28);
}

#[test]
fn test_explicit_annotation_rejects_mismatched_initializer() {
    let error = check_err("let age: number = \"25\";");
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_inferred_types() {
    let type_checker = check_ok("let age1 = 25;\nlet name = \"John\";\nlet done = true;");

    assert_eq!(variable_type(&type_checker, "age1"), Type::number());
    assert_eq!(variable_type(&type_checker, "name"), Type::string());
    assert_eq!(variable_type(&type_checker, "done"), Type::boolean());
}

#[test]
fn test_inferred_type_rejects_mismatched_assignment() {
    let error = check_err("let age1 = 25;\nage1 = \"x\";");
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_any_accepts_every_kind() {
    let type_checker = check_ok(
        "let value: any = 42;\nvalue = \"Hello\";\nvalue = true;\nvalue = { a: 1 };",
    );
    assert_eq!(variable_type(&type_checker, "value"), Type::Any);
}

#[test]
fn test_any_passes_through_calls_and_members() {
    check_ok(
        "let value: any = 42;
         function add(a: number, b: number): number { return a + b; }
         add(value, value);
         value.anything.at.all(1, 2, 3);
         let n: number = value;",
    );
}

#[test]
fn test_add_function_signature() {
    let type_checker = check_ok(
        "function add(a: number, b: number): number { return a + b; }\nlet sum = add(5, 10);",
    );

    assert_eq!(return_type(&type_checker, "add"), Type::number());
    assert_eq!(variable_type(&type_checker, "sum"), Type::number());
}

#[test]
fn test_add_rejects_string_argument() {
    let error = check_err(
        "function add(a: number, b: number): number { return a + b; }\nadd(5, \"10\");",
    );

    assert_eq!(
        error.get_kind(),
        &ErrorImpl::ArgumentTypeMatchError {
            expected: "number".to_string(),
            received: "string".to_string()
        }
    );
    assert_eq!(error.get_position().0, 68);
}

#[rstest]
#[case("add(1);", "MissingArguments")]
#[case("add(1, 2, 3);", "UnexpectedArguments")]
fn test_add_arity(#[case] call: &str, #[case] expected: &str) {
    let source = format!(
        "function add(a: number, b: number): number {{ return a + b; }}\n{}",
        call
    );
    assert_eq!(check_err(&source).get_error_name(), expected);
}

#[test]
fn test_void_function() {
    let type_checker = check_ok(
        "function logMessage(message: string): void { console.log(message); }
         logMessage(\"Hello, World!\");",
    );
    assert_eq!(return_type(&type_checker, "logMessage"), Type::Void);
}

#[test]
fn test_void_function_rejects_returned_value() {
    let error = check_err("function logMessage(message: string): void { return 42; }");
    assert_eq!(error.get_kind(), &ErrorImpl::VoidFunctionReturnedValue);
}

#[test]
fn test_void_function_allows_bare_return() {
    check_ok("function early(flag: boolean): void { if (flag) { return; } console.log(1); }");
}

#[test]
fn test_void_result_cannot_be_tested() {
    let error = check_err(
        "function logMessage(message: string): void { console.log(message); }
         if (logMessage(\"x\")) { }",
    );
    assert_eq!(error.get_kind(), &ErrorImpl::VoidTruthiness);
}

#[test]
fn test_void_result_is_not_a_number() {
    let error = check_err(
        "function logMessage(message: string): void { console.log(message); }
         let n: number = logMessage(\"x\");",
    );
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_never_function_throwing() {
    let type_checker = check_ok(
        "function throwError(message: string): never { throw new Error(message); }",
    );
    assert_eq!(return_type(&type_checker, "throwError"), Type::Never);
}

#[test]
fn test_never_function_infinite_loop() {
    check_ok("function infiniteLoop(): never { while (true) { } }");
}

#[test]
fn test_never_function_with_reachable_end() {
    let error = check_err("function broken(): never { console.log(\"done\"); }");
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::NeverFunctionReturns {
            function: "broken".to_string()
        }
    );
}

#[test]
fn test_never_function_loop_with_break_returns() {
    let error = check_err("function broken(): never { while (true) { break; } }");
    assert_eq!(error.get_error_name(), "NeverFunctionReturns");
}

#[test]
fn test_never_function_cannot_return() {
    let error = check_err("function broken(): never { return; }");
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::TypeMatchError {
            expected: "never".to_string(),
            received: "void".to_string()
        }
    );
}

#[test]
fn test_never_call_ends_control_flow() {
    check_ok(
        "function fail(message: string): never { throw new Error(message); }
         function parse(input: string): number { fail(input); }",
    );
}

#[test]
fn test_never_call_result_is_assignable_anywhere() {
    check_ok(
        "function fail(message: string): never { throw new Error(message); }
         function pick(flag: boolean): number { if (flag) { return 1; } return fail(\"no\"); }",
    );
}

#[test]
fn test_never_function_returning_never_call() {
    let type_checker = check_ok(
        "function fail(message: string): never { throw new Error(message); }
         function rethrow(): never { return fail(\"again\"); }",
    );
    assert_eq!(return_type(&type_checker, "rethrow"), Type::Never);
}

#[test]
fn test_never_function_cannot_return_value() {
    let error = check_err("function broken(): never { return 1; }");
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::TypeMatchError {
            expected: "never".to_string(),
            received: "number".to_string()
        }
    );
}

#[rstest]
#[case("flag || fail(\"x\");")]
#[case("flag && fail(\"x\");")]
fn test_short_circuit_never_operand_may_complete(#[case] body: &str) {
    let source = format!(
        "function fail(message: string): never {{ throw new Error(message); }}
         function guard(flag: boolean): never {{ {} }}",
        body
    );
    let error = check_err(&source);
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::NeverFunctionReturns {
            function: "guard".to_string()
        }
    );
}

#[test]
fn test_short_circuit_result_type() {
    let type_checker = check_ok(
        "function fail(message: string): never { throw new Error(message); }
         let left = \"a\" || fail(\"x\");
         let right = fail(\"x\") || 1;",
    );
    assert_eq!(variable_type(&type_checker, "left"), Type::string());
    assert_eq!(variable_type(&type_checker, "right"), Type::Never);
}

#[test]
fn test_annotated_function_must_return() {
    let error = check_err("function half(n: number): number { let h = n / 2; }");
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::FunctionLacksReturn {
            function: "half".to_string(),
            expected: "number".to_string()
        }
    );
}

#[test]
fn test_annotated_function_missing_return_value() {
    let error = check_err("function half(n: number): number { return; }");
    assert_eq!(error.get_error_name(), "MissingReturnValue");
}

#[test]
fn test_annotated_function_wrong_return_type() {
    let error = check_err("function half(n: number): number { return \"half\"; }");
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_if_else_both_returning_ends_function() {
    check_ok("function sign(n: number): number { if (n < 0) { return -1; } else { return 1; } }");
}

#[test]
fn test_inferred_return_types() {
    let type_checker = check_ok(
        "function greet(name: string) { return `Hello, ${name}!`; }
         function shout(name: string) { console.log(name); }
         let greeting = greet(\"John\");",
    );

    assert_eq!(return_type(&type_checker, "greet"), Type::string());
    assert_eq!(return_type(&type_checker, "shout"), Type::Void);
    assert_eq!(variable_type(&type_checker, "greeting"), Type::string());
}

#[test]
fn test_inferred_return_types_must_agree() {
    let error = check_err(
        "function pick(flag: boolean) { if (flag) { return 1; } return \"one\"; }",
    );
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::TypeMatchError {
            expected: "number".to_string(),
            received: "string".to_string()
        }
    );
}

#[test]
fn test_unannotated_parameters_are_any() {
    let type_checker = check_ok("function echo(value) { return value; }\necho(1);\necho(\"a\");");
    assert_eq!(return_type(&type_checker, "echo"), Type::Any);
}

#[test]
fn test_functions_are_hoisted() {
    check_ok("let total = add(1, 2);\nfunction add(a: number, b: number): number { return a + b; }");
}

#[test]
fn test_recursive_function() {
    check_ok(
        "function countdown(n: number): void { if (n > 0) { countdown(n - 1); } }
         countdown(3);",
    );
}

#[test]
fn test_closure_reads_outer_variable() {
    check_ok(
        "let prefix = \">\";
         function show(message: string): void { console.log(prefix + message); }",
    );
}

#[rstest]
#[case("console = 1;", "ConstantReassignment")]
#[case("const PI = 3.14; PI = 3;", "ConstantReassignment")]
#[case("let x = 1; let x = 2;", "VariableAlreadyDeclared")]
#[case("function f() { } function f() { }", "FunctionAlreadyDeclared")]
#[case("function f() { } let f = 1;", "VariableAlreadyDeclared")]
#[case("y = 1;", "VariableNotDeclared")]
#[case("console.log(missing);", "VariableNotDeclared")]
#[case("{ let inner = 1; } inner = 2;", "VariableNotDeclared")]
#[case("1 = 2;", "InvalidAssignmentTarget")]
#[case("let x: strng = \"a\";", "UnknownType")]
#[case("let s = \"a\"; s.size;", "UnknownProperty")]
#[case("let n = 1; n();", "NotCallable")]
#[case("let x = 1 - \"a\";", "InvalidOperands")]
#[case("let x = true + 1;", "InvalidOperands")]
#[case("let x = 1 < \"a\";", "InvalidOperands")]
#[case("let x = 1 === \"a\";", "InvalidOperands")]
#[case("let x = -\"a\";", "InvalidOperands")]
#[case("let s = \"a\"; s -= 1;", "InvalidOperands")]
#[case("return 1;", "ReturnOutsideFunction")]
#[case("break;", "BreakOutsideLoop")]
#[case("while (true) { function f() { break; } }", "BreakOutsideLoop")]
#[case("let e = new Widget();", "UnknownType")]
#[case("let e = new Error(42);", "ArgumentTypeMatchError")]
fn test_rejected_programs(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(check_err(source).get_error_name(), expected);
}

#[rstest]
#[case("let x: strng = \"a\";", 7)]
#[case("let p: { name: strng } = { name: \"a\" };", 15)]
#[case("function f(n: nmber): void { }", 14)]
fn test_unknown_type_position(#[case] source: &str, #[case] position: u32) {
    let error = check_err(source);
    assert_eq!(error.get_error_name(), "UnknownType");
    assert_eq!(error.get_position().0, position);
}

#[rstest]
#[case("let s = \"a\" + 1;", Type::string())]
#[case("let s = 1 + 2 * 3;", Type::number())]
#[case("let s = `x${1}`;", Type::string())]
#[case("let s = \"abc\".length;", Type::number())]
#[case("let s = 1 < 2 && 2 < 3;", Type::boolean())]
#[case("let s = !0;", Type::boolean())]
#[case("let s = 1 || \"a\";", Type::Any)]
#[case("let s = new Error(\"boom\").message;", Type::string())]
fn test_expression_types(#[case] source: &str, #[case] expected: Type) {
    let type_checker = check_ok(source);
    assert_eq!(variable_type(&type_checker, "s"), expected);
}

#[test]
fn test_compound_assignment() {
    check_ok("let n = 1; n += 2; n *= 3; let s = \"a\"; s += 1;");
}

#[test]
fn test_object_types_are_structural() {
    check_ok(
        "let user: { name: string; age: number } = { name: \"John\", age: 30, admin: true };
         let name: string = user.name;
         let thing: object = user;",
    );

    let error = check_err("let user: { name: string; age: number } = { name: \"John\" };");
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_error_objects() {
    let type_checker = check_ok("let e: Error = new Error(\"boom\");");
    assert_eq!(variable_type(&type_checker, "e").to_string(), "Error");
}

#[test]
fn test_unreachable_code_is_still_checked() {
    let error = check_err(
        "function f(): never { throw new Error(\"x\"); let n: number = \"a\"; }",
    );
    assert_eq!(error.get_error_name(), "TypeMatchError");
}

#[test]
fn test_typed_ast_keeps_statements() {
    let type_checker = check_ok("let a = 1;\nfunction f(): void { }\nf();");

    assert_eq!(type_checker.typed_ast.body.len(), 3);
    assert!(matches!(type_checker.typed_ast.body[1], TypedStmt::FnDecl(_)));
    match &type_checker.typed_ast.body[2] {
        TypedStmt::Expression(stmt) => assert_eq!(stmt.expression.get_type(), Type::Void),
        other => panic!("expected expression statement, got {:?}", other),
    }
}
