//! Unit tests for the interpreter.
//!
//! Programs are run through the whole pipeline with in-memory sinks so
//! the exact console output can be compared.

use std::io::{self, Write};

use rstest::rstest;

use super::interpreter::InterpreterConfig;
use crate::{
    errors::errors::{Error, ErrorImpl},
    run_source,
};

struct Output {
    out: String,
    err: String,
}

fn run_with(source: &str, config: InterpreterConfig) -> Result<Output, (Error, Output)> {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = run_source(source, "test.ts", config, &mut out, &mut err);

    let output = Output {
        out: String::from_utf8(out).unwrap(),
        err: String::from_utf8(err).unwrap(),
    };

    match result {
        Ok(()) => Ok(output),
        Err(error) => Err((error, output)),
    }
}

fn run(source: &str) -> String {
    match run_with(source, InterpreterConfig::default()) {
        Ok(output) => output.out,
        Err((error, _)) => panic!("expected {:?} to run, got {:?}", source, error),
    }
}

fn run_err(source: &str, config: InterpreterConfig) -> (Error, Output) {
    match run_with(source, config) {
        Ok(_) => panic!("expected {:?} to fail", source),
        Err(failure) => failure,
    }
}

#[test]
fn test_add_function() {
    let output = run("function add(a: number, b: number): number { return a + b; }\n\
         console.log(add(5, 10));");
    assert_eq!(output, "15\n");
}

#[test]
fn test_void_function_logs_message() {
    let output = run("function logMessage(message: string): void { console.log(message); }\n\
         logMessage(\"Hello, World!\");");
    assert_eq!(output, "Hello, World!\n");
}

#[test]
fn test_rejected_program_never_runs() {
    let (error, output) = run_err(
        "console.log(\"before\");\n\
         function add(a: number, b: number): number { return a + b; }\n\
         add(5, \"10\");",
        InterpreterConfig::default(),
    );
    assert_eq!(error.get_error_name(), "ArgumentTypeMatchError");
    assert!(output.out.is_empty());
}

#[test]
fn test_throw_is_uncaught() {
    let (error, _) = run_err(
        "function throwError(message: string): never { throw new Error(message); }\n\
         throwError(\"boom\");",
        InterpreterConfig::default(),
    );
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::UncaughtException {
            message: String::from("Error: boom")
        }
    );
    assert_eq!(error.get_position().0, 46);
}

#[test]
fn test_throw_plain_value() {
    let (error, _) = run_err("throw \"plain\";", InterpreterConfig::default());
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::UncaughtException {
            message: String::from("plain")
        }
    );
}

#[test]
fn test_output_before_throw_is_kept() {
    let (_, output) = run_err(
        "console.log(\"first\");\nthrow new Error(\"second\");\nconsole.log(\"third\");",
        InterpreterConfig::default(),
    );
    assert_eq!(output.out, "first\n");
}

#[test]
fn test_infinite_loop_hits_iteration_limit() {
    let config = InterpreterConfig {
        max_loop_iterations: Some(100),
        ..InterpreterConfig::default()
    };
    let (error, _) = run_err(
        "function infiniteLoop(): never { while (true) { } }\ninfiniteLoop();",
        config,
    );
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::IterationLimitExceeded { limit: 100 }
    );
}

#[test]
fn test_loop_within_limit_completes() {
    let config = InterpreterConfig {
        max_loop_iterations: Some(3),
        ..InterpreterConfig::default()
    };
    let output = match run_with(
        "let i = 0;\nwhile (i < 3) { console.log(i); i += 1; }",
        config,
    ) {
        Ok(output) => output.out,
        Err((error, _)) => panic!("unexpected error {:?}", error),
    };
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn test_break_leaves_loop() {
    let output = run("let i = 0;\n\
         while (true) { i += 1; if (i === 5) { break; } }\n\
         console.log(i);");
    assert_eq!(output, "5\n");
}

#[test]
fn test_return_from_inside_loop() {
    let output = run("function firstOver(limit: number): number {\n\
           let n = 1;\n\
           while (true) { if (n > limit) { return n; } n *= 2; }\n\
         }\n\
         console.log(firstOver(20));");
    assert_eq!(output, "32\n");
}

#[test]
fn test_call_depth_is_bounded() {
    let config = InterpreterConfig {
        max_call_depth: 50,
        ..InterpreterConfig::default()
    };
    let (error, _) = run_err(
        "function recurse(n: number): number { return recurse(n + 1); }\nrecurse(0);",
        config,
    );
    assert_eq!(error.get_kind(), &ErrorImpl::CallStackExceeded { depth: 50 });
}

#[test]
fn test_recursion_within_depth() {
    let output = run("function fact(n: number): number {\n\
           if (n <= 1) { return 1; }\n\
           return n * fact(n - 1);\n\
         }\n\
         console.log(fact(10));");
    assert_eq!(output, "3628800\n");
}

#[rstest]
#[case("console.log(1.5, 10, -0);", "1.5 10 -0\n")]
#[case("console.log(0.1 + 0.2);", "0.30000000000000004\n")]
#[case("console.log(1 / 0, 7 % 3, 10 / 4);", "Infinity 1 2.5\n")]
#[case("console.log({ a: 1, b: \"x\" });", "{ a: 1, b: 'x' }\n")]
#[case("console.log({});", "{}\n")]
#[case("console.log(new Error(\"bad\"));", "Error: bad\n")]
#[case("function f(): void { }\nconsole.log(f);", "[Function: f]\n")]
#[case("console.log(true, \"a\" + 1);", "true a1\n")]
#[case("console.log(\"héllo\".length);", "5\n")]
#[case("console.log();", "\n")]
#[case("console.log(1000000000 * 1000000000000);", "1e+21\n")]
#[case("console.log(1000000000 * 100000000000);", "100000000000000000000\n")]
#[case("console.log(1 / 10000000, -1 / 10000000);", "1e-7 -1e-7\n")]
#[case("console.log(1 / 1000000);", "0.000001\n")]
#[case("console.log(123456 / 1000000000000);", "1.23456e-7\n")]
#[case("console.log(\"\" + 1000000000 * 1000000000000);", "1e+21\n")]
fn test_console_formatting(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(run(source), expected);
}

#[rstest]
#[case("let a: any = \"1\";\nconsole.log(a == 1, a === 1);", "true false\n")]
#[case("let a: any = 0;\nconsole.log(a || \"default\", a && \"never\");", "default 0\n")]
#[case("let a: any = true;\nconsole.log(a == 1, a != 1, !a);", "true false false\n")]
#[case("console.log(\"apple\" < \"banana\", 3 >= 4);", "true false\n")]
#[case("let o = { a: 1 };\nlet p = o;\nconsole.log(o === p, o === { a: 1 });", "true false\n")]
fn test_operator_semantics(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(run(source), expected);
}

#[test]
fn test_template_literal() {
    let output = run("let name = \"Ann\";\nconsole.log(`Hi ${name}, ${1 + 1}`);");
    assert_eq!(output, "Hi Ann, 2\n");
}

#[test]
fn test_functions_are_hoisted() {
    let output = run("console.log(double(4));\n\
         function double(n: number): number { return n * 2; }");
    assert_eq!(output, "8\n");
}

#[test]
fn test_function_updates_outer_variable() {
    let output = run("let count = 0;\n\
         function increment(): void { count += 1; }\n\
         increment();\nincrement();\n\
         console.log(count);");
    assert_eq!(output, "2\n");
}

#[test]
fn test_block_scope_shadowing() {
    let output = run("let x = 1;\n{ let x = 2; console.log(x); }\nconsole.log(x);");
    assert_eq!(output, "2\n1\n");
}

#[test]
fn test_if_else_branches() {
    let output = run("function sign(n: number): string {\n\
           if (n < 0) { return \"negative\"; } else if (n === 0) { return \"zero\"; }\n\
           return \"positive\";\n\
         }\n\
         console.log(sign(-2), sign(0), sign(3));");
    assert_eq!(output, "negative zero positive\n");
}

#[test]
fn test_missing_property_is_undefined() {
    assert_eq!(run("let o: any = {};\nconsole.log(o.missing);"), "undefined\n");
}

#[test]
fn test_property_of_undefined_is_type_error() {
    let (error, _) = run_err("let o: any = {};\no.missing.x;", InterpreterConfig::default());
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::UncaughtException {
            message: String::from("TypeError: Cannot read properties of undefined (reading 'x')")
        }
    );
}

#[test]
fn test_calling_non_function_is_type_error() {
    let (error, _) = run_err("let o: any = 1;\no();", InterpreterConfig::default());
    assert_eq!(
        error.get_kind(),
        &ErrorImpl::UncaughtException {
            message: String::from("TypeError: o is not a function")
        }
    );
}

#[test]
fn test_console_error_writes_to_error_sink() {
    let output = match run_with(
        "console.log(\"out\");\nconsole.error(\"oops\", 1);",
        InterpreterConfig::default(),
    ) {
        Ok(output) => output,
        Err((error, _)) => panic!("unexpected error {:?}", error),
    };
    assert_eq!(output.out, "out\n");
    assert_eq!(output.err, "oops 1\n");
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_failure_is_output_error() {
    let mut out = FailingWriter;
    let mut err = Vec::new();
    let error = run_source(
        "console.log(1);",
        "test.ts",
        InterpreterConfig::default(),
        &mut out,
        &mut err,
    )
    .unwrap_err();
    assert_eq!(error.get_error_name(), "OutputError");
}
