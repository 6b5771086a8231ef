#![allow(clippy::module_inception)]

use std::{io::Write, rc::Rc, time::Instant};

use tracing::debug;

use crate::{
    errors::errors::Error,
    interpreter::interpreter::{Interpreter, InterpreterConfig},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, TypeChecker},
};

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Lexes, parses and type checks `source`.
///
/// On success the returned checker holds the typed program in
/// `typed_ast`, ready to be handed to the interpreter.
pub fn check_source(source: &str, file: &str) -> Result<TypeChecker, Error> {
    let start = Instant::now();
    let tokens = tokenize(source.to_string(), Some(file.to_string()))?;
    debug!(elapsed = ?start.elapsed(), tokens = tokens.len(), "tokenized");

    let parse_start = Instant::now();
    let (_, ast) = parse(tokens, Rc::new(file.to_string()));
    let ast = ast?;
    debug!(elapsed = ?parse_start.elapsed(), statements = ast.body.len(), "parsed");

    let type_check_start = Instant::now();
    let (type_checker, error) = type_check(ast);
    debug!(elapsed = ?type_check_start.elapsed(), "type checked");

    match error {
        Some(error) => Err(error),
        None => Ok(type_checker),
    }
}

/// Checks `source` and, if it is well typed, executes it.
///
/// `console.log` output goes to `out`, `console.error` output to `err`.
pub fn run_source(
    source: &str,
    file: &str,
    config: InterpreterConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), Error> {
    let type_checker = check_source(source, file)?;

    let run_start = Instant::now();
    let mut interpreter = Interpreter::new(config, out, err);
    let result = interpreter.run(&type_checker.typed_ast);
    debug!(elapsed = ?run_start.elapsed(), ok = result.is_ok(), "executed");

    result
}
