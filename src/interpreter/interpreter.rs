//! Main interpreter module.
//!
//! This module contains the core Interpreter structure that walks the typed
//! AST produced by the type checker. It owns the output sinks, the global
//! scope with the `console` object, and the resource limits that bound a
//! run.

use std::{io::Write, rc::Rc, time::Instant};

use tracing::{debug, trace};

use crate::{
    errors::errors::{Error, ErrorImpl},
    type_checker::typed_ast::TypedBlockStmt,
    Position,
};

use super::{
    scope::Scope,
    stmt::{exec_block, Flow},
    value::{FunctionValue, NativeFunction, ObjectValue, Value},
};

/// Limits applied while a program runs.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    /// Iterations a single loop may run before the program is stopped.
    /// `None` lets loops run forever.
    pub max_loop_iterations: Option<u64>,
    /// Nesting depth of user function calls.
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_loop_iterations: None,
            max_call_depth: 1000,
        }
    }
}

/// The tree-walking interpreter.
///
/// # Lifetimes
///
/// * `'a` - Lifetime of the output sinks
pub struct Interpreter<'a> {
    pub(super) config: InterpreterConfig,
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
    call_depth: usize,
    globals: Rc<Scope>,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter writing `console.log` to `out` and
    /// `console.error` to `err`.
    pub fn new(config: InterpreterConfig, out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        let globals = Scope::new_global();
        globals.declare(String::from("console"), console_object());

        Interpreter {
            config,
            out,
            err,
            call_depth: 0,
            globals,
        }
    }

    /// Executes a checked program to completion.
    pub fn run(&mut self, program: &TypedBlockStmt) -> Result<(), Error> {
        let start = Instant::now();
        let scope = Scope::child(&self.globals);

        let result = exec_block(self, program, &scope);
        debug!(elapsed = ?start.elapsed(), "program finished");

        result.map(|_| ())
    }

    pub fn call_function(
        &mut self,
        function: &FunctionValue,
        arguments: Vec<Value>,
        position: &Position,
    ) -> Result<Value, Error> {
        match function {
            FunctionValue::Native { function, .. } => {
                self.call_native(*function, &arguments, position)
            }
            FunctionValue::User {
                declaration,
                closure,
            } => {
                if self.call_depth >= self.config.max_call_depth {
                    return Err(Error::new(
                        ErrorImpl::CallStackExceeded {
                            depth: self.config.max_call_depth,
                        },
                        position.clone(),
                    ));
                }

                trace!(function = %declaration.identifier, depth = self.call_depth, "call");

                let scope = Scope::child(closure);
                let mut arguments = arguments.into_iter();
                for name in declaration.parameter_names() {
                    scope.declare(
                        name.to_string(),
                        arguments.next().unwrap_or(Value::Undefined),
                    );
                }

                self.call_depth += 1;
                let result = exec_block(self, &declaration.body, &scope);
                self.call_depth -= 1;

                match result? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal | Flow::Break => Ok(Value::Undefined),
                }
            }
        }
    }

    fn call_native(
        &mut self,
        function: NativeFunction,
        arguments: &[Value],
        position: &Position,
    ) -> Result<Value, Error> {
        let line = arguments
            .iter()
            .map(Value::to_console_string)
            .collect::<Vec<String>>()
            .join(" ");

        let sink = match function {
            NativeFunction::ConsoleLog => &mut *self.out,
            NativeFunction::ConsoleError => &mut *self.err,
        };

        writeln!(sink, "{}", line).map_err(|error| {
            Error::new(
                ErrorImpl::OutputError {
                    message: error.to_string(),
                },
                position.clone(),
            )
        })?;

        Ok(Value::Undefined)
    }
}

fn console_object() -> Value {
    let native = |name: &str, function: NativeFunction| {
        (
            String::from(name),
            Value::Function(Rc::new(FunctionValue::Native {
                name: String::from(name),
                function,
            })),
        )
    };

    Value::Object(Rc::new(ObjectValue {
        class_name: Some(String::from("Console")),
        fields: vec![
            native("log", NativeFunction::ConsoleLog),
            native("error", NativeFunction::ConsoleError),
        ],
    }))
}
