use std::rc::Rc;

use crate::{
    errors::errors::{Error, ErrorImpl},
    type_checker::typed_ast::{TypedBlockStmt, TypedStmt, TypedWhileStmt},
};

use super::{
    expr::eval_expression,
    interpreter::Interpreter,
    scope::Scope,
    value::{FunctionValue, Value},
};

/// How a statement finished.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
}

/// Runs a block in `scope`, after declaring the functions it contains so
/// they can be called before their declaration.
pub fn exec_block(
    interpreter: &mut Interpreter,
    block: &TypedBlockStmt,
    scope: &Rc<Scope>,
) -> Result<Flow, Error> {
    for statement in block.iter() {
        if let TypedStmt::FnDecl(function) = statement {
            let closure = FunctionValue::User {
                declaration: function.clone(),
                closure: Rc::clone(scope),
            };
            scope.declare(
                function.identifier.clone(),
                Value::Function(Rc::new(closure)),
            );
        }
    }

    for statement in block.iter() {
        match exec_statement(interpreter, statement, scope)? {
            Flow::Normal => {}
            flow => return Ok(flow),
        }
    }

    Ok(Flow::Normal)
}

pub fn exec_statement(
    interpreter: &mut Interpreter,
    statement: &TypedStmt,
    scope: &Rc<Scope>,
) -> Result<Flow, Error> {
    match statement {
        TypedStmt::Expression(expression_stmt) => {
            eval_expression(interpreter, &expression_stmt.expression, scope)?;
            Ok(Flow::Normal)
        }
        TypedStmt::Block(block) => exec_block(interpreter, block, &Scope::child(scope)),
        TypedStmt::VarDecl(var_decl) => {
            let value = match &var_decl.assigned_value {
                Some(expression) => eval_expression(interpreter, expression, scope)?,
                None => Value::Undefined,
            };
            scope.declare(var_decl.identifier.clone(), value);
            Ok(Flow::Normal)
        }
        TypedStmt::If(if_stmt) => {
            if eval_expression(interpreter, &if_stmt.condition, scope)?.is_truthy() {
                exec_statement(interpreter, &if_stmt.then_body, scope)
            } else if let Some(else_body) = &if_stmt.else_body {
                exec_statement(interpreter, else_body, scope)
            } else {
                Ok(Flow::Normal)
            }
        }
        TypedStmt::While(while_stmt) => exec_while(interpreter, while_stmt, scope),
        // Declared when the enclosing block was entered
        TypedStmt::FnDecl(_) => Ok(Flow::Normal),
        TypedStmt::Return(return_stmt) => {
            let value = match &return_stmt.value {
                Some(expression) => eval_expression(interpreter, expression, scope)?,
                None => Value::Undefined,
            };
            Ok(Flow::Return(value))
        }
        TypedStmt::Break(_) => Ok(Flow::Break),
        TypedStmt::Throw(throw_stmt) => {
            let value = eval_expression(interpreter, &throw_stmt.value, scope)?;
            Err(Error::new(
                ErrorImpl::UncaughtException {
                    message: value.to_console_string(),
                },
                throw_stmt.span.start.clone(),
            ))
        }
    }
}

fn exec_while(
    interpreter: &mut Interpreter,
    while_stmt: &TypedWhileStmt,
    scope: &Rc<Scope>,
) -> Result<Flow, Error> {
    let mut iterations: u64 = 0;

    while eval_expression(interpreter, &while_stmt.condition, scope)?.is_truthy() {
        if let Some(limit) = interpreter.config.max_loop_iterations {
            if iterations >= limit {
                return Err(Error::new(
                    ErrorImpl::IterationLimitExceeded { limit },
                    while_stmt.span.start.clone(),
                ));
            }
        }
        iterations += 1;

        match exec_statement(interpreter, &while_stmt.body, scope)? {
            Flow::Normal => {}
            Flow::Break => break,
            flow @ Flow::Return(_) => return Ok(flow),
        }
    }

    Ok(Flow::Normal)
}
