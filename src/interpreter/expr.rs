use std::rc::Rc;

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    type_checker::{
        type_checker::compound_operator,
        typed_ast::{TypedAssignmentExpr, TypedCallExpr, TypedExpr, TypedNewExpr},
    },
    Position,
};

use super::{
    interpreter::Interpreter,
    scope::Scope,
    value::{ObjectValue, Value},
};

/// Evaluates an expression to a runtime value.
pub fn eval_expression(
    interpreter: &mut Interpreter,
    expression: &TypedExpr,
    scope: &Rc<Scope>,
) -> Result<Value, Error> {
    match expression {
        TypedExpr::Number(number) => Ok(Value::Number(number.value)),
        TypedExpr::String(string) => Ok(Value::String(string.value.clone())),
        TypedExpr::Boolean(boolean) => Ok(Value::Boolean(boolean.value)),
        TypedExpr::Template(template) => {
            let mut result = template.quasis.first().cloned().unwrap_or_default();
            for (expression, quasi) in template
                .expressions
                .iter()
                .zip(template.quasis.iter().skip(1))
            {
                result.push_str(&eval_expression(interpreter, expression, scope)?.to_js_string());
                result.push_str(quasi);
            }
            Ok(Value::String(result))
        }
        TypedExpr::Symbol(symbol) => scope.get(&symbol.value).ok_or_else(|| {
            Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: symbol.value.clone(),
                },
                symbol.span.start.clone(),
            )
        }),
        TypedExpr::Binary(binary) => {
            let left = eval_expression(interpreter, &binary.left, scope)?;

            match binary.operator.kind {
                TokenKind::And if !left.is_truthy() => Ok(left),
                TokenKind::Or if left.is_truthy() => Ok(left),
                TokenKind::And | TokenKind::Or => eval_expression(interpreter, &binary.right, scope),
                kind => {
                    let right = eval_expression(interpreter, &binary.right, scope)?;
                    apply_binary(kind, &left, &right, &binary.operator.span.start)
                }
            }
        }
        TypedExpr::Member(member) => {
            let object = eval_expression(interpreter, &member.object, scope)?;

            match object {
                Value::Object(object) => Ok(object
                    .get_field(&member.property)
                    .cloned()
                    .unwrap_or(Value::Undefined)),
                Value::String(string) if member.property == "length" => {
                    Ok(Value::Number(string.encode_utf16().count() as f64))
                }
                Value::Undefined => Err(type_error(
                    format!(
                        "Cannot read properties of undefined (reading '{}')",
                        member.property
                    ),
                    &member.span.start,
                )),
                _ => Ok(Value::Undefined),
            }
        }
        TypedExpr::Prefix(prefix) => {
            let right = eval_expression(interpreter, &prefix.right_expr, scope)?;

            match prefix.operator.kind {
                TokenKind::Dash => Ok(Value::Number(-right.to_number())),
                TokenKind::Not => Ok(Value::Boolean(!right.is_truthy())),
                _ => Err(unsupported_operator(
                    &prefix.operator.value,
                    &prefix.span.start,
                )),
            }
        }
        TypedExpr::Assignment(assignment) => eval_assignment(interpreter, assignment, scope),
        TypedExpr::Call(call) => eval_call(interpreter, call, scope),
        TypedExpr::New(new) => eval_new(interpreter, new, scope),
        TypedExpr::Object(object) => {
            let mut fields = Vec::with_capacity(object.fields.len());
            for (name, expression) in &object.fields {
                fields.push((name.clone(), eval_expression(interpreter, expression, scope)?));
            }

            Ok(Value::Object(Rc::new(ObjectValue {
                class_name: None,
                fields,
            })))
        }
    }
}

fn eval_assignment(
    interpreter: &mut Interpreter,
    assignment: &TypedAssignmentExpr,
    scope: &Rc<Scope>,
) -> Result<Value, Error> {
    let name = &assignment.assignee.value;
    let position = &assignment.assignee.span.start;
    let not_declared = || {
        Error::new(
            ErrorImpl::VariableNotDeclared {
                variable: name.clone(),
            },
            position.clone(),
        )
    };

    let right = eval_expression(interpreter, &assignment.value, scope)?;
    let value = match compound_operator(assignment.operator.kind) {
        Some(operator) => {
            let current = scope.get(name).ok_or_else(not_declared)?;
            apply_binary(operator, &current, &right, &assignment.operator.span.start)?
        }
        None => right,
    };

    if !scope.assign(name, value.clone()) {
        return Err(not_declared());
    }

    Ok(value)
}

fn eval_call(
    interpreter: &mut Interpreter,
    call: &TypedCallExpr,
    scope: &Rc<Scope>,
) -> Result<Value, Error> {
    let callee = eval_expression(interpreter, &call.callee, scope)?;

    let function = match callee {
        Value::Function(function) => function,
        _ => {
            return Err(type_error(
                format!("{} is not a function", describe_callee(&call.callee)),
                &call.span.start,
            ))
        }
    };

    let mut arguments = Vec::with_capacity(call.arguments.len());
    for argument in &call.arguments {
        arguments.push(eval_expression(interpreter, argument, scope)?);
    }

    interpreter.call_function(&function, arguments, &call.span.start)
}

fn eval_new(
    interpreter: &mut Interpreter,
    new: &TypedNewExpr,
    scope: &Rc<Scope>,
) -> Result<Value, Error> {
    if new.class != "Error" {
        return Err(Error::new(
            ErrorImpl::UnknownType {
                type_: new.class.clone(),
            },
            new.span.start.clone(),
        ));
    }

    let mut arguments = Vec::with_capacity(new.arguments.len());
    for argument in &new.arguments {
        arguments.push(eval_expression(interpreter, argument, scope)?);
    }

    let message = match arguments.first() {
        Some(Value::Undefined) | None => String::new(),
        Some(value) => value.to_js_string(),
    };

    Ok(Value::error(message))
}

/// Applies a non short-circuiting binary operator.
pub fn apply_binary(
    operator: TokenKind,
    left: &Value,
    right: &Value,
    position: &Position,
) -> Result<Value, Error> {
    let value = match operator {
        TokenKind::Plus => {
            let concatenates = |value: &Value| {
                matches!(
                    value,
                    Value::String(_) | Value::Object(_) | Value::Function(_)
                )
            };

            if concatenates(left) || concatenates(right) {
                Value::String(format!("{}{}", left.to_js_string(), right.to_js_string()))
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        TokenKind::Dash => Value::Number(left.to_number() - right.to_number()),
        TokenKind::Star => Value::Number(left.to_number() * right.to_number()),
        TokenKind::Slash => Value::Number(left.to_number() / right.to_number()),
        TokenKind::Percent => Value::Number(left.to_number() % right.to_number()),
        TokenKind::Less
        | TokenKind::LessEquals
        | TokenKind::Greater
        | TokenKind::GreaterEquals => Value::Boolean(compare(operator, left, right)),
        TokenKind::Equals => Value::Boolean(left.loose_equals(right)),
        TokenKind::NotEquals => Value::Boolean(!left.loose_equals(right)),
        TokenKind::StrictEquals => Value::Boolean(left.strict_equals(right)),
        TokenKind::StrictNotEquals => Value::Boolean(!left.strict_equals(right)),
        other => return Err(unsupported_operator(&other.to_string(), position)),
    };

    Ok(value)
}

fn compare(operator: TokenKind, left: &Value, right: &Value) -> bool {
    if let (Value::String(left), Value::String(right)) = (left, right) {
        return match operator {
            TokenKind::Less => left < right,
            TokenKind::LessEquals => left <= right,
            TokenKind::Greater => left > right,
            _ => left >= right,
        };
    }

    // NaN compares false either way
    let (left, right) = (left.to_number(), right.to_number());
    match operator {
        TokenKind::Less => left < right,
        TokenKind::LessEquals => left <= right,
        TokenKind::Greater => left > right,
        _ => left >= right,
    }
}

fn describe_callee(callee: &TypedExpr) -> String {
    match callee {
        TypedExpr::Symbol(symbol) => symbol.value.clone(),
        TypedExpr::Member(member) => {
            format!("{}.{}", describe_callee(&member.object), member.property)
        }
        _ => String::from("expression"),
    }
}

fn type_error(message: String, position: &Position) -> Error {
    Error::new(
        ErrorImpl::UncaughtException {
            message: format!("TypeError: {}", message),
        },
        position.clone(),
    )
}

fn unsupported_operator(operator: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::InvalidOperands {
            operator: operator.to_string(),
            left: String::from("any"),
            right: String::from("any"),
        },
        position.clone(),
    )
}
