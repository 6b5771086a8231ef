use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use tracing::{trace, warn};

use crate::{
    ast::{
        ast::{Expr, Stmt},
        statements::{BlockStmt, FnDeclStmt, ReturnStmt, VarDeclStmt, WhileStmt},
        types::{FunctionType, ObjectType, Type, TypeAnnotation},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::typed_ast::{
    TypedAssignmentExpr, TypedBinaryExpr, TypedBlockStmt, TypedBreakStmt, TypedCallExpr,
    TypedExpr, TypedExpressionStmt, TypedFnDeclStmt, TypedIfStmt, TypedMemberExpr,
    TypedNewExpr, TypedObjectExpr, TypedPrefixExpr, TypedReturnStmt, TypedStmt,
    TypedSymbolExpr, TypedTemplateExpr, TypedThrowStmt, TypedVarDeclStmt, TypedWhileStmt,
};

/// One lexical scope: a block, a function body or a single-statement branch.
#[derive(Debug, Default)]
pub struct Environment {
    /// `name -> (is_constant, type)`
    pub variable_lookup: HashMap<String, (bool, Type)>,
    pub functions: HashSet<String>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn declare_variable(
        &mut self,
        variable_name: String,
        variable_type: Type,
        is_constant: bool,
        current_position: Position,
    ) -> Result<(), Error> {
        if self.variable_lookup.contains_key(&variable_name) {
            Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: variable_name,
                },
                current_position,
            ))
        } else {
            self.variable_lookup
                .insert(variable_name, (is_constant, variable_type));
            Ok(())
        }
    }

    pub fn declare_function(
        &mut self,
        function_name: String,
        function_type: Type,
        current_position: Position,
    ) -> Result<(), Error> {
        if self.functions.contains(&function_name) {
            return Err(Error::new(
                ErrorImpl::FunctionAlreadyDeclared {
                    function: function_name,
                },
                current_position,
            ));
        }

        self.declare_variable(
            function_name.clone(),
            function_type,
            false,
            current_position,
        )?;
        self.functions.insert(function_name);
        Ok(())
    }

    pub fn get_variable(&self, variable_name: &str) -> Option<&(bool, Type)> {
        self.variable_lookup.get(variable_name)
    }

    fn set_variable_type(&mut self, variable_name: &str, variable_type: Type) {
        if let Some(variable) = self.variable_lookup.get_mut(variable_name) {
            variable.1 = variable_type;
        }
    }
}

/// What the checker knows about the function whose body it is inside.
#[derive(Debug)]
struct FunctionContext {
    name: String,
    declared_return: Option<Type>,
    /// Types of the `return` statements seen so far, `None` for a bare `return;`
    returned: Vec<(Option<Type>, Position)>,
}

#[derive(Debug)]
pub struct TypeChecker {
    pub typed_ast: TypedBlockStmt,
    pub built_in_types: HashMap<String, Type>,
    pub globals: HashMap<String, Type>,
    /// Innermost scope last. The root scope is kept after checking.
    pub environments: Vec<Environment>,
    functions: Vec<FunctionContext>,
    /// One entry per enclosing loop of the current function: whether a
    /// `break` targets it.
    loops: Vec<bool>,
}

impl Default for TypeChecker {
    fn default() -> Self {
        TypeChecker::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        let mut type_checker = TypeChecker {
            typed_ast: TypedBlockStmt {
                body: vec![],
                span: Span {
                    start: Position::null(),
                    end: Position::null(),
                },
            },
            built_in_types: HashMap::new(),
            globals: HashMap::new(),
            environments: vec![],
            functions: vec![],
            loops: vec![],
        };

        // Built in types
        let built_in_types = [
            ("number", Type::number()),
            ("string", Type::string()),
            ("boolean", Type::boolean()),
            ("any", Type::Any),
            ("void", Type::Void),
            ("never", Type::Never),
            (
                "object",
                Type::Object(ObjectType {
                    name: Some(String::from("object")),
                    fields: vec![],
                }),
            ),
            ("Error", error_type()),
        ];
        for (name, ty) in built_in_types {
            type_checker.built_in_types.insert(String::from(name), ty);
        }

        // Built in values
        let console_method = |name: &str| {
            (
                String::from(name),
                Type::Function(FunctionType {
                    name: String::from(name),
                    is_native: true,
                    arguments: vec![(String::from("args"), Type::Any)],
                    return_type: Box::new(Type::Void),
                    is_var_args: true,
                }),
            )
        };
        type_checker.globals.insert(
            String::from("console"),
            Type::Object(ObjectType {
                name: Some(String::from("Console")),
                fields: vec![console_method("log"), console_method("error")],
            }),
        );

        type_checker
    }

    pub fn push_environment(&mut self) {
        self.environments.push(Environment::new());
    }

    pub fn pop_environment(&mut self) {
        self.environments.pop();
    }

    pub fn get_current_environment(&mut self) -> &mut Environment {
        if self.environments.is_empty() {
            self.push_environment();
        }
        let last = self.environments.len() - 1;
        &mut self.environments[last]
    }

    /// Looks a name up from the innermost scope outwards, then in the
    /// globals. Returns `(is_constant, type)`.
    pub fn fetch_variable_type(&self, variable: &str) -> Option<(bool, Type)> {
        self.environments
            .iter()
            .rev()
            .find_map(|environment| environment.get_variable(variable).cloned())
            .or_else(|| self.globals.get(variable).map(|ty| (true, ty.clone())))
    }

    pub fn convert_type(&self, annotation: &TypeAnnotation) -> Result<Type, Error> {
        match annotation {
            TypeAnnotation::Symbol(symbol) => {
                self.built_in_types.get(&symbol.name).cloned().ok_or_else(|| {
                    Error::new(
                        ErrorImpl::UnknownType {
                            type_: symbol.name.clone(),
                        },
                        annotation.get_position(),
                    )
                })
            }
            TypeAnnotation::Object(object) => {
                let mut fields = vec![];
                for (name, field) in object.fields.iter() {
                    fields.push((name.clone(), self.convert_type(field)?));
                }
                Ok(Type::Object(ObjectType { name: None, fields }))
            }
        }
    }
}

/// The type of `new Error(message)`.
pub fn error_type() -> Type {
    Type::Object(ObjectType {
        name: Some(String::from("Error")),
        fields: vec![
            (String::from("name"), Type::string()),
            (String::from("message"), Type::string()),
        ],
    })
}

fn type_match_error(expected: &Type, received: &Type, position: Position) -> Error {
    Error::new(
        ErrorImpl::TypeMatchError {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        position,
    )
}

fn invalid_operands(operator: &Token, left: &Type, right: &Type) -> Error {
    Error::new(
        ErrorImpl::InvalidOperands {
            operator: operator.value.clone(),
            left: left.to_string(),
            right: right.to_string(),
        },
        operator.span.start.clone(),
    )
}

fn check_condition(condition: &TypedExpr) -> Result<(), Error> {
    if condition.get_type() == Type::Void {
        return Err(Error::new(
            ErrorImpl::VoidTruthiness,
            condition.get_span().start.clone(),
        ));
    }
    Ok(())
}

fn is_numeric(ty: &Type) -> bool {
    *ty == Type::number() || ty.is_any()
}

/// Result type of a binary operator, or `None` if the operands do not fit.
fn binary_result_type(operator: TokenKind, left: &Type, right: &Type) -> Option<Type> {
    // `&&` and `||` may skip their right operand
    if let TokenKind::And | TokenKind::Or = operator {
        if left.is_never() {
            return Some(Type::Never);
        }
        if right.is_never() {
            return Some(left.clone());
        }
    } else if left.is_never() || right.is_never() {
        return Some(Type::Never);
    }

    match operator {
        TokenKind::Plus => {
            if left.is_any() || right.is_any() {
                Some(Type::Any)
            } else if *left == Type::number() && *right == Type::number() {
                Some(Type::number())
            } else if *left == Type::string() || *right == Type::string() {
                Some(Type::string())
            } else {
                None
            }
        }
        TokenKind::Dash | TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
            (is_numeric(left) && is_numeric(right)).then(Type::number)
        }
        TokenKind::Less | TokenKind::LessEquals | TokenKind::Greater | TokenKind::GreaterEquals => {
            let comparable = left.is_any()
                || right.is_any()
                || (left == right && (*left == Type::number() || *left == Type::string()));
            comparable.then(Type::boolean)
        }
        TokenKind::Equals
        | TokenKind::NotEquals
        | TokenKind::StrictEquals
        | TokenKind::StrictNotEquals => {
            let overlapping = left.is_compatible_with(right) || right.is_compatible_with(left);
            overlapping.then(Type::boolean)
        }
        TokenKind::And | TokenKind::Or => {
            if left == right {
                Some(left.clone())
            } else {
                Some(Type::Any)
            }
        }
        _ => None,
    }
}

/// Maps `+=` and friends to the operator they apply.
pub fn compound_operator(kind: TokenKind) -> Option<TokenKind> {
    match kind {
        TokenKind::PlusEquals => Some(TokenKind::Plus),
        TokenKind::MinusEquals => Some(TokenKind::Dash),
        TokenKind::StarEquals => Some(TokenKind::Star),
        TokenKind::SlashEquals => Some(TokenKind::Slash),
        _ => None,
    }
}

fn type_check_arguments(
    type_checker: &mut TypeChecker,
    arguments: &[Expr],
) -> Result<Vec<TypedExpr>, Error> {
    arguments
        .iter()
        .map(|argument| type_check_expr(type_checker, argument))
        .collect()
}

/// Checks call arguments against a signature: arity first, then each
/// argument's assignability to its parameter.
fn check_call_arguments(
    function: &FunctionType,
    arguments: &[TypedExpr],
    call_span: &Span,
) -> Result<(), Error> {
    if arguments.len() > function.arguments.len() && !function.is_var_args {
        return Err(Error::new(
            ErrorImpl::UnexpectedArguments {
                expected: function.arguments.len(),
                received: arguments.len(),
            },
            arguments[function.arguments.len()].get_span().start.clone(),
        ));
    } else if arguments.len() < function.required_arguments() {
        return Err(Error::new(
            ErrorImpl::MissingArguments {
                expected: function.required_arguments(),
                received: arguments.len(),
            },
            call_span.end.clone(),
        ));
    }

    for (index, argument) in arguments.iter().enumerate() {
        let argument_type = argument.get_type();
        if let Some(parameter_type) = function.get_argument_type(index) {
            if !argument_type.is_compatible_with(parameter_type) {
                return Err(Error::new(
                    ErrorImpl::ArgumentTypeMatchError {
                        expected: parameter_type.to_string(),
                        received: argument_type.to_string(),
                    },
                    argument.get_span().start.clone(),
                ));
            }
        }
    }

    Ok(())
}

pub fn type_check_expr(type_checker: &mut TypeChecker, ast: &Expr) -> Result<TypedExpr, Error> {
    match ast {
        Expr::Number(number) => Ok(TypedExpr::Number(number.clone())),
        Expr::String(string) => Ok(TypedExpr::String(string.clone())),
        Expr::Boolean(boolean) => Ok(TypedExpr::Boolean(boolean.clone())),
        Expr::Template(template) => Ok(TypedExpr::Template(TypedTemplateExpr {
            quasis: template.quasis.clone(),
            expressions: type_check_arguments(type_checker, &template.expressions)?,
            span: template.span.clone(),
        })),
        Expr::Symbol(symbol) => {
            let (_, var_type) = type_checker
                .fetch_variable_type(&symbol.value)
                .ok_or_else(|| {
                    Error::new(
                        ErrorImpl::VariableNotDeclared {
                            variable: symbol.value.clone(),
                        },
                        symbol.span.start.clone(),
                    )
                })?;

            Ok(TypedExpr::Symbol(TypedSymbolExpr {
                value: symbol.value.clone(),
                var_type,
                span: symbol.span.clone(),
            }))
        }
        Expr::Binary(binary) => {
            let left = type_check_expr(type_checker, &binary.left)?;
            let right = type_check_expr(type_checker, &binary.right)?;
            let (left_type, right_type) = (left.get_type(), right.get_type());

            if matches!(binary.operator.kind, TokenKind::And | TokenKind::Or) {
                check_condition(&left)?;
            }

            let result_type = binary_result_type(binary.operator.kind, &left_type, &right_type)
                .ok_or_else(|| invalid_operands(&binary.operator, &left_type, &right_type))?;

            Ok(TypedExpr::Binary(TypedBinaryExpr {
                left: Box::new(left),
                operator: binary.operator.clone(),
                right: Box::new(right),
                result_type,
                span: binary.span.clone(),
            }))
        }
        Expr::Member(member) => {
            let object = type_check_expr(type_checker, &member.object)?;
            let object_type = object.get_type();

            let result_type = if object_type.is_never() {
                Type::Never
            } else {
                object_type
                    .get_property_type(&member.property)
                    .ok_or_else(|| {
                        Error::new(
                            ErrorImpl::UnknownProperty {
                                property: member.property.clone(),
                                type_: object_type.to_string(),
                            },
                            member.span.start.clone(),
                        )
                    })?
            };

            Ok(TypedExpr::Member(TypedMemberExpr {
                object: Box::new(object),
                property: member.property.clone(),
                result_type,
                span: member.span.clone(),
            }))
        }
        Expr::Prefix(prefix) => {
            let right = type_check_expr(type_checker, &prefix.right_expr)?;
            let right_type = right.get_type();

            let result_type = match prefix.operator.kind {
                _ if right_type.is_never() => Type::Never,
                TokenKind::Not => {
                    check_condition(&right)?;
                    Type::boolean()
                }
                TokenKind::Dash if is_numeric(&right_type) => Type::number(),
                _ => {
                    return Err(Error::new(
                        ErrorImpl::InvalidOperands {
                            operator: prefix.operator.value.clone(),
                            left: String::new(),
                            right: right_type.to_string(),
                        },
                        prefix.span.start.clone(),
                    ))
                }
            };

            Ok(TypedExpr::Prefix(TypedPrefixExpr {
                operator: prefix.operator.clone(),
                right_expr: Box::new(right),
                result_type,
                span: prefix.span.clone(),
            }))
        }
        Expr::Assignment(assignment) => {
            let symbol = match assignment.assignee.as_ref() {
                Expr::Symbol(symbol) => symbol,
                other => {
                    return Err(Error::new(
                        ErrorImpl::InvalidAssignmentTarget,
                        other.get_span().start.clone(),
                    ))
                }
            };

            let (is_constant, var_type) = type_checker
                .fetch_variable_type(&symbol.value)
                .ok_or_else(|| {
                    Error::new(
                        ErrorImpl::VariableNotDeclared {
                            variable: symbol.value.clone(),
                        },
                        symbol.span.start.clone(),
                    )
                })?;

            if is_constant {
                return Err(Error::new(
                    ErrorImpl::ConstantReassignment {
                        variable: symbol.value.clone(),
                    },
                    assignment.span.start.clone(),
                ));
            }

            let value = type_check_expr(type_checker, &assignment.value)?;
            let value_type = value.get_type();

            let result_type = match compound_operator(assignment.operator.kind) {
                None => value_type,
                Some(operator) => binary_result_type(operator, &var_type, &value_type)
                    .ok_or_else(|| invalid_operands(&assignment.operator, &var_type, &value_type))?,
            };

            if !result_type.is_compatible_with(&var_type) {
                return Err(type_match_error(
                    &var_type,
                    &result_type,
                    value.get_span().start.clone(),
                ));
            }

            Ok(TypedExpr::Assignment(TypedAssignmentExpr {
                assignee: TypedSymbolExpr {
                    value: symbol.value.clone(),
                    var_type,
                    span: symbol.span.clone(),
                },
                operator: assignment.operator.clone(),
                value: Box::new(value),
                result_type,
                span: assignment.span.clone(),
            }))
        }
        Expr::Call(call) => {
            let callee = type_check_expr(type_checker, &call.callee)?;
            let arguments = type_check_arguments(type_checker, &call.arguments)?;

            let return_type = match callee.get_type() {
                Type::Function(function) => {
                    check_call_arguments(&function, &arguments, &call.span)?;
                    *function.return_type
                }
                Type::Any => Type::Any,
                Type::Never => Type::Never,
                other => {
                    return Err(Error::new(
                        ErrorImpl::NotCallable {
                            type_: other.to_string(),
                        },
                        callee.get_span().start.clone(),
                    ))
                }
            };

            Ok(TypedExpr::Call(TypedCallExpr {
                callee: Box::new(callee),
                arguments,
                return_type,
                span: call.span.clone(),
            }))
        }
        Expr::New(new) => {
            // `Error` is the only constructible class
            let result_type = match type_checker.built_in_types.get(&new.class) {
                Some(ty) if new.class == "Error" => ty.clone(),
                _ => {
                    return Err(Error::new(
                        ErrorImpl::UnknownType {
                            type_: new.class.clone(),
                        },
                        new.span.start.clone(),
                    ))
                }
            };

            let arguments = type_check_arguments(type_checker, &new.arguments)?;
            let constructor = FunctionType {
                name: new.class.clone(),
                is_native: true,
                arguments: vec![(String::from("message"), Type::string())],
                return_type: Box::new(result_type.clone()),
                is_var_args: false,
            };
            if !arguments.is_empty() {
                check_call_arguments(&constructor, &arguments, &new.span)?;
            }

            Ok(TypedExpr::New(TypedNewExpr {
                class: new.class.clone(),
                arguments,
                result_type,
                span: new.span.clone(),
            }))
        }
        Expr::Object(object) => {
            let mut fields = vec![];
            let mut field_types = vec![];
            for (name, value) in object.fields.iter() {
                let value = type_check_expr(type_checker, value)?;
                field_types.push((name.clone(), value.get_type()));
                fields.push((name.clone(), value));
            }

            Ok(TypedExpr::Object(TypedObjectExpr {
                fields,
                result_type: Type::Object(ObjectType {
                    name: None,
                    fields: field_types,
                }),
                span: object.span.clone(),
            }))
        }
    }
}

/// The signature a function is visible with before its body is checked.
fn hoisted_signature(type_checker: &TypeChecker, function: &FnDeclStmt) -> Result<FunctionType, Error> {
    let mut arguments = vec![];
    for parameter in function.parameters.iter() {
        let ty = match &parameter.explicit_type {
            Some(annotation) => type_checker.convert_type(annotation)?,
            None => Type::Any,
        };
        arguments.push((parameter.name.clone(), ty));
    }

    let return_type = match &function.return_type {
        Some(annotation) => type_checker.convert_type(annotation)?,
        None => Type::Any,
    };

    Ok(FunctionType {
        name: function.identifier.clone(),
        is_native: false,
        arguments,
        return_type: Box::new(return_type),
        is_var_args: false,
    })
}

fn hoist_functions(type_checker: &mut TypeChecker, statements: &[Stmt]) -> Result<(), Error> {
    for stmt in statements {
        if let Stmt::FnDecl(function) = stmt {
            let signature = hoisted_signature(type_checker, function)?;
            type_checker.get_current_environment().declare_function(
                function.identifier.clone(),
                Type::Function(signature),
                function.span.start.clone(),
            )?;
        }
    }
    Ok(())
}

/// Checks a statement list in the current scope.
///
/// Returns the typed statements and whether control can flow past the
/// end of the list.
pub fn type_check_statements(
    type_checker: &mut TypeChecker,
    statements: &[Stmt],
) -> Result<(Vec<TypedStmt>, bool), Error> {
    hoist_functions(type_checker, statements)?;

    let mut body = vec![];
    let mut completes = true;
    let mut reported = false;

    for stmt in statements {
        if !completes && !reported && !matches!(stmt, Stmt::FnDecl(_)) {
            let position = &stmt.get_span().start;
            warn!(file = %position.1, offset = position.0, "unreachable code detected");
            reported = true;
        }

        let (typed, stmt_completes) = type_check_stmt(type_checker, stmt)?;
        completes = completes && stmt_completes;
        body.push(typed);
    }

    Ok((body, completes))
}

/// Checks a branch or loop body in a scope of its own.
fn type_check_scoped_stmt(
    type_checker: &mut TypeChecker,
    stmt: &Stmt,
) -> Result<(TypedStmt, bool), Error> {
    if let Stmt::Block(_) = stmt {
        return type_check_stmt(type_checker, stmt);
    }

    type_checker.push_environment();
    let result = hoist_functions(type_checker, std::slice::from_ref(stmt))
        .and_then(|_| type_check_stmt(type_checker, stmt));
    type_checker.pop_environment();
    result
}

fn type_check_var_decl(
    type_checker: &mut TypeChecker,
    var_decl_stmt: &VarDeclStmt,
) -> Result<(TypedStmt, bool), Error> {
    let explicit_type = match &var_decl_stmt.explicit_type {
        Some(annotation) => Some(type_checker.convert_type(annotation)?),
        None => None,
    };
    let assigned_value = match &var_decl_stmt.assigned_value {
        Some(value) => Some(type_check_expr(type_checker, value)?),
        None => None,
    };

    let var_type = match (explicit_type, &assigned_value) {
        (Some(explicit_type), Some(value)) => {
            let value_type = value.get_type();
            if !value_type.is_compatible_with(&explicit_type) {
                return Err(type_match_error(
                    &explicit_type,
                    &value_type,
                    value.get_span().start.clone(),
                ));
            }
            explicit_type
        }
        (Some(explicit_type), None) => explicit_type,
        (None, Some(value)) => value.get_type(),
        (None, None) => {
            return Err(Error::new(
                ErrorImpl::ExpectedExplicitValue,
                var_decl_stmt.span.end.clone(),
            ))
        }
    };

    type_checker.get_current_environment().declare_variable(
        var_decl_stmt.identifier.clone(),
        var_type.clone(),
        var_decl_stmt.is_constant,
        var_decl_stmt.span.start.clone(),
    )?;

    let completes = !assigned_value
        .as_ref()
        .is_some_and(|value| value.get_type().is_never());

    Ok((
        TypedStmt::VarDecl(TypedVarDeclStmt {
            identifier: var_decl_stmt.identifier.clone(),
            is_constant: var_decl_stmt.is_constant,
            assigned_value,
            var_type,
            span: var_decl_stmt.span.clone(),
        }),
        completes,
    ))
}

fn type_check_while(
    type_checker: &mut TypeChecker,
    while_stmt: &WhileStmt,
) -> Result<(TypedStmt, bool), Error> {
    let condition = type_check_expr(type_checker, &while_stmt.condition)?;
    check_condition(&condition)?;

    type_checker.loops.push(false);
    let body = type_check_scoped_stmt(type_checker, &while_stmt.body);
    let broken = type_checker.loops.pop().unwrap_or(false);
    let (body, _) = body?;

    // `while (true)` only ends through a `break` that targets it
    let is_infinite = matches!(&while_stmt.condition, Expr::Boolean(boolean) if boolean.value);

    Ok((
        TypedStmt::While(TypedWhileStmt {
            condition,
            body: Box::new(body),
            span: while_stmt.span.clone(),
        }),
        !is_infinite || broken,
    ))
}

fn type_check_return(
    type_checker: &mut TypeChecker,
    return_stmt: &ReturnStmt,
) -> Result<(TypedStmt, bool), Error> {
    if type_checker.functions.is_empty() {
        return Err(Error::new(
            ErrorImpl::ReturnOutsideFunction,
            return_stmt.span.start.clone(),
        ));
    }

    let value = match &return_stmt.value {
        Some(value) => Some(type_check_expr(type_checker, value)?),
        None => None,
    };
    let value_type = value.as_ref().map(TypedExpr::get_type);

    let Some(function) = type_checker.functions.last_mut() else {
        return Err(Error::new(
            ErrorImpl::ReturnOutsideFunction,
            return_stmt.span.start.clone(),
        ));
    };

    let value_position = value
        .as_ref()
        .map(|value| value.get_span().start.clone())
        .unwrap_or_else(|| return_stmt.span.start.clone());

    match (&function.declared_return, &value_type) {
        (Some(Type::Void), Some(value_type)) => {
            if !value_type.is_compatible_with(&Type::Void) {
                return Err(Error::new(
                    ErrorImpl::VoidFunctionReturnedValue,
                    value_position,
                ));
            }
        }
        (Some(Type::Never), Some(Type::Never)) => {}
        (Some(Type::Never), _) => {
            return Err(type_match_error(
                &Type::Never,
                value_type.as_ref().unwrap_or(&Type::Void),
                return_stmt.span.start.clone(),
            ));
        }
        (Some(Type::Any), _) | (Some(Type::Void), None) => {}
        (Some(expected), None) => {
            return Err(Error::new(
                ErrorImpl::MissingReturnValue {
                    expected: expected.to_string(),
                },
                return_stmt.span.start.clone(),
            ));
        }
        (Some(expected), Some(value_type)) => {
            if !value_type.is_compatible_with(expected) {
                return Err(type_match_error(expected, value_type, value_position));
            }
        }
        (None, _) => {}
    }

    function.returned.push((value_type, value_position));

    Ok((
        TypedStmt::Return(TypedReturnStmt {
            value,
            span: return_stmt.span.clone(),
        }),
        false,
    ))
}

/// Decides a function's final return type once its body is checked.
///
/// `end_reachable` is whether control can fall off the closing brace.
fn resolve_return_type(
    function: &FnDeclStmt,
    context: &FunctionContext,
    end_reachable: bool,
) -> Result<Type, Error> {
    let end = &function.body.span.end;
    let end_position = Position(end.0.saturating_sub(1), Rc::clone(&end.1));

    match &context.declared_return {
        Some(Type::Never) => {
            if end_reachable {
                return Err(Error::new(
                    ErrorImpl::NeverFunctionReturns {
                        function: context.name.clone(),
                    },
                    end_position,
                ));
            }
            Ok(Type::Never)
        }
        Some(Type::Void) => Ok(Type::Void),
        Some(Type::Any) => Ok(Type::Any),
        Some(expected) => {
            if end_reachable {
                return Err(Error::new(
                    ErrorImpl::FunctionLacksReturn {
                        function: context.name.clone(),
                        expected: expected.to_string(),
                    },
                    end_position,
                ));
            }
            Ok(expected.clone())
        }
        None => infer_return_type(context, end_reachable, end_position),
    }
}

fn infer_return_type(
    context: &FunctionContext,
    end_reachable: bool,
    end_position: Position,
) -> Result<Type, Error> {
    // Returning a `never` expression says nothing about the result type
    let valued: Vec<&(Option<Type>, Position)> = context
        .returned
        .iter()
        .filter(|(ty, _)| !matches!(ty, Some(Type::Never) | None))
        .collect();

    let Some((Some(first), _)) = valued.first() else {
        return Ok(Type::Void);
    };

    let mut inferred = first.clone();
    for (ty, position) in valued.iter().skip(1) {
        let Some(ty) = ty else { continue };
        if ty.is_any() || inferred.is_any() {
            inferred = Type::Any;
        } else if *ty != inferred {
            return Err(type_match_error(&inferred, ty, position.clone()));
        }
    }

    if let Some((_, position)) = context.returned.iter().find(|(ty, _)| ty.is_none()) {
        return Err(Error::new(
            ErrorImpl::MissingReturnValue {
                expected: inferred.to_string(),
            },
            position.clone(),
        ));
    }

    if end_reachable {
        return Err(Error::new(
            ErrorImpl::FunctionLacksReturn {
                function: context.name.clone(),
                expected: inferred.to_string(),
            },
            end_position,
        ));
    }

    Ok(inferred)
}

fn type_check_fn_decl(
    type_checker: &mut TypeChecker,
    fn_decl_stmt: &FnDeclStmt,
) -> Result<(TypedStmt, bool), Error> {
    let signature = hoisted_signature(type_checker, fn_decl_stmt)?;
    trace!(function = %fn_decl_stmt.identifier, "checking function body");

    let saved_loops = std::mem::take(&mut type_checker.loops);
    type_checker.functions.push(FunctionContext {
        name: fn_decl_stmt.identifier.clone(),
        declared_return: fn_decl_stmt
            .return_type
            .as_ref()
            .map(|_| (*signature.return_type).clone()),
        returned: vec![],
    });
    type_checker.push_environment();

    let mut result = Ok(());
    for (parameter, (name, ty)) in fn_decl_stmt.parameters.iter().zip(signature.arguments.iter()) {
        result = type_checker.get_current_environment().declare_variable(
            name.clone(),
            ty.clone(),
            false,
            parameter.span.start.clone(),
        );
        if result.is_err() {
            break;
        }
    }
    let body = result.and_then(|_| type_check_statements(type_checker, &fn_decl_stmt.body.body));

    type_checker.pop_environment();
    let context = type_checker.functions.pop();
    type_checker.loops = saved_loops;

    let (body, end_reachable) = body?;
    let return_type = match &context {
        Some(context) => resolve_return_type(fn_decl_stmt, context, end_reachable)?,
        None => Type::Any,
    };

    let function_type = FunctionType {
        return_type: Box::new(return_type),
        ..signature
    };
    type_checker.get_current_environment().set_variable_type(
        &fn_decl_stmt.identifier,
        Type::Function(function_type.clone()),
    );

    Ok((
        TypedStmt::FnDecl(TypedFnDeclStmt {
            identifier: fn_decl_stmt.identifier.clone(),
            function_type,
            body: Rc::new(TypedBlockStmt {
                body,
                span: fn_decl_stmt.body.span.clone(),
            }),
            span: fn_decl_stmt.span.clone(),
        }),
        true,
    ))
}

/// Checks one statement, returning it typed along with whether control
/// can continue to the next statement.
pub fn type_check_stmt(type_checker: &mut TypeChecker, ast: &Stmt) -> Result<(TypedStmt, bool), Error> {
    match ast {
        Stmt::Block(block) => {
            type_checker.push_environment();
            let result = type_check_statements(type_checker, &block.body);
            type_checker.pop_environment();
            let (body, completes) = result?;

            Ok((
                TypedStmt::Block(TypedBlockStmt {
                    body,
                    span: block.span.clone(),
                }),
                completes,
            ))
        }
        Stmt::Expression(expression_stmt) => {
            let expression = type_check_expr(type_checker, &expression_stmt.expression)?;
            let completes = !expression.get_type().is_never();

            Ok((
                TypedStmt::Expression(TypedExpressionStmt { expression }),
                completes,
            ))
        }
        Stmt::VarDecl(var_decl_stmt) => type_check_var_decl(type_checker, var_decl_stmt),
        Stmt::If(if_stmt) => {
            let condition = type_check_expr(type_checker, &if_stmt.condition)?;
            check_condition(&condition)?;

            let (then_body, then_completes) =
                type_check_scoped_stmt(type_checker, &if_stmt.then_body)?;
            let (else_body, else_completes) = match &if_stmt.else_body {
                Some(else_body) => {
                    let (else_body, completes) = type_check_scoped_stmt(type_checker, else_body)?;
                    (Some(Box::new(else_body)), completes)
                }
                None => (None, true),
            };

            Ok((
                TypedStmt::If(TypedIfStmt {
                    condition,
                    then_body: Box::new(then_body),
                    else_body,
                    span: if_stmt.span.clone(),
                }),
                then_completes || else_completes,
            ))
        }
        Stmt::While(while_stmt) => type_check_while(type_checker, while_stmt),
        Stmt::FnDecl(fn_decl_stmt) => type_check_fn_decl(type_checker, fn_decl_stmt),
        Stmt::Return(return_stmt) => type_check_return(type_checker, return_stmt),
        Stmt::Break(break_stmt) => match type_checker.loops.last_mut() {
            Some(broken) => {
                *broken = true;
                Ok((
                    TypedStmt::Break(TypedBreakStmt {
                        span: break_stmt.span.clone(),
                    }),
                    false,
                ))
            }
            None => Err(Error::new(
                ErrorImpl::BreakOutsideLoop,
                break_stmt.span.start.clone(),
            )),
        },
        Stmt::Throw(throw_stmt) => Ok((
            TypedStmt::Throw(TypedThrowStmt {
                value: type_check_expr(type_checker, &throw_stmt.value)?,
                span: throw_stmt.span.clone(),
            }),
            false,
        )),
    }
}

/// Type checks a whole program.
///
/// On success the typed program is stored in `typed_ast`; the root scope
/// stays on the environment stack so its bindings can be inspected.
pub fn type_check(ast: BlockStmt) -> (TypeChecker, Option<Error>) {
    let mut type_checker = TypeChecker::new();
    type_checker.push_environment();

    match type_check_statements(&mut type_checker, &ast.body) {
        Ok((body, _)) => {
            type_checker.typed_ast = TypedBlockStmt {
                body,
                span: ast.span,
            };
            (type_checker, None)
        }
        Err(error) => (type_checker, Some(error)),
    }
}
