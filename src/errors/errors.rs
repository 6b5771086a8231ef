use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Error, Debug, Clone)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedTemplate => "UnterminatedTemplate",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::ConstantReassignment { .. } => "ConstantReassignment",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ExpectedExplicitValue => "ExpectedExplicitValue",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UnknownProperty { .. } => "UnknownProperty",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::InvalidOperands { .. } => "InvalidOperands",
            ErrorImpl::VoidTruthiness => "VoidTruthiness",
            ErrorImpl::VoidFunctionReturnedValue => "VoidFunctionReturnedValue",
            ErrorImpl::NeverFunctionReturns { .. } => "NeverFunctionReturns",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::FunctionLacksReturn { .. } => "FunctionLacksReturn",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::BreakOutsideLoop => "BreakOutsideLoop",
            ErrorImpl::UncaughtException { .. } => "UncaughtException",
            ErrorImpl::IterationLimitExceeded { .. } => "IterationLimitExceeded",
            ErrorImpl::CallStackExceeded { .. } => "CallStackExceeded",
            ErrorImpl::OutputError { .. } => "OutputError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnterminatedTemplate => ErrorTip::Suggestion(String::from(
                "Template substitution `${` is never closed with `}`",
            )),
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("Invalid number: `{}`", token))
            }
            ErrorImpl::VariableAlreadyDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` already declared", variable))
            }
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Cannot find name `{}`", variable))
            }
            ErrorImpl::ConstantReassignment { variable } => ErrorTip::Suggestion(format!(
                "Cannot assign to `{}` because it is a constant",
                variable
            )),
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "The left-hand side of an assignment must be a variable",
            )),
            ErrorImpl::UnexpectedArguments { expected, received } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Argument of type `{}` is not assignable to parameter of type `{}`",
                    received, expected
                ))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Type `{}` is not assignable to type `{}`",
                received, expected
            )),
            ErrorImpl::ExpectedExplicitValue => ErrorTip::Suggestion(String::from(
                "Expected explicit value when no type is given",
            )),
            ErrorImpl::FunctionAlreadyDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already declared", function))
            }
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::UnknownProperty { property, type_ } => ErrorTip::Suggestion(format!(
                "Property `{}` does not exist on type `{}`",
                property, type_
            )),
            ErrorImpl::NotCallable { type_ } => {
                ErrorTip::Suggestion(format!("Type `{}` has no call signatures", type_))
            }
            ErrorImpl::InvalidOperands {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` cannot be applied to types `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::VoidTruthiness => ErrorTip::Suggestion(String::from(
                "An expression of type `void` cannot be tested for truthiness",
            )),
            ErrorImpl::VoidFunctionReturnedValue => ErrorTip::Suggestion(String::from(
                "A function whose declared type is `void` cannot return a value",
            )),
            ErrorImpl::NeverFunctionReturns { function } => ErrorTip::Suggestion(format!(
                "Function `{}` returns `never` and cannot have a reachable end point",
                function
            )),
            ErrorImpl::MissingReturnValue { expected } => {
                ErrorTip::Suggestion(format!("Expected a return value of type `{}`", expected))
            }
            ErrorImpl::FunctionLacksReturn { function, expected } => {
                ErrorTip::Suggestion(format!(
                    "Function `{}` lacks ending return statement and return type does not include `{}`",
                    function, expected
                ))
            }
            ErrorImpl::ReturnOutsideFunction => ErrorTip::Suggestion(String::from(
                "A `return` statement can only be used within a function body",
            )),
            ErrorImpl::BreakOutsideLoop => ErrorTip::Suggestion(String::from(
                "A `break` statement can only be used within an enclosing loop",
            )),
            ErrorImpl::UncaughtException { message } => {
                ErrorTip::Suggestion(format!("Uncaught {}", message))
            }
            ErrorImpl::IterationLimitExceeded { limit } => ErrorTip::Suggestion(format!(
                "Loop iterations exceeded the configured limit of {}",
                limit
            )),
            ErrorImpl::CallStackExceeded { depth } => ErrorTip::Suggestion(format!(
                "Maximum call stack size of {} exceeded",
                depth
            )),
            ErrorImpl::OutputError { .. } => ErrorTip::None,
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated template substitution")]
    UnterminatedTemplate,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("cannot assign to constant {variable:?}")]
    ConstantReassignment { variable: String },
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("unexpected arguments: expected {expected}, received {received}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected}, received {received}")]
    MissingArguments { expected: usize, received: usize },
    #[error("argument types do not match: expected {expected}, received {received}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("expected explicit value when no type is given")]
    ExpectedExplicitValue,
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("property {property:?} does not exist on type {type_}")]
    UnknownProperty { property: String, type_: String },
    #[error("type {type_} is not callable")]
    NotCallable { type_: String },
    #[error("operator {operator} cannot be applied to {left} and {right}")]
    InvalidOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("void expression tested for truthiness")]
    VoidTruthiness,
    #[error("void function returned a value")]
    VoidFunctionReturnedValue,
    #[error("never-returning function {function:?} has a reachable end point")]
    NeverFunctionReturns { function: String },
    #[error("missing return value of type {expected}")]
    MissingReturnValue { expected: String },
    #[error("function {function:?} lacks ending return statement")]
    FunctionLacksReturn { function: String, expected: String },
    #[error("return statement outside of function")]
    ReturnOutsideFunction,
    #[error("break statement outside of loop")]
    BreakOutsideLoop,
    #[error("uncaught exception: {message}")]
    UncaughtException { message: String },
    #[error("loop iteration limit of {limit} exceeded")]
    IterationLimitExceeded { limit: u64 },
    #[error("call stack depth of {depth} exceeded")]
    CallStackExceeded { depth: usize },
    #[error("failed to write output: {message}")]
    OutputError { message: String },
}
