//! Typed Abstract Syntax Tree definitions.
//!
//! This module contains the typed variants of AST nodes produced by
//! the type checker. The typed AST mirrors the structure of the untyped AST
//! but every expression carries its resolved type, function declarations
//! carry their final signature, and assignment targets are known to be
//! plain identifiers.
//!
//! This typed AST is consumed by the interpreter.

use std::rc::Rc;

use crate::{
    ast::{
        expressions::{BooleanExpr, NumberExpr, StringExpr},
        types::{FunctionType, Type},
    },
    lexer::tokens::Token,
    Span,
};

#[derive(Debug, Clone)]
pub enum TypedStmt {
    Expression(TypedExpressionStmt),
    Block(TypedBlockStmt),
    VarDecl(TypedVarDeclStmt),
    If(TypedIfStmt),
    While(TypedWhileStmt),
    FnDecl(TypedFnDeclStmt),
    Return(TypedReturnStmt),
    Break(TypedBreakStmt),
    Throw(TypedThrowStmt),
}

impl TypedStmt {
    pub fn get_span(&self) -> &Span {
        match self {
            TypedStmt::Expression(stmt) => stmt.expression.get_span(),
            TypedStmt::Block(stmt) => &stmt.span,
            TypedStmt::VarDecl(stmt) => &stmt.span,
            TypedStmt::If(stmt) => &stmt.span,
            TypedStmt::While(stmt) => &stmt.span,
            TypedStmt::FnDecl(stmt) => &stmt.span,
            TypedStmt::Return(stmt) => &stmt.span,
            TypedStmt::Break(stmt) => &stmt.span,
            TypedStmt::Throw(stmt) => &stmt.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypedBlockStmt {
    pub body: Vec<TypedStmt>,
    pub span: Span,
}

impl TypedBlockStmt {
    pub fn iter(&self) -> std::slice::Iter<'_, TypedStmt> {
        self.body.iter()
    }
}

#[derive(Debug, Clone)]
pub struct TypedExpressionStmt {
    pub expression: TypedExpr,
}

#[derive(Debug, Clone)]
pub struct TypedVarDeclStmt {
    pub identifier: String,
    pub is_constant: bool,
    pub assigned_value: Option<TypedExpr>,
    pub var_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedIfStmt {
    pub condition: TypedExpr,
    pub then_body: Box<TypedStmt>,
    pub else_body: Option<Box<TypedStmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedWhileStmt {
    pub condition: TypedExpr,
    pub body: Box<TypedStmt>,
    pub span: Span,
}

/// A checked function declaration.
///
/// The body is shared so the interpreter can capture it in closures
/// without copying the tree.
#[derive(Debug, Clone)]
pub struct TypedFnDeclStmt {
    pub identifier: String,
    pub function_type: FunctionType,
    pub body: Rc<TypedBlockStmt>,
    pub span: Span,
}

impl TypedFnDeclStmt {
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.function_type
            .arguments
            .iter()
            .map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TypedReturnStmt {
    pub value: Option<TypedExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedBreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedThrowStmt {
    pub value: TypedExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypedExpr {
    Number(NumberExpr),
    String(StringExpr),
    Boolean(BooleanExpr),
    Template(TypedTemplateExpr),
    Symbol(TypedSymbolExpr),
    Binary(TypedBinaryExpr),
    Member(TypedMemberExpr),
    Prefix(TypedPrefixExpr),
    Assignment(TypedAssignmentExpr),
    Call(TypedCallExpr),
    New(TypedNewExpr),
    Object(TypedObjectExpr),
}

impl TypedExpr {
    /// The static type the checker assigned to this expression.
    pub fn get_type(&self) -> Type {
        match self {
            TypedExpr::Number(_) => Type::number(),
            TypedExpr::String(_) => Type::string(),
            TypedExpr::Boolean(_) => Type::boolean(),
            TypedExpr::Template(_) => Type::string(),
            TypedExpr::Symbol(expr) => expr.var_type.clone(),
            TypedExpr::Binary(expr) => expr.result_type.clone(),
            TypedExpr::Member(expr) => expr.result_type.clone(),
            TypedExpr::Prefix(expr) => expr.result_type.clone(),
            TypedExpr::Assignment(expr) => expr.result_type.clone(),
            TypedExpr::Call(expr) => expr.return_type.clone(),
            TypedExpr::New(expr) => expr.result_type.clone(),
            TypedExpr::Object(expr) => expr.result_type.clone(),
        }
    }

    pub fn get_span(&self) -> &Span {
        match self {
            TypedExpr::Number(expr) => &expr.span,
            TypedExpr::String(expr) => &expr.span,
            TypedExpr::Boolean(expr) => &expr.span,
            TypedExpr::Template(expr) => &expr.span,
            TypedExpr::Symbol(expr) => &expr.span,
            TypedExpr::Binary(expr) => &expr.span,
            TypedExpr::Member(expr) => &expr.span,
            TypedExpr::Prefix(expr) => &expr.span,
            TypedExpr::Assignment(expr) => &expr.span,
            TypedExpr::Call(expr) => &expr.span,
            TypedExpr::New(expr) => &expr.span,
            TypedExpr::Object(expr) => &expr.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypedTemplateExpr {
    pub quasis: Vec<String>,
    pub expressions: Vec<TypedExpr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedSymbolExpr {
    pub value: String,
    pub var_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedBinaryExpr {
    pub left: Box<TypedExpr>,
    pub operator: Token,
    pub right: Box<TypedExpr>,
    pub result_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedMemberExpr {
    pub object: Box<TypedExpr>,
    pub property: String,
    pub result_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedPrefixExpr {
    pub operator: Token,
    pub right_expr: Box<TypedExpr>,
    pub result_type: Type,
    pub span: Span,
}

/// Assignment to a variable, `=` or compound.
#[derive(Debug, Clone)]
pub struct TypedAssignmentExpr {
    pub assignee: TypedSymbolExpr,
    pub operator: Token,
    pub value: Box<TypedExpr>,
    pub result_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedCallExpr {
    pub callee: Box<TypedExpr>,
    pub arguments: Vec<TypedExpr>,
    pub return_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedNewExpr {
    pub class: String,
    pub arguments: Vec<TypedExpr>,
    pub result_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypedObjectExpr {
    pub fields: Vec<(String, TypedExpr)>,
    pub result_type: Type,
    pub span: Span,
}
