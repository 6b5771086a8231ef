use crate::{lexer::tokens::Token, Span};

use super::ast::Expr;

// LITERALS

/// Number Expression
/// Represents a numeric literal. All numbers are 64-bit floats.
#[derive(Debug, Clone)]
pub struct NumberExpr {
    pub value: f64,
    pub span: Span,
}

/// String Expression
/// Represents a string literal with escapes already applied.
#[derive(Debug, Clone)]
pub struct StringExpr {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BooleanExpr {
    pub value: bool,
    pub span: Span,
}

/// Template Expression
/// `` `a${x}b${y}c` `` is stored as quasis `["a", "b", "c"]` and
/// expressions `[x, y]`; there is always one more quasi than expression.
#[derive(Debug, Clone)]
pub struct TemplateExpr {
    pub quasis: Vec<String>,
    pub expressions: Vec<Expr>,
    pub span: Span,
}

/// Symbol Expression
/// Represents an identifier. This includes functions.
#[derive(Debug, Clone)]
pub struct SymbolExpr {
    pub value: String,
    pub span: Span,
}

// OPERATORS

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Member Expression
/// `object.property`
#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PrefixExpr {
    pub operator: Token,
    pub right_expr: Box<Expr>,
    pub span: Span,
}

/// Assignment Expression
/// Covers `=` as well as the compound forms `+=`, `-=`, `*=` and `/=`.
#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub assignee: Box<Expr>,
    pub operator: Token,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

/// New Expression
/// `new Error("message")`
#[derive(Debug, Clone)]
pub struct NewExpr {
    pub class: String,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

/// Object Expression
/// `{ name: "x", age: 3 }`
#[derive(Debug, Clone)]
pub struct ObjectExpr {
    pub fields: Vec<(String, Expr)>,
    pub span: Span,
}
