use crate::Span;

use super::{
    expressions::{
        AssignmentExpr, BinaryExpr, BooleanExpr, CallExpr, MemberExpr, NewExpr, NumberExpr,
        ObjectExpr, PrefixExpr, StringExpr, SymbolExpr, TemplateExpr,
    },
    statements::{
        BlockStmt, BreakStmt, ExpressionStmt, FnDeclStmt, IfStmt, ReturnStmt, ThrowStmt,
        VarDeclStmt, WhileStmt,
    },
};

/// Any statement node.
#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Block(BlockStmt),
    VarDecl(VarDeclStmt),
    If(IfStmt),
    While(WhileStmt),
    FnDecl(FnDeclStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Throw(ThrowStmt),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::Block(stmt) => &stmt.span,
            Stmt::VarDecl(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::FnDecl(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Break(stmt) => &stmt.span,
            Stmt::Throw(stmt) => &stmt.span,
        }
    }
}

/// Any expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    Number(NumberExpr),
    String(StringExpr),
    Boolean(BooleanExpr),
    Template(TemplateExpr),
    Symbol(SymbolExpr),
    Binary(BinaryExpr),
    Member(MemberExpr),
    Prefix(PrefixExpr),
    Assignment(AssignmentExpr),
    Call(CallExpr),
    New(NewExpr),
    Object(ObjectExpr),
}

impl Expr {
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Number(expr) => &expr.span,
            Expr::String(expr) => &expr.span,
            Expr::Boolean(expr) => &expr.span,
            Expr::Template(expr) => &expr.span,
            Expr::Symbol(expr) => &expr.span,
            Expr::Binary(expr) => &expr.span,
            Expr::Member(expr) => &expr.span,
            Expr::Prefix(expr) => &expr.span,
            Expr::Assignment(expr) => &expr.span,
            Expr::Call(expr) => &expr.span,
            Expr::New(expr) => &expr.span,
            Expr::Object(expr) => &expr.span,
        }
    }
}
