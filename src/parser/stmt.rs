use crate::{
    ast::{
        ast::{Expr, Stmt},
        statements::{
            BlockStmt, BreakStmt, ExpressionStmt, FnDeclStmt, IfStmt, Parameter, ReturnStmt,
            ThrowStmt, VarDeclStmt, WhileStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
        return handler(parser);
    }

    let expression = parse_expr(parser, BindingPower::Default)?;

    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after expression")?;

    Ok(Stmt::Expression(ExpressionStmt {
        span: Span {
            start: expression.get_span().start.clone(),
            end: parser.previous_end(),
        },
        expression,
    }))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start_token = parser.advance();
    let is_constant = start_token.kind == TokenKind::Const;

    let variable_name = parser
        .expect_detailed(
            TokenKind::Identifier,
            "expected identifier during variable declaration",
        )?
        .value;

    let explicit_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let assigned_value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else if parser.current_token_kind() != TokenKind::Semicolon {
        return Err(parser.unexpected("expected `=` or `;` in variable declaration"));
    } else if explicit_type.is_none() || is_constant {
        // `let x;` has nothing to type it by, and a constant can never get a value
        return Err(Error::new(
            ErrorImpl::ExpectedExplicitValue,
            parser.get_position(),
        ));
    } else {
        None
    };

    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after variable declaration")?;

    Ok(Stmt::VarDecl(VarDeclStmt {
        span: Span {
            start: start_token.span.start,
            end: parser.previous_end(),
        },
        is_constant,
        identifier: variable_name,
        assigned_value,
        explicit_type,
    }))
}

/// Parses `(condition)` for `if` and `while`.
fn parse_condition(parser: &mut Parser, keyword: &str) -> Result<Expr, Error> {
    parser.expect_detailed(
        TokenKind::OpenParen,
        &format!("expected `(` after `{}`", keyword),
    )?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(
        TokenKind::CloseParen,
        &format!("expected `)` after `{}` condition", keyword),
    )?;

    Ok(condition)
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_condition(parser, "if")?;
    let then_body = parse_stmt(parser)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(Box::new(parse_stmt(parser)?))
    } else {
        None
    };

    Ok(Stmt::If(IfStmt {
        condition,
        then_body: Box::new(then_body),
        else_body,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let condition = parse_condition(parser, "while")?;
    let body = parse_stmt(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body: Box::new(body),
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}

pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser
        .expect_detailed(TokenKind::OpenCurly, "expected `{` to open a block")?
        .span
        .start;

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected("expected `}` to close the block"));
        }
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        body: statements,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let identifier = parser
        .expect_detailed(TokenKind::Identifier, "expected function name")?
        .value;

    parser.expect_detailed(TokenKind::OpenParen, "expected `(` after function name")?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name = parser.expect_detailed(TokenKind::Identifier, "expected parameter name")?;

        let explicit_type = if parser.current_token_kind() == TokenKind::Colon {
            parser.advance();
            Some(parse_type(parser)?)
        } else {
            None
        };

        parameters.push(Parameter {
            name: name.value,
            explicit_type,
            span: Span {
                start: name.span.start,
                end: parser.previous_end(),
            },
        });

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect_detailed(TokenKind::Comma, "expected `,` or `)` after parameter")?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(Stmt::FnDecl(FnDeclStmt {
        span: Span {
            start,
            end: parser.previous_end(),
        },
        identifier,
        parameters,
        return_type,
        body,
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after return")?;

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after break")?;

    Ok(Stmt::Break(BreakStmt {
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}

pub fn parse_throw_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    if parser.current_token_kind() == TokenKind::Semicolon {
        return Err(parser.unexpected("expected expression after throw"));
    }

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::Semicolon, "expected `;` after throw")?;

    Ok(Stmt::Throw(ThrowStmt {
        value,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}
