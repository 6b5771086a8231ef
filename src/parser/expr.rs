use crate::{
    ast::{
        ast::Expr,
        expressions::{
            AssignmentExpr, BinaryExpr, BooleanExpr, CallExpr, MemberExpr, NewExpr, NumberExpr,
            ObjectExpr, PrefixExpr, StringExpr, SymbolExpr, TemplateExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::{tokenize_at, unescape},
        tokens::TokenKind,
    },
    Position, Span,
};

use super::{
    lookups::BindingPower,
    parser::{parse_expression_tokens, Parser},
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    // While there is an LED binding tighter than the current BP, keep extending lhs
    loop {
        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => break,
        };
        let token_bp = parser
            .get_bp_lookup()
            .get(&token_kind)
            .copied()
            .unwrap_or(BindingPower::Default);

        if token_bp <= bp {
            break;
        }

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Number => {
            let value = parser.current_token().value.parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: parser.current_token().value.clone(),
                    },
                    parser.get_position(),
                )
            })?;

            Ok(Expr::Number(NumberExpr {
                value,
                span: parser.advance().span,
            }))
        }
        TokenKind::Identifier => {
            let token = parser.advance();
            Ok(Expr::Symbol(SymbolExpr {
                value: token.value,
                span: token.span,
            }))
        }
        TokenKind::String => {
            let token = parser.advance();
            Ok(Expr::String(StringExpr {
                value: token.value,
                span: token.span,
            }))
        }
        TokenKind::True | TokenKind::False => {
            let token = parser.advance();
            Ok(Expr::Boolean(BooleanExpr {
                value: token.kind == TokenKind::True,
                span: token.span,
            }))
        }
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        )),
    }
}

/// Splits a template literal into its text parts and `${...}` substitutions.
///
/// Substitutions are lexed and parsed on their own, with positions offset
/// into the enclosing file so diagnostics still point at the right place.
pub fn parse_template_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();
    let raw = token.value.as_str();
    let body_offset = token.span.start.0 + 1;
    let file = parser.get_file();

    let mut quasis = vec![];
    let mut expressions = vec![];
    let mut quasi_start = 0;
    let bytes = raw.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b'$' if bytes.get(index + 1) == Some(&b'{') => {
                quasis.push(unescape(&raw[quasi_start..index]));

                let substitution_start = index + 2;
                let substitution_end = find_substitution_end(bytes, substitution_start)
                    .ok_or_else(|| {
                        Error::new(
                            ErrorImpl::UnterminatedTemplate,
                            Position(body_offset + index as u32, file.clone()),
                        )
                    })?;

                let tokens = tokenize_at(
                    raw[substitution_start..substitution_end].to_string(),
                    file.clone(),
                    body_offset + substitution_start as u32,
                )?;
                expressions.push(parse_expression_tokens(tokens, file.clone())?);

                index = substitution_end + 1;
                quasi_start = index;
            }
            _ => index += 1,
        }
    }

    quasis.push(unescape(&raw[quasi_start.min(raw.len())..]));

    Ok(Expr::Template(TemplateExpr {
        quasis,
        expressions,
        span: token.span,
    }))
}

/// Finds the `}` closing a substitution, skipping nested braces and
/// string literals.
fn find_substitution_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut index = start;

    while index < bytes.len() {
        let byte = bytes[index];
        match quote {
            Some(_) if byte == b'\\' => index += 1,
            Some(open) if byte == open => quote = None,
            Some(_) => {}
            None => match byte {
                b'"' | b'\'' => quote = Some(byte),
                b'{' => depth += 1,
                b'}' if depth == 0 => return Some(index),
                b'}' => depth -= 1,
                _ => {}
            },
        }
        index += 1;
    }

    None
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance();

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: right.get_span().end.clone(),
        },
        left: Box::new(left),
        operator: operator_token,
        right: Box::new(right),
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let rhs = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::Prefix(PrefixExpr {
        span: Span {
            start: operator_token.span.start.clone(),
            end: rhs.get_span().end.clone(),
        },
        operator: operator_token,
        right_expr: Box::new(rhs),
    }))
}

/// Assignment is right associative: `a = b = c` is `a = (b = c)`.
pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let rhs = parse_expr(parser, BindingPower::Comma)?;

    Ok(Expr::Assignment(AssignmentExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: rhs.get_span().end.clone(),
        },
        operator: operator_token,
        value: Box::new(rhs),
        assignee: Box::new(left),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the group")?;

    Ok(expr)
}

/// Parses `(a, b, ...)` after the opening parenthesis has been consumed,
/// up to and including the closing parenthesis.
fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    let mut args = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Comma)?);

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect_detailed(TokenKind::Comma, "expected `,` or `)` after argument")?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(args)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let arguments = parse_arguments(parser)?;

    Ok(Expr::Call(CallExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: parser.previous_end(),
        },
        callee: Box::new(left),
        arguments,
    }))
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let property =
        parser.expect_detailed(TokenKind::Identifier, "expected property name after `.`")?;

    Ok(Expr::Member(MemberExpr {
        span: Span {
            start: left.get_span().start.clone(),
            end: property.span.end,
        },
        object: Box::new(left),
        property: property.value,
    }))
}

pub fn parse_new_expr(parser: &mut Parser) -> Result<Expr, Error> {
    // new Error("message")
    let start = parser.advance().span.start;

    let class = parser
        .expect_detailed(TokenKind::Identifier, "expected class name after `new`")?
        .value;

    let arguments = if parser.current_token_kind() == TokenKind::OpenParen {
        parser.advance();
        parse_arguments(parser)?
    } else {
        vec![]
    };

    Ok(Expr::New(NewExpr {
        class,
        arguments,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}

pub fn parse_object_expr(parser: &mut Parser) -> Result<Expr, Error> {
    // { name: "x", age: 3 }
    let start = parser.advance().span.start;

    let mut fields = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let field_name = match parser.current_token_kind() {
            TokenKind::Identifier | TokenKind::String => parser.advance().value,
            _ => return Err(parser.unexpected("expected property name in object literal")),
        };
        parser.expect_detailed(TokenKind::Colon, "expected `:` after property name")?;
        let field_value = parse_expr(parser, BindingPower::Comma)?;

        fields.push((field_name, field_value));

        if parser.current_token_kind() != TokenKind::CloseCurly {
            parser.expect_detailed(TokenKind::Comma, "expected `,` or `}` in object literal")?;
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::Object(ObjectExpr {
        fields,
        span: Span {
            start,
            end: parser.previous_end(),
        },
    }))
}
