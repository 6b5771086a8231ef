//! Type annotation parsing.
//!
//! Annotations are either a type name (`number`, `Error`) or an object
//! type literal (`{ name: string; age: number }`). Like expressions they are
//! dispatched through a NUD table keyed by the leading token.

use std::collections::HashMap;

use crate::{
    ast::types::{ObjectTypeAnnotation, SymbolType, TypeAnnotation},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeAnnotation, Error>;

pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::OpenCurly, parse_object_type);
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(TypeAnnotation::Symbol(SymbolType {
        name: token.value,
        position: token.span.start,
    }))
}

pub fn parse_object_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let position = parser.advance().span.start;

    let mut fields = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let name = parser
            .expect_detailed(TokenKind::Identifier, "expected property name in object type")?
            .value;
        parser.expect_detailed(TokenKind::Colon, "expected `:` after property name")?;
        fields.push((name, parse_type(parser)?));

        match parser.current_token_kind() {
            TokenKind::Comma | TokenKind::Semicolon => {
                parser.advance();
            }
            TokenKind::CloseCurly => {}
            _ => return Err(parser.unexpected("expected `;`, `,` or `}` in object type")),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(TypeAnnotation::Object(ObjectTypeAnnotation { fields, position }))
}

pub fn parse_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected a type"),
                },
                parser.get_position(),
            ))
        }
    };

    nud(parser)
}
