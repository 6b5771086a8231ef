use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

#[derive(Clone)]
pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(regex).expect("lexer patterns are valid regexes"),
        handler,
    }
}

lazy_static! {
    // First match wins, so longer operators precede their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern(r"^[a-zA-Z_$][a-zA-Z0-9_$]*", symbol_handler),
        pattern(r"^[0-9]+(\.[0-9]+)?", number_handler),
        pattern(r"^\s+", skip_handler),
        pattern(r#"^"(?:[^"\\\n]|\\.)*""#, string_handler),
        pattern(r"^'(?:[^'\\\n]|\\.)*'", string_handler),
        pattern(r"^`(?:[^`\\]|\\[\s\S])*`", template_handler),
        pattern(r"^//[^\n]*", skip_handler),
        pattern(r"^/\*[\s\S]*?\*/", skip_handler),
        pattern(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern(r"^===", MK_DEFAULT_HANDLER!(TokenKind::StrictEquals, "===")),
        pattern(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern(r"^=>", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "=>")),
        pattern(r"^!==", MK_DEFAULT_HANDLER!(TokenKind::StrictNotEquals, "!==")),
        pattern(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern(r"^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        pattern(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern(r"^\|\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        pattern(r"^&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        pattern(r"^\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        pattern(r"^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern(r"^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern(r"^\?", MK_DEFAULT_HANDLER!(TokenKind::Question, "?")),
        pattern(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern(r"^\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern(r"^-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern(r"^\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern(r"^/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern(r"^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    /// Byte offset of `source` within the file, non-zero for template substitutions
    offset: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Rc<String>, offset: u32) -> Lexer {
        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            offset,
            file,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self) -> Position {
        Position(self.offset + self.pos as u32, Rc::clone(&self.file))
    }

    /// Span of the next `len` bytes of input.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: Position(self.offset + (self.pos + len) as u32, Rc::clone(&self.file)),
        }
    }

    fn matched(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map(|found| found.as_str().to_string())
            .unwrap_or_default()
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());

    lexer.push(MK_TOKEN!(TokenKind::Number, matched.clone(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());
    let literal = unescape(&matched[1..matched.len() - 1]);

    lexer.push(MK_TOKEN!(TokenKind::String, literal, span));
    lexer.advance_n(matched.len());
    Ok(())
}

/// Template literals keep their raw body; the parser splits out `${...}`
/// substitutions and cooks the escapes of the text parts.
fn template_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let span = lexer.span_of(matched.len());
    let raw = matched[1..matched.len() - 1].to_string();

    lexer.push(MK_TOKEN!(TokenKind::Template, raw, span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);
    let span = lexer.span_of(value.len());
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(kind, value, span));
    Ok(())
}

/// Maps the character following a backslash to the character it stands for.
pub fn escaped_char(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' | '"' | '\'' | '`' | '$' => Some(ch),
        _ => None,
    }
}

pub fn unescape(literal: &str) -> String {
    let mut result = String::new();
    let mut chars = literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('x') => {
                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(digit) if digit.is_ascii_hexdigit() => {
                            hex.push(*digit);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => {
                        result.push('x');
                        result.push_str(&hex);
                    }
                }
            }
            Some(next) => match escaped_char(next) {
                Some(escaped) => result.push(escaped),
                // Unknown escapes drop the backslash, as in JavaScript
                None => result.push(next),
            },
            None => result.push(ch),
        }
    }

    result
}

pub fn tokenize(
    source: String,
    file: Option<String>,
) -> Result<Vec<Token>, Error> {
    let file = Rc::new(file.unwrap_or_else(|| String::from("shell")));
    tokenize_at(source, file, 0)
}

/// Tokenizes `source` as if it started at byte `offset` of `file`.
pub fn tokenize_at(
    source: String,
    file: Rc<String>,
    offset: u32,
) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file, offset);

    while !lex.at_eof() {
        let matched = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match matched {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ))
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}
