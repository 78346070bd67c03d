//! Parser for the bracketed type notation
//!
//! ```text
//! type   := base ("[" INT "]")*
//! base   := "{" (field ("," field)* ","?)? "}" | ground | INT
//! field  := "flip"? NAME ":" type
//! ground := ("UInt" | "SInt" | "Analog") ("<" INT ">")? | "Clock" | "Reset" | "AsyncReset"
//! ```
//!
//! A bare integer `n` in type position is shorthand for `UInt<n>`.

use crate::error::ParseError;
use crate::ty::{Field, GroundKind, GroundType, Orientation, Type};
use logos::Logos;
use miette::{NamedSource, SourceSpan};
use rustc_hash::FxHashSet;

/// Parse a type from its textual form
///
/// # Errors
///
/// Returns a [`ParseError`] pointing at the first offending token.
pub fn parse_type(source: &str) -> Result<Type, ParseError> {
    let mut parser = Parser::new(source);
    let ty = parser.parse_type()?;
    match parser.peek() {
        None => Ok(ty),
        Some(token) => Err(parser.unexpected(token, "end of input")),
    }
}

/// Tokens of the type notation
#[derive(Logos, Copy, Clone, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum TokenKind {
    #[regex(r"[A-Za-z_][A-Za-z0-9_$]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Int,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    // Error token for unrecognized input
    Error,
}

impl TokenKind {
    const fn describe(self) -> &'static str {
        match self {
            Self::Ident => "an identifier",
            Self::Int => "an integer",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::LBracket => "`[`",
            Self::RBracket => "`]`",
            Self::Lt => "`<`",
            Self::Gt => "`>`",
            Self::Comma => "`,`",
            Self::Colon => "`:`",
            Self::Error => "a token",
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_nth(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn text(&self, token: Token) -> &'src str {
        &self.source[token.start..token.end]
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|token| token.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(()),
            Some(token) => Err(self.unexpected(token, kind.describe())),
            None => Err(self.end(kind.describe())),
        }
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let mut ty = self.parse_base()?;
        while self.eat(TokenKind::LBracket) {
            let size = self.parse_int()?;
            self.expect(TokenKind::RBracket)?;
            ty = Type::vector(ty, size as usize);
        }
        Ok(ty)
    }

    fn parse_base(&mut self) -> Result<Type, ParseError> {
        let Some(token) = self.bump() else {
            return Err(self.end("a type"));
        };
        match token.kind {
            TokenKind::LBrace => self.parse_bundle_rest(),
            TokenKind::Int => {
                let width = self.int_value(token)?;
                Ok(Type::Ground(GroundType::new(GroundKind::UInt, Some(width))))
            }
            TokenKind::Ident => self.parse_ground(token),
            _ => Err(self.unexpected(token, "a type")),
        }
    }

    fn parse_ground(&mut self, token: Token) -> Result<Type, ParseError> {
        let kind = match self.text(token) {
            "UInt" => GroundKind::UInt,
            "SInt" => GroundKind::SInt,
            "Analog" => GroundKind::Analog,
            "Clock" => GroundKind::Clock,
            "Reset" => GroundKind::Reset,
            "AsyncReset" => GroundKind::AsyncReset,
            name => {
                return Err(ParseError::UnknownType {
                    name: name.to_string(),
                    span: span_of(token),
                    src: self.named_source(),
                });
            }
        };
        let width = if kind.has_width() && self.eat(TokenKind::Lt) {
            let width = self.parse_int()?;
            self.expect(TokenKind::Gt)?;
            Some(width)
        } else {
            None
        };
        Ok(Type::Ground(GroundType::new(kind, width)))
    }

    fn parse_bundle_rest(&mut self) -> Result<Type, ParseError> {
        let mut fields: Vec<Field> = Vec::new();
        let mut seen = FxHashSet::default();
        loop {
            if self.eat(TokenKind::RBrace) {
                return Ok(Type::bundle(fields));
            }
            let (field, name_token) = self.parse_field()?;
            if !seen.insert(field.name.clone()) {
                return Err(ParseError::DuplicateField {
                    name: field.name,
                    span: span_of(name_token),
                    src: self.named_source(),
                });
            }
            fields.push(field);
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBrace)?;
                return Ok(Type::bundle(fields));
            }
        }
    }

    fn parse_field(&mut self) -> Result<(Field, Token), ParseError> {
        // `flip` is only a keyword when a field name follows it.
        let flip_keyword = self.peek().is_some_and(|token| {
            token.kind == TokenKind::Ident
                && self.text(token) == "flip"
                && self.peek_nth(1).is_some_and(|next| next.kind != TokenKind::Colon)
        });
        let orientation = if flip_keyword {
            self.pos += 1;
            Orientation::Flipped
        } else {
            Orientation::Normal
        };

        let name_token = match self.bump() {
            Some(token) if matches!(token.kind, TokenKind::Ident | TokenKind::Int) => token,
            Some(token) => return Err(self.unexpected(token, "a field name")),
            None => return Err(self.end("a field name")),
        };
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;

        let field = Field {
            name: self.text(name_token).to_string(),
            orientation,
            ty,
        };
        Ok((field, name_token))
    }

    fn parse_int(&mut self) -> Result<u32, ParseError> {
        match self.bump() {
            Some(token) if token.kind == TokenKind::Int => self.int_value(token),
            Some(token) => Err(self.unexpected(token, "an integer")),
            None => Err(self.end("an integer")),
        }
    }

    fn int_value(&self, token: Token) -> Result<u32, ParseError> {
        self.text(token)
            .parse::<u32>()
            .map_err(|_| self.out_of_range(token))
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new("<type>", self.source.to_string())
    }

    fn unexpected(&self, token: Token, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.text(token).to_string(),
            expected: expected.to_string(),
            span: span_of(token),
            src: self.named_source(),
        }
    }

    fn end(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedEnd {
            expected: expected.to_string(),
            span: SourceSpan::from((self.source.len(), 0)),
            src: self.named_source(),
        }
    }

    fn out_of_range(&self, token: Token) -> ParseError {
        ParseError::IntegerOutOfRange {
            text: self.text(token).to_string(),
            span: span_of(token),
            src: self.named_source(),
        }
    }
}

fn span_of(token: Token) -> SourceSpan {
    SourceSpan::from((token.start, token.end - token.start))
}

fn tokenize(source: &str) -> Vec<Token> {
    TokenKind::lexer(source)
        .spanned()
        .map(|(kind, span)| Token {
            kind: kind.unwrap_or(TokenKind::Error),
            start: span.start,
            end: span.end,
        })
        .collect()
}
