use std::{collections::HashMap, fmt::Display, num::ParseIntError};

use lazy_static::lazy_static;
use serde::Serialize;

use crate::{
    ast::Op,
    error::{IntoSpanned, SpannedError},
};

/// Zero-based offset of a token's first character in the source text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Span {
    pub offset: u32,
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    Ident(String),
    IntLit(i64),
    Operator(Op),
    Begin,
    Const,
    Do,
    Else,
    End,
    Func,
    If,
    In,
    Let,
    Return,
    Then,
    Var,
    While,
    Semi,
    Colon,
    Becomes,
    Is,
    Comma,
    LParen,
    RParen,
    Eot,
}

impl TokenKind {
    pub fn at(self, span: Span) -> Token {
        Token { kind: self, span }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "{name}"),
            Self::IntLit(value) => write!(f, "{value}"),
            Self::Operator(op) => write!(f, "{op}"),
            Self::Begin => write!(f, "begin"),
            Self::Const => write!(f, "const"),
            Self::Do => write!(f, "do"),
            Self::Else => write!(f, "else"),
            Self::End => write!(f, "end"),
            Self::Func => write!(f, "func"),
            Self::If => write!(f, "if"),
            Self::In => write!(f, "in"),
            Self::Let => write!(f, "let"),
            Self::Return => write!(f, "return"),
            Self::Then => write!(f, "then"),
            Self::Var => write!(f, "var"),
            Self::While => write!(f, "while"),
            Self::Semi => write!(f, ";"),
            Self::Colon => write!(f, ":"),
            Self::Becomes => write!(f, ":="),
            Self::Is => write!(f, "~"),
            Self::Comma => write!(f, ","),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Eot => write!(f, "<eot>"),
        }
    }
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        [
            ("begin", TokenKind::Begin),
            ("const", TokenKind::Const),
            ("do", TokenKind::Do),
            ("else", TokenKind::Else),
            ("end", TokenKind::End),
            ("func", TokenKind::Func),
            ("if", TokenKind::If),
            ("in", TokenKind::In),
            ("let", TokenKind::Let),
            ("return", TokenKind::Return),
            ("then", TokenKind::Then),
            ("var", TokenKind::Var),
            ("while", TokenKind::While),
        ]
        .into_iter()
        .collect()
    };
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("failed to parse int: {0}")]
    ParseInt(#[from] ParseIntError),
    #[error("invalid input at: {0}")]
    InvalidInput(char),
}

pub type ScanError = SpannedError<ErrorKind>;

pub struct Lexer<'a> {
    offset: usize,
    source: &'a [char],
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a [char]) -> Self {
        Self { offset: 0, source }
    }

    fn cur(&self) -> Option<char> {
        self.source.get(self.offset).copied()
    }

    fn accept(&mut self, expected: char) -> bool {
        if self.cur() == Some(expected) {
            self.advance();
            return true;
        }

        false
    }

    fn advance(&mut self) {
        self.offset += 1;
    }

    fn next(&mut self) -> Option<char> {
        self.advance();
        self.source.get(self.offset - 1).copied()
    }

    fn span(&self) -> Span {
        Span {
            offset: self.offset as u32,
        }
    }

    fn term(&mut self) -> Token {
        let span = self.span();
        let mut term = String::new();

        while let Some(c) = self.cur() {
            if !c.is_ascii_alphanumeric() {
                break;
            }

            self.advance();
            term.push(c);
        }

        match KEYWORDS.get(term.as_str()) {
            Some(keyword) => keyword.clone(),
            None => TokenKind::Ident(term),
        }
        .at(span)
    }

    fn number(&mut self) -> Result<Token, ScanError> {
        let span = self.span();
        let mut num = String::new();

        while let Some(c) = self.cur() {
            if !c.is_ascii_digit() {
                break;
            }

            self.advance();
            num.push(c);
        }

        let value = num.parse().map_err(|e| ErrorKind::ParseInt(e).at(span))?;
        Ok(TokenKind::IntLit(value).at(span))
    }

    pub fn lex(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = vec![];

        while let Some(cur) = self.cur() {
            if cur.is_whitespace() {
                self.advance();
                continue;
            }

            if cur == '!' {
                // comment, runs to the end of the line (newline included)
                while let Some(c) = self.next() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            if cur.is_ascii_alphabetic() {
                tokens.push(self.term());
                continue;
            }

            if cur.is_ascii_digit() {
                tokens.push(self.number()?);
                continue;
            }

            let span = self.span();
            self.advance();

            let kind = match cur {
                ';' => TokenKind::Semi,
                ',' => TokenKind::Comma,
                '~' => TokenKind::Is,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ':' => {
                    if self.accept('=') {
                        TokenKind::Becomes
                    } else {
                        TokenKind::Colon
                    }
                }
                c => match Op::from_char(c) {
                    Some(op) => TokenKind::Operator(op),
                    None => return Err(ErrorKind::InvalidInput(c).at(span)),
                },
            };

            tokens.push(kind.at(span));
        }

        tokens.push(TokenKind::Eot.at(self.span()));
        Ok(tokens)
    }
}
