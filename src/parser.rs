use std::borrow::Cow;

use crate::{
    ast::{Command, Decl, Expr, Op, Param, Program, TypeDenoter, Vname},
    error::{IntoSpanned, SpannedError},
    lexer::{Span, Token, TokenKind},
};

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("invalid expression '{0}'")]
    InvalidExpr(TokenKind),
    #[error("unexpected token '{actual}', expected: '{expected}'")]
    UnexpectedToken {
        expected: Cow<'static, str>,
        actual: String,
    },
}

pub type ParseError = SpannedError<ErrorKind>;

fn is_additive(op: Op) -> bool {
    matches!(op, Op::Add | Op::Sub | Op::Lt | Op::Gt | Op::Eq)
}

fn is_multiplicative(op: Op) -> bool {
    matches!(op, Op::Mul | Op::Div | Op::Mod)
}

/// Predictive recursive descent over the scanner's token stream.
///
/// ```text
/// Program      ::= BlockCommand <eot>
/// BlockCommand ::= 'if' Expr 'then' SingleCmd 'else' SingleCmd
///              |   'while' Expr 'do' SingleCmd
///              |   'let' Decls 'in' SingleCmd
///              |   'begin' Commands 'end'
/// Commands     ::= SingleCmd (';' SingleCmd)* [';']
/// SingleCmd    ::= BlockCommand
///              |   Identifier ':=' Expr
///              |   Identifier '(' Args ')'
///              |   'return' Expr
/// Expr         ::= Identifier '(' Args ')'
///              |   SecExpr (('+'|'-'|'<'|'>'|'=') SecExpr)*
/// SecExpr      ::= PriExpr (('*'|'/'|'\') PriExpr)*
/// PriExpr      ::= IntLit | Identifier '(' Args ')' | Identifier
///              |   Operator PriExpr | '(' Expr ')'
/// Decls        ::= ('const' Identifier '~' Expr Sep
///              |   'var' Identifier ':' Identifier Sep
///              |   'func' Identifier '(' Params ')' ':' Identifier SingleCmd)+
/// Sep          ::= ';'                   -- omittable right before 'in'
/// Params       ::= Identifier ':' Identifier (',' Identifier ':' Identifier)*
/// Args         ::= Expr (',' Expr)*
/// ```
///
/// One token of lookahead, plus a second one to tell `Identifier :=` from
/// `Identifier (`. Both operator tiers fold iteratively to the left. The
/// first ill-formed token aborts the parse; there is no recovery.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // the scanner always terminates the stream; guard against a
        // hand-built one that doesn't
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::Eot) {
            tokens.push(TokenKind::Eot.at(Span::default()));
        }

        Self { tokens, index: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn lookahead(&self) -> &TokenKind {
        match self.tokens.get(self.index + 1) {
            Some(token) => &token.kind,
            None => self.kind(),
        }
    }

    fn span(&self) -> Span {
        self.current().span
    }

    fn advance(&mut self) {
        if self.current().kind != TokenKind::Eot {
            self.index += 1;
        }
    }

    fn unexpected(&self, expected: impl Into<Cow<'static, str>>) -> ParseError {
        ErrorKind::UnexpectedToken {
            expected: expected.into(),
            actual: self.current().to_string(),
        }
        .at(self.span())
    }

    fn expect(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        if self.current().kind != expected {
            return Err(self.unexpected(expected.to_string()));
        }

        self.advance();
        Ok(())
    }

    fn accept(&mut self, kind: &TokenKind) -> bool {
        if self.kind() == kind {
            self.advance();
            return true;
        }

        false
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn vname(&mut self) -> Result<Vname, ParseError> {
        Ok(Vname(self.ident()?))
    }

    fn type_denoter(&mut self) -> Result<TypeDenoter, ParseError> {
        Ok(TypeDenoter(self.ident()?))
    }

    fn block_command(&mut self) -> Result<Command, ParseError> {
        match self.kind() {
            TokenKind::If => {
                self.advance();
                let cond = self.expr()?;
                self.expect(TokenKind::Then)?;
                let then = self.single_command()?;
                self.expect(TokenKind::Else)?;
                let alt = self.single_command()?;

                Ok(Command::If {
                    cond,
                    then: Box::new(then),
                    alt: Box::new(alt),
                })
            }
            TokenKind::While => {
                self.advance();
                let cond = self.expr()?;
                self.expect(TokenKind::Do)?;
                let body = self.single_command()?;

                Ok(Command::While {
                    cond,
                    body: Box::new(body),
                })
            }
            TokenKind::Let => {
                self.advance();
                let decls = self.declarations()?;
                self.expect(TokenKind::In)?;
                let body = self.single_command()?;

                Ok(Command::Let {
                    decls,
                    body: Box::new(body),
                })
            }
            TokenKind::Begin => {
                self.advance();
                let command = self.commands()?;
                self.expect(TokenKind::End)?;
                Ok(command)
            }
            _ => Err(self.unexpected("if, while, let or begin")),
        }
    }

    fn commands(&mut self) -> Result<Command, ParseError> {
        let mut command = self.single_command()?;

        while self.accept(&TokenKind::Semi) {
            if matches!(self.kind(), TokenKind::End | TokenKind::Eot) {
                break;
            }

            let next = self.single_command()?;
            command = Command::Sequential(Box::new(command), Box::new(next));
        }

        Ok(command)
    }

    fn single_command(&mut self) -> Result<Command, ParseError> {
        match self.kind() {
            TokenKind::If | TokenKind::While | TokenKind::Let | TokenKind::Begin => {
                self.block_command()
            }
            TokenKind::Return => {
                self.advance();
                Ok(Command::Return(self.expr()?))
            }
            TokenKind::Ident(_) => match self.lookahead() {
                TokenKind::Becomes => {
                    let target = self.vname()?;
                    self.advance();
                    Ok(Command::Assign(target, self.expr()?))
                }
                TokenKind::LParen => {
                    let (name, args) = self.call()?;
                    Ok(Command::Call { name, args })
                }
                _ => Err(self.unexpected(":= or (")),
            },
            _ => Err(self.unexpected("a command")),
        }
    }

    fn call(&mut self) -> Result<(String, Vec<Expr>), ParseError> {
        let name = self.ident()?;
        self.expect(TokenKind::LParen)?;
        let args = self.args()?;
        self.expect(TokenKind::RParen)?;

        Ok((name, args))
    }

    fn args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![self.expr()?];

        while self.accept(&TokenKind::Comma) {
            args.push(self.expr()?);
        }

        Ok(args)
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        // a call at the head of an expression takes the whole expression:
        // no binary tail follows it
        if matches!(self.kind(), TokenKind::Ident(_))
            && matches!(self.lookahead(), TokenKind::LParen)
        {
            let (name, args) = self.call()?;
            return Ok(Expr::Call { name, args });
        }

        let mut expr = self.sec_expr()?;

        while let TokenKind::Operator(op) = self.kind() {
            let op = *op;

            if !is_additive(op) {
                break;
            }

            self.advance();
            let rhs = self.sec_expr()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
        }

        Ok(expr)
    }

    fn sec_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.pri_expr()?;

        while let TokenKind::Operator(op) = self.kind() {
            let op = *op;

            if !is_multiplicative(op) {
                break;
            }

            self.advance();
            let rhs = self.pri_expr()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
        }

        Ok(expr)
    }

    fn pri_expr(&mut self) -> Result<Expr, ParseError> {
        match self.kind() {
            TokenKind::IntLit(value) => {
                let value = *value;
                self.advance();
                Ok(Expr::Int(value))
            }
            TokenKind::Ident(_) if matches!(self.lookahead(), TokenKind::LParen) => {
                let (name, args) = self.call()?;
                Ok(Expr::Call { name, args })
            }
            TokenKind::Ident(_) => Ok(Expr::Var(self.vname()?)),
            TokenKind::Operator(op) => {
                let op = *op;
                self.advance();
                Ok(Expr::Unary(op, Box::new(self.pri_expr()?)))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            kind => Err(ErrorKind::InvalidExpr(kind.clone()).at(self.span())),
        }
    }

    fn declarations(&mut self) -> Result<Decl, ParseError> {
        let mut decl = self.declaration()?;

        while matches!(
            self.kind(),
            TokenKind::Const | TokenKind::Var | TokenKind::Func
        ) {
            let next = self.declaration()?;
            decl = Decl::Sequential(Box::new(decl), Box::new(next));
        }

        Ok(decl)
    }

    fn declaration(&mut self) -> Result<Decl, ParseError> {
        match self.kind() {
            TokenKind::Const => {
                self.advance();
                let name = self.ident()?;
                self.expect(TokenKind::Is)?;
                let init = self.expr()?;
                self.decl_separator()?;

                Ok(Decl::Const { name, init })
            }
            TokenKind::Var => {
                self.advance();
                let name = self.ident()?;
                self.expect(TokenKind::Colon)?;
                let type_name = self.type_denoter()?;
                self.decl_separator()?;

                Ok(Decl::Var { name, type_name })
            }
            TokenKind::Func => self.func_declaration(),
            _ => Err(self.unexpected("const, var or func")),
        }
    }

    /// `;` separates simple declarations; it may be omitted right before
    /// `in`. A function declaration needs none, its body delimits it.
    fn decl_separator(&mut self) -> Result<(), ParseError> {
        if !self.accept(&TokenKind::Semi) && !matches!(self.kind(), TokenKind::In | TokenKind::Eot)
        {
            return Err(self.unexpected(";"));
        }

        Ok(())
    }

    fn func_declaration(&mut self) -> Result<Decl, ParseError> {
        self.advance();
        let name = self.ident()?;
        self.expect(TokenKind::LParen)?;
        let params = self.params()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Colon)?;
        let return_type = self.type_denoter()?;
        let body = self.single_command()?;

        Ok(Decl::Func {
            name,
            params,
            return_type,
            body: Box::new(body),
        })
    }

    fn params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = vec![self.param()?];

        while self.accept(&TokenKind::Comma) {
            params.push(self.param()?);
        }

        Ok(params)
    }

    fn param(&mut self) -> Result<Param, ParseError> {
        let name = self.ident()?;
        self.expect(TokenKind::Colon)?;
        let type_name = self.type_denoter()?;

        Ok(Param { name, type_name })
    }

    pub fn parse(mut self) -> Result<Program, ParseError> {
        let command = self.block_command()?;
        self.expect(TokenKind::Eot)?;

        Ok(Program { command })
    }
}
