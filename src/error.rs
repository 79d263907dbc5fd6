use std::fmt::{Debug, Display};

use crate::{
    compiler::CompileError,
    eval::EvalError,
    lexer::{ScanError, Span},
    parser::ParseError,
};

pub trait IntoSpanned {
    fn at(self, span: Span) -> SpannedError<Self>
    where
        Self: Sized + Display;
}

impl<T: Display> IntoSpanned for T {
    fn at(self, span: Span) -> SpannedError<Self>
    where
        Self: Sized + Display,
    {
        SpannedError { kind: self, span }
    }
}

#[derive(Debug)]
pub struct SpannedError<T: Display> {
    pub kind: T,
    pub span: Span,
}

impl<T: Display> Display for SpannedError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl<T: Display + Debug> std::error::Error for SpannedError<T> {}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ScanError: {0}")]
    Scan(#[from] ScanError),
    #[error("ParseError: {0}")]
    Parse(#[from] ParseError),
    #[error("CompileError: {0}")]
    Compile(#[from] CompileError),
    #[error("EvalError: {0}")]
    Eval(#[from] EvalError),
    #[error("SerializeError: {0}")]
    Serialize(#[from] ron::Error),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::Scan(e) => e.span,
            Error::Parse(e) => e.span,
            Error::Io(_) | Error::Compile(_) | Error::Eval(_) | Error::Serialize(_) => {
                Span::default()
            }
        }
    }
}
