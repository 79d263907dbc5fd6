#![allow(dead_code)]

use std::{fs, io::Cursor};

use triangle::{
    ast::Program,
    bytecode::Unit,
    error::Error,
    lexer::{Lexer, Token},
    parser::Parser,
    Compiler, Evaluator,
};

pub fn scan_str(source: &str) -> Result<Vec<Token>, Error> {
    let chars = source.chars().collect::<Vec<_>>();
    let mut lexer = Lexer::new(&chars);

    Ok(lexer.lex()?)
}

pub fn parse_str(source: &str) -> Result<Program, Error> {
    let tokens = scan_str(source)?;
    Ok(Parser::new(tokens).parse()?)
}

pub fn compile_str(source: &str) -> Result<Unit, Error> {
    let program = parse_str(source)?;
    Ok(Compiler::default().compile(&program)?)
}

/// Runs a program under the tree-walking evaluator, feeding it `input`
/// and returning everything it printed.
pub fn eval_str(source: &str, input: &str) -> Result<String, Error> {
    let program = parse_str(source)?;
    let mut output = Vec::new();

    let mut evaluator = Evaluator::new(Cursor::new(input), &mut output);
    evaluator.run(&program)?;

    Ok(String::from_utf8_lossy(&output).into_owned())
}

pub fn parse(name: &str) -> Result<Program, Error> {
    let source = fs::read_to_string(format!("tests/source/{name}"))?;
    parse_str(&source)
}

pub fn compile(name: &str) -> Result<Unit, Error> {
    let source = fs::read_to_string(format!("tests/source/{name}"))?;
    compile_str(&source)
}

pub fn eval(name: &str, input: &str) -> Result<String, Error> {
    let source = fs::read_to_string(format!("tests/source/{name}"))?;
    eval_str(&source, input)
}
