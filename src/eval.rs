use std::{
    collections::HashMap,
    io::{BufRead, Write},
};

use crate::ast::{Command, Decl, Expr, Op, Program, Vname};

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("the root command of a program must be a let command")]
    RootNotLet,
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("variable '{0}' is read before assignment")]
    Unassigned(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("unary '{0}' is not defined")]
    InvalidUnary(Op),
    #[error("'{0}' expects exactly one argument")]
    BuiltinArity(String),
    #[error("getint expects a variable reference as its argument")]
    GetIntTarget,
    #[error("invalid input: expected an integer")]
    InvalidInput,
    #[error("unexpected end of input")]
    EndOfInput,
    #[error("function declarations are not supported by the evaluator")]
    FunctionDecl,
    #[error("return is not supported by the evaluator")]
    Return,
    #[error("call to '{0}': user functions are not supported by the evaluator")]
    UserCall(String),
}

/// Integer division truncates toward zero and `\` keeps the dividend's
/// sign, matching the compiled backend.
fn binary(lhs: i64, op: Op, rhs: i64) -> Result<i64, EvalError> {
    Ok(match op {
        Op::Add => lhs + rhs,
        Op::Sub => lhs - rhs,
        Op::Mul => lhs * rhs,
        Op::Div => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs / rhs
        }
        Op::Mod => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs % rhs
        }
        Op::Lt => (lhs < rhs) as i64,
        Op::Gt => (lhs > rhs) as i64,
        Op::Eq => (lhs == rhs) as i64,
    })
}

/// Tree-walking interpreter over the AST, kept as a second backend to
/// cross-check the compiler on the function-free subset of the language:
/// user functions and `return` are rejected, not silently skipped.
///
/// Bindings live in one flat map for the whole run; nested lets neither
/// shadow nor release. `getint` blocks on the injected reader until one
/// line is available.
pub struct Evaluator<R, W> {
    env: HashMap<String, (String, Option<i64>)>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Evaluator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            env: HashMap::new(),
            input,
            output,
        }
    }

    pub fn run(&mut self, program: &Program) -> Result<(), EvalError> {
        if !matches!(program.command, Command::Let { .. }) {
            return Err(EvalError::RootNotLet);
        }

        self.command(&program.command)
    }

    fn command(&mut self, command: &Command) -> Result<(), EvalError> {
        match command {
            Command::Let { decls, body } => {
                self.declaration(decls)?;
                self.command(body)
            }
            Command::Sequential(first, second) => {
                self.command(first)?;
                self.command(second)
            }
            Command::Assign(target, expr) => {
                let value = self.expr(expr)?;
                self.assign(&target.0, value)
            }
            Command::Call { name, args } => self.call(name, args),
            Command::If { cond, then, alt } => {
                if self.expr(cond)? != 0 {
                    self.command(then)
                } else {
                    self.command(alt)
                }
            }
            Command::While { cond, body } => {
                while self.expr(cond)? != 0 {
                    self.command(body)?;
                }
                Ok(())
            }
            Command::Return(_) => Err(EvalError::Return),
        }
    }

    fn declaration(&mut self, decl: &Decl) -> Result<(), EvalError> {
        match decl {
            Decl::Var { name, type_name } => {
                self.env.insert(name.clone(), (type_name.0.clone(), None));
                Ok(())
            }
            Decl::Const { name, init } => {
                let value = self.expr(init)?;
                self.env
                    .insert(name.clone(), ("Integer".to_string(), Some(value)));
                Ok(())
            }
            Decl::Sequential(first, second) => {
                self.declaration(first)?;
                self.declaration(second)
            }
            Decl::Func { .. } => Err(EvalError::FunctionDecl),
        }
    }

    fn assign(&mut self, name: &str, value: i64) -> Result<(), EvalError> {
        match self.env.get_mut(name) {
            Some(slot) => {
                slot.1 = Some(value);
                Ok(())
            }
            None => Err(EvalError::UnknownName(name.to_string())),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<(), EvalError> {
        match name {
            "putint" => {
                if args.len() != 1 {
                    return Err(EvalError::BuiltinArity(name.to_string()));
                }

                let value = self.expr(&args[0])?;
                writeln!(self.output, "{value}")?;
                Ok(())
            }
            "getint" => {
                if args.len() != 1 {
                    return Err(EvalError::BuiltinArity(name.to_string()));
                }

                match &args[0] {
                    Expr::Var(Vname(target)) => {
                        let value = self.read_int()?;
                        self.assign(target, value)
                    }
                    _ => Err(EvalError::GetIntTarget),
                }
            }
            _ => Err(EvalError::UserCall(name.to_string())),
        }
    }

    /// Blocks until one line of input is available.
    fn read_int(&mut self) -> Result<i64, EvalError> {
        let mut line = String::new();

        if self.input.read_line(&mut line)? == 0 {
            return Err(EvalError::EndOfInput);
        }

        line.trim().parse().map_err(|_| EvalError::InvalidInput)
    }

    fn expr(&mut self, expr: &Expr) -> Result<i64, EvalError> {
        match expr {
            Expr::Int(value) => Ok(*value),
            Expr::Var(Vname(name)) => match self.env.get(name) {
                Some((_, Some(value))) => Ok(*value),
                Some((_, None)) => Err(EvalError::Unassigned(name.clone())),
                None => Err(EvalError::UnknownName(name.clone())),
            },
            Expr::Unary(Op::Add, inner) => self.expr(inner),
            Expr::Unary(Op::Sub, inner) => Ok(-self.expr(inner)?),
            Expr::Unary(op, _) => Err(EvalError::InvalidUnary(*op)),
            Expr::Binary(left, op, right) => {
                let lhs = self.expr(left)?;
                let rhs = self.expr(right)?;
                binary(lhs, *op, rhs)
            }
            Expr::Call { name, .. } => Err(EvalError::UserCall(name.clone())),
        }
    }
}
