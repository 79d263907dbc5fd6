use std::collections::HashSet;

use crate::{
    ast::{Command, Decl, Expr, Op, Program, Vname},
    bytecode::{Builtin, Instr, Label, Unit},
};

mod scope;

use scope::{Binding, ScopeStack};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("the root command of a program must be a let command")]
    RootNotLet,
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("'{0}' is not a function")]
    NotCallable(String),
    #[error("function '{name}' takes {expected} argument(s), {actual} given")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("unary '{0}' is not defined")]
    InvalidUnary(Op),
    #[error("{0} expects exactly one argument")]
    BuiltinArity(Builtin),
    #[error("getint expects a variable reference as its argument")]
    GetIntTarget,
    #[error("label {0} is defined more than once")]
    DuplicateLabel(Label),
    #[error("jump to undefined label {0}")]
    UndefinedLabel(Label),
}

/// Every label must be defined exactly once, and every jump must target a
/// label defined in the same unit. Nested units are checked when they are
/// sealed.
fn verify_labels(unit: &Unit) -> Result<(), CompileError> {
    let mut defined = HashSet::new();

    for instr in &unit.instructions {
        if let Instr::Label(label) = instr {
            if !defined.insert(*label) {
                return Err(CompileError::DuplicateLabel(*label));
            }
        }
    }

    for instr in &unit.instructions {
        match instr {
            Instr::Jump(label) | Instr::JumpIfFalse(label) if !defined.contains(label) => {
                return Err(CompileError::UndefinedLabel(*label));
            }
            _ => {}
        }
    }

    Ok(())
}

/// One compilation unit under construction: its instruction list and its
/// own scope-frame stack.
struct UnitBuilder {
    parameters: Vec<String>,
    instructions: Vec<Instr>,
    scopes: ScopeStack,
}

impl UnitBuilder {
    fn new(parameters: Vec<String>) -> Self {
        Self {
            parameters,
            instructions: vec![],
            scopes: ScopeStack::new(),
        }
    }

    fn emit(&mut self, instr: Instr) {
        self.instructions.push(instr);
    }

    fn resolve(&self, vname: &Vname) -> Result<String, CompileError> {
        self.scopes
            .lookup(&vname.0)
            .map(|binding| binding.resolved().to_string())
            .ok_or_else(|| CompileError::UnknownName(vname.0.clone()))
    }

    fn seal(self) -> Result<Unit, CompileError> {
        let unit = Unit {
            parameters: self.parameters,
            instructions: self.instructions,
        };

        verify_labels(&unit)?;
        Ok(unit)
    }
}

/// Lowers a parsed program to a stack-machine instruction sequence.
///
/// All working state is local to one `compile` call: units under
/// construction live on the Rust call stack and each owns its scope
/// frames, so independent programs can be compiled concurrently.
#[derive(Default)]
pub struct Compiler {
    labels: u32,
}

impl Compiler {
    fn next_label(&mut self) -> Label {
        let label = Label(self.labels);
        self.labels += 1;
        label
    }

    pub fn compile(mut self, program: &Program) -> Result<Unit, CompileError> {
        if !matches!(program.command, Command::Let { .. }) {
            return Err(CompileError::RootNotLet);
        }

        let mut unit = UnitBuilder::new(vec![]);
        self.command(&mut unit, &program.command)?;
        unit.emit(Instr::PushNil);
        unit.emit(Instr::Return);

        unit.seal()
    }

    fn command(&mut self, unit: &mut UnitBuilder, command: &Command) -> Result<(), CompileError> {
        match command {
            Command::Assign(target, expr) => {
                let resolved = unit.resolve(target)?;
                self.expr(unit, expr)?;
                unit.emit(Instr::Store(resolved));
                Ok(())
            }
            Command::Call { name, args } => self.call(unit, name, args),
            Command::Sequential(first, second) => {
                self.command(unit, first)?;
                self.command(unit, second)
            }
            Command::If { cond, then, alt } => {
                let alt_label = self.next_label();
                let exit = self.next_label();

                self.expr(unit, cond)?;
                unit.emit(Instr::JumpIfFalse(alt_label));
                self.command(unit, then)?;
                unit.emit(Instr::Jump(exit));
                unit.emit(Instr::Label(alt_label));
                self.command(unit, alt)?;
                unit.emit(Instr::Label(exit));
                Ok(())
            }
            Command::While { cond, body } => {
                let top = self.next_label();
                let exit = self.next_label();

                unit.emit(Instr::Label(top));
                self.expr(unit, cond)?;
                unit.emit(Instr::JumpIfFalse(exit));
                self.command(unit, body)?;
                unit.emit(Instr::Jump(top));
                unit.emit(Instr::Label(exit));
                Ok(())
            }
            Command::Let { decls, body } => {
                unit.scopes.push_frame();
                self.declaration(unit, decls)?;
                self.command(unit, body)?;
                unit.scopes.pop_frame();
                Ok(())
            }
            Command::Return(expr) => {
                self.expr(unit, expr)?;
                unit.emit(Instr::Return);
                Ok(())
            }
        }
    }

    fn declaration(&mut self, unit: &mut UnitBuilder, decl: &Decl) -> Result<(), CompileError> {
        match decl {
            Decl::Var { name, .. } => {
                let resolved = unit.scopes.declare_variable(name);
                unit.emit(Instr::PushNil);
                unit.emit(Instr::Store(resolved));
                Ok(())
            }
            Decl::Const { name, init } => {
                // the initializer is lowered before the name is bound, so
                // a shadowing const can still read the binding it shadows
                self.expr(unit, init)?;
                let resolved = unit.scopes.declare_variable(name);
                unit.emit(Instr::Store(resolved));
                Ok(())
            }
            Decl::Sequential(first, second) => {
                self.declaration(unit, first)?;
                self.declaration(unit, second)
            }
            Decl::Func {
                name, params, body, ..
            } => {
                let parameters: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
                let mut inner = UnitBuilder::new(parameters.clone());

                for param in &parameters {
                    inner.scopes.declare_variable(param);
                }

                // no implicit return is appended: a body that falls
                // through ends the unit without one
                self.command(&mut inner, body)?;
                let nested = inner.seal()?;

                let resolved = unit.scopes.declare_function(name, params.len());
                unit.emit(Instr::MakeFn(nested));
                unit.emit(Instr::Store(resolved));
                Ok(())
            }
        }
    }

    fn call(&mut self, unit: &mut UnitBuilder, name: &str, args: &[Expr]) -> Result<(), CompileError> {
        if let Some(builtin) = Builtin::from_name(name) {
            return self.builtin(unit, builtin, args);
        }

        let binding = unit
            .scopes
            .lookup(name)
            .ok_or_else(|| CompileError::UnknownName(name.to_string()))?;

        let (resolved, arity) = match binding {
            Binding::Function { resolved, arity } => (resolved.clone(), *arity),
            Binding::Variable { .. } => return Err(CompileError::NotCallable(name.to_string())),
        };

        if args.len() != arity {
            return Err(CompileError::ArityMismatch {
                name: name.to_string(),
                expected: arity,
                actual: args.len(),
            });
        }

        for arg in args {
            self.expr(unit, arg)?;
        }

        unit.emit(Instr::CallFn {
            name: resolved,
            arity,
        });
        Ok(())
    }

    fn builtin(
        &mut self,
        unit: &mut UnitBuilder,
        builtin: Builtin,
        args: &[Expr],
    ) -> Result<(), CompileError> {
        if args.len() != 1 {
            return Err(CompileError::BuiltinArity(builtin));
        }

        match builtin {
            Builtin::PutInt => {
                self.expr(unit, &args[0])?;
                unit.emit(Instr::CallBuiltin(Builtin::PutInt));
            }
            Builtin::GetInt => match &args[0] {
                Expr::Var(vname) => {
                    let resolved = unit.resolve(vname)?;
                    unit.emit(Instr::CallBuiltin(Builtin::GetInt));
                    unit.emit(Instr::Store(resolved));
                }
                _ => return Err(CompileError::GetIntTarget),
            },
        }

        Ok(())
    }

    fn expr(&mut self, unit: &mut UnitBuilder, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Int(value) => {
                unit.emit(Instr::PushInt(*value));
                Ok(())
            }
            Expr::Var(vname) => {
                let resolved = unit.resolve(vname)?;
                unit.emit(Instr::Load(resolved));
                Ok(())
            }
            Expr::Unary(Op::Add, inner) => self.expr(unit, inner),
            Expr::Unary(Op::Sub, inner) => {
                self.expr(unit, inner)?;
                unit.emit(Instr::Negate);
                Ok(())
            }
            Expr::Unary(op, _) => Err(CompileError::InvalidUnary(*op)),
            Expr::Binary(left, op, right) => {
                self.expr(unit, left)?;
                self.expr(unit, right)?;
                unit.emit(Instr::Binary(*op));
                Ok(())
            }
            Expr::Call { name, args } => self.call(unit, name, args),
        }
    }
}
