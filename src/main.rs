use std::{
    fs,
    io::{stdin, stdout},
    path::PathBuf,
    process::exit,
};

use argh::FromArgs;
use ron::ser::PrettyConfig;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

use triangle::{
    ast::Program,
    bytecode::{Instr, Unit},
    error::Error,
    eval::Evaluator,
    lexer::{Lexer, Token},
    parser::Parser,
    Compiler,
};

/// Mini Triangle toolchain
#[derive(FromArgs)]
struct Opts {
    #[argh(subcommand)]
    cmd: Cmd,
}

/// Command
#[derive(FromArgs)]
#[argh(subcommand)]
enum Cmd {
    Run(RunCmd),
    Compile(CompileCmd),
}

/// Evaluate a program
#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
struct RunCmd {
    #[argh(positional)]
    source: PathBuf,
}

/// Compile a program and print the result
#[derive(FromArgs)]
#[argh(subcommand, name = "compile")]
struct CompileCmd {
    #[argh(positional)]
    source: PathBuf,
    #[argh(switch, description = "show the token stream")]
    tokens: bool,
    #[argh(switch, description = "show AST output")]
    ast: bool,
}

fn parse(source: &str) -> Result<Program, Error> {
    let chars = source.chars().collect::<Vec<_>>();
    let mut lexer = Lexer::new(&chars);
    let tokens = lexer.lex()?;
    let parser = Parser::new(tokens);

    Ok(parser.parse()?)
}

fn print_tokens(tokens: &[Token]) {
    for token in tokens {
        println!("{} {}", token.span, token.kind);
    }
}

fn print_unit(unit: &Unit, indent: usize) {
    let prefix = " ".repeat(indent * 2);

    if !unit.parameters.is_empty() {
        println!("{prefix}params: {}", unit.parameters.join(", "));
    }

    for (i, instr) in unit.instructions.iter().enumerate() {
        println!("{prefix}{i:<4}{instr}");

        if let Instr::MakeFn(nested) = instr {
            print_unit(nested, indent + 1);
        }
    }
}

fn print_ast(program: &Program) -> Result<(), Error> {
    println!(
        "{}",
        ron::ser::to_string_pretty(
            program,
            PrettyConfig::default()
                .struct_names(true)
                .indentor("  ")
                .compact_arrays(true)
        )?
    );

    Ok(())
}

fn cmd(opts: Opts) -> Result<(), Error> {
    match opts.cmd {
        Cmd::Run(RunCmd { source }) => {
            let source = fs::read_to_string(source)?;
            let program = parse(&source)?;

            let stdin = stdin();
            let stdout = stdout();
            let mut evaluator = Evaluator::new(stdin.lock(), stdout.lock());
            evaluator.run(&program)?;
        }
        Cmd::Compile(CompileCmd {
            source,
            tokens,
            ast,
        }) => {
            let source = fs::read_to_string(source)?;
            let chars = source.chars().collect::<Vec<_>>();
            let mut lexer = Lexer::new(&chars);
            let stream = lexer.lex()?;

            if tokens {
                print_tokens(&stream);
                return Ok(());
            }

            let program = Parser::new(stream).parse()?;

            if ast {
                return print_ast(&program);
            }

            let unit = Compiler::default().compile(&program)?;
            print_unit(&unit, 0);
        }
    }

    Ok(())
}

fn main() {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = argh::from_env();

    if let Err(e) = cmd(opts) {
        eprintln!("{e} at {}", e.span());
        exit(1);
    }
}
