// monkey - A Monkey interpreter and bytecode VM written in Rust
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Command-line entry point: an interactive prompt plus `run` and
//! `compile` subcommands. The `--vm` flag swaps the tree-walking
//! evaluator for the bytecode compiler and virtual machine.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser as ClapParser, Subcommand};

use monkey_core::{Env, Object, eval::eval_program};
use monkey_parser::ast::Program;
use monkey_parser::diagnostics::render_span;
use monkey_parser::parser::parse;
use monkey_vm::compiler::Compiler;
use monkey_vm::vm::{GLOBALS_SIZE, VM};

#[derive(ClapParser)]
#[command(name = "monkey", version, about = "The Monkey programming language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive prompt.
    Repl {
        /// Execute on the bytecode VM instead of the evaluator.
        #[arg(long)]
        vm: bool,
    },
    /// Run a source file.
    Run {
        file: PathBuf,
        /// Execute on the bytecode VM instead of the evaluator.
        #[arg(long)]
        vm: bool,
    },
    /// Compile a source file and print its disassembly.
    Compile { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Repl { vm } => {
            if vm {
                run_vm_repl();
            } else {
                run_eval_repl();
            }
        }
        Command::Run { file, vm } => run_file(&file, vm),
        Command::Compile { file } => compile_file(&file),
    }
}

/// Parse a source string, printing contextual diagnostics on failure.
fn parse_checked(source: &str) -> Option<Program> {
    let program = parse(source);
    if program.diagnostics.is_empty() {
        return Some(program);
    }
    for diagnostic in &program.diagnostics {
        eprint!("{}", diagnostic.render(source));
    }
    None
}

fn read_source(file: &Path) -> String {
    fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("Error reading '{}': {}", file.display(), e);
        process::exit(1);
    })
}

fn run_file(file: &Path, vm: bool) {
    let source = read_source(file);
    let Some(program) = parse_checked(&source) else {
        process::exit(1);
    };

    if vm {
        let mut compiler = Compiler::new();
        if let Err(e) = compiler.compile(&program) {
            eprint!("{}", render_span(&source, e.span(), &e.to_string()));
            process::exit(1);
        }
        if let Err(e) = VM::new(compiler.bytecode()).run() {
            eprintln!("{}", e);
            process::exit(1);
        }
    } else if let Err(e) = eval_program(&program, &Env::new()) {
        eprint!("{}", e.render(&source));
        process::exit(1);
    }
}

fn compile_file(file: &Path) {
    let source = read_source(file);
    let Some(program) = parse_checked(&source) else {
        process::exit(1);
    };

    let mut compiler = Compiler::new();
    if let Err(e) = compiler.compile(&program) {
        eprint!("{}", render_span(&source, e.span(), &e.to_string()));
        process::exit(1);
    }

    let bytecode = compiler.bytecode();
    print!("{}", bytecode.instructions);
    println!();
    println!("Constants:");
    for (i, constant) in bytecode.constants.iter().enumerate() {
        match constant {
            Object::CompiledFunction(func) => {
                println!("{:04}:", i);
                print!("{}", func.instructions);
            }
            other => println!("{:04}: {}", i, other),
        }
    }
}

fn prompt() -> Option<String> {
    print!(">> ");
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => {
            println!();
            None
        }
        Ok(_) => Some(line),
    }
}

/// Evaluator REPL: one environment lives for the whole session, so
/// definitions accumulate across lines.
fn run_eval_repl() {
    println!("Monkey v{}", env!("CARGO_PKG_VERSION"));

    let env = Env::new();
    while let Some(line) = prompt() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(program) = parse_checked(line) else {
            continue;
        };
        match eval_program(&program, &env) {
            Ok(result) => println!("{}", result),
            Err(e) => eprint!("{}", e.render(line)),
        }
    }
}

/// VM REPL: the globals array, symbol table, and constant pool persist
/// across lines; a failed compile or run leaves them intact for the next
/// prompt.
fn run_vm_repl() {
    println!("Monkey v{}", env!("CARGO_PKG_VERSION"));

    let mut symbols = None;
    let mut constants = Vec::new();
    let mut globals = vec![Object::Null; GLOBALS_SIZE];

    while let Some(line) = prompt() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(program) = parse_checked(line) else {
            continue;
        };

        let mut compiler = match symbols.take() {
            Some(symbols) => Compiler::with_state(symbols, std::mem::take(&mut constants)),
            None => Compiler::new(),
        };
        let compiled = compiler.compile(&program);
        let bytecode = compiler.bytecode();
        let state = compiler.into_state();
        (symbols, constants) = (Some(state.0), state.1);

        if let Err(e) = compiled {
            eprint!("{}", render_span(line, e.span(), &e.to_string()));
            continue;
        }

        let mut vm = VM::with_globals(bytecode, std::mem::take(&mut globals));
        let result = vm.run();
        globals = vm.into_globals();

        match result {
            Ok(result) => println!("{}", result),
            Err(e) => eprintln!("{}", e),
        }
    }
}
