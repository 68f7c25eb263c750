//! Driver binary: reads a `.jpl` source file, runs it through the requested pipeline prefix, and
//! prints either the requested intermediate form or the final C/assembly output.
//!
//! File I/O and argument parsing are themselves out of scope for the compiler crate (spec.md's
//! Non-goals); `anyhow` is used only here, at the process boundary, to unify `std::io::Error`,
//! `CompileError`, and `clap`'s own argument errors before turning them into an exit code.

mod cli;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use cli::{Cli, StopPoint};
use jplc::codegen::{asm, c};
use jplc::lexer::lex_all;
use jplc::parser::parse_program;
use jplc::printer::print_program;
use jplc::typechecker::typecheck_program;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let source = fs::read_to_string(&cli.file)?;

    let tokens = lex_all(&source)?;
    info!("lexed {} tokens", tokens.len());
    if cli.stop_point() == Some(StopPoint::Lex) {
        return Ok(tokens.iter().map(|t| t.to_string()).collect::<Vec<_>>().join("\n"));
    }

    let program = parse_program(&source)?;
    info!("parsed {} top-level commands", program.cmds.len());
    if cli.stop_point() == Some(StopPoint::Parse) {
        // The untyped tree carries no resolved-type annotations to print; typechecking first and
        // reusing the same S-expression printer keeps `-p`/`-t` output consistent (see DESIGN.md).
        let (typed, _) = typecheck_program(&program)?;
        return Ok(print_program(&typed));
    }

    let (typed, ctx) = typecheck_program(&program)?;
    info!("type-checked program against {} top-level commands", typed.cmds.len());
    if cli.stop_point() == Some(StopPoint::TypeCheck) {
        return Ok(print_program(&typed));
    }

    if cli.stop_point() == Some(StopPoint::EmitC) {
        return Ok(c::emit_c(&typed, &ctx));
    }

    Ok(asm::emit_asm(&typed, &ctx, cli.opt))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity);

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            println!("Compilation succeeded");
            ExitCode::SUCCESS
        }
        Err(err) => {
            if let Some(compile_err) = err.downcast_ref::<jplc::CompileError>() {
                let source = fs::read_to_string(&cli.file).unwrap_or_default();
                println!("{}", compile_err.render(&cli.file, source.as_bytes()));
            } else {
                println!("Compilation failed: {err}");
            }
            ExitCode::FAILURE
        }
    }
}
