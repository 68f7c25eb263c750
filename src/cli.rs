//! Command-line surface: argument parsing and logging setup (spec.md §6, SPEC_FULL.md §10.2/10.3).
//!
//! The original source's argument handling and source-location logger are out of scope for the
//! compiler itself (its job starts once a source string is in hand); `clap` and `log`, the way
//! the teacher's `bin/why` wires them up, fill that ambient role here instead.

use clap::{Parser, ValueEnum};

/// Stop the pipeline after a given stage and print its intermediate form, instead of emitting
/// assembly. Mutually exclusive -- at most one may be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPoint {
    Lex,
    Parse,
    TypeCheck,
    EmitC,
    EmitAsm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Verbosity {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Error => log::LevelFilter::Error,
            Verbosity::Warn => log::LevelFilter::Warn,
            Verbosity::Info => log::LevelFilter::Info,
            Verbosity::Debug => log::LevelFilter::Debug,
            Verbosity::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "jplc", version, about = "Compiler for the JPL array language")]
pub struct Cli {
    /// Source file to compile.
    pub file: String,

    /// Print the token stream and stop.
    #[arg(short = 'l', long, conflicts_with_all = ["parse", "typecheck", "emit_c", "emit_asm"])]
    pub lex: bool,

    /// Print the parsed (untyped) AST and stop.
    #[arg(short = 'p', long, conflicts_with_all = ["lex", "typecheck", "emit_c", "emit_asm"])]
    pub parse: bool,

    /// Print the type-checked AST and stop.
    #[arg(short = 't', long, conflicts_with_all = ["lex", "parse", "emit_c", "emit_asm"])]
    pub typecheck: bool,

    /// Emit portable C instead of assembly and stop.
    #[arg(short = 'i', long = "emit-c", conflicts_with_all = ["lex", "parse", "typecheck", "emit_asm"])]
    pub emit_c: bool,

    /// Emit x86-64 assembly and stop (the default behavior, spelled out explicitly).
    #[arg(short = 's', long = "emit-asm", conflicts_with_all = ["lex", "parse", "typecheck", "emit_c"])]
    pub emit_asm: bool,

    /// Apply the optimizations described in spec.md §4.4/§4.5.
    #[arg(short = 'O', long = "O1")]
    pub opt: bool,

    #[arg(long, value_enum, default_value_t = Verbosity::Error)]
    pub verbosity: Verbosity,
}

impl Cli {
    pub fn stop_point(&self) -> Option<StopPoint> {
        if self.lex {
            Some(StopPoint::Lex)
        } else if self.parse {
            Some(StopPoint::Parse)
        } else if self.typecheck {
            Some(StopPoint::TypeCheck)
        } else if self.emit_c {
            Some(StopPoint::EmitC)
        } else if self.emit_asm {
            Some(StopPoint::EmitAsm)
        } else {
            None
        }
    }
}

pub fn init_logging(verbosity: Verbosity) {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(verbosity.level_filter())
        .init();
}
