//! The compiler's single fatal-error kind.
//!
//! Every stage (lex, parse, typecheck) returns `Result<_, CompileError>` instead of aborting the
//! process directly the way the original's `Logger::log_error` does; only `main` turns a
//! `CompileError` into the `Compilation failed: ...` line and a non-zero exit code. This keeps
//! every stage independently testable.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    /// Byte offset into the source file where the error was detected.
    pub offset: usize,
}

impl CompileError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    /// 1-based (line, column), computed by scanning the source up to `self.offset`.
    pub fn line_col(&self, source: &[u8]) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for &byte in source.iter().take(self.offset) {
            if byte == b'\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Render the `Compilation failed: <file>[<line>:<col>]: <message>` line from spec.md §6.
    pub fn render(&self, file: &str, source: &[u8]) -> String {
        let (line, col) = self.line_col(source);
        format!("Compilation failed: {file}[{line}:{col}]: {}", self.message)
    }
}

impl fmt::Display for FormattedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.render(self.1, self.2))
    }
}

/// Wraps a [`CompileError`] together with the context needed to render it, so callers can
/// `format!("{}", FormattedError(&err, &file, source))` without duplicating `render`.
pub struct FormattedError<'a>(pub &'a CompileError, pub &'a str, pub &'a [u8]);

pub type CompileResult<T> = Result<T, CompileError>;
