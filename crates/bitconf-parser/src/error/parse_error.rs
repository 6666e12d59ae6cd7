//! The ParseError type.
//!
//! [`ParseError`] is the only error produced by the parsing pipeline. Its
//! [`Display`](std::fmt::Display) rendering is `"<file>: <line>:<col> <message>"`.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

use crate::{
    error::ErrorCode,
    span::{Position, Span},
};

/// A type alias for `Result<T, ParseError>`.
pub type Result<T> = std::result::Result<T, ParseError>;

/// A located parse failure.
///
/// `line` and `col` are 1-based; both are `0` when the error concerns a
/// whole file rather than a position in it.
#[derive(Debug, Clone, Error)]
#[error("{}: {}:{} {}", .file.display(), .line, .col, .message)]
pub struct ParseError {
    code: ErrorCode,
    message: String,
    file: Arc<Path>,
    line: usize,
    col: usize,
    span: Option<Span>,
    help: Option<String>,
}

impl ParseError {
    /// Create an error that applies to an entire file, reported at `0:0`.
    pub fn whole_file(
        code: ErrorCode,
        message: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            file: Arc::from(file.into()),
            line: 0,
            col: 0,
            span: None,
            help: None,
        }
    }

    /// Create an error located at a token in `file`.
    pub fn at(
        code: ErrorCode,
        message: impl Into<String>,
        file: &Arc<Path>,
        position: Position,
        span: Span,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            file: Arc::clone(file),
            line: position.line,
            col: position.col,
            span: Some(span),
            help: None,
        }
    }

    /// Attach help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the bare message, without location prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the file the error was found in.
    pub fn file_path(&self) -> &Path {
        &self.file
    }

    /// 1-based line, or `0` for whole-file errors.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column, or `0` for whole-file errors.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Byte span in [`file_path`](Self::file_path), if the error has a location.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Get the help text, if any
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The formatted `"<file>: <line>:<col> <message>"` rendering.
    pub fn formatted(&self) -> String {
        self.to_string()
    }
}
