//! Error types for the bitconf CLI.

use std::io;

use thiserror::Error;

use bitconf_parser::ParseError;

/// The main error type for CLI operations.
///
/// The `Parse` variant keeps the text of the file the error was found in,
/// so it can be rendered with a source snippet.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
