//! Error codes for the bitconf error system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexical errors
//! - `E1xx` - Structural errors
//! - `E2xx` - Include errors

use std::fmt;

/// Error codes for categorizing parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexical Errors (E0xx)
    // =========================================================================
    /// Unrecognized directive.
    ///
    /// An `@word` line used a keyword other than `SET` or `INCLUDE`.
    E001,

    /// Invalid syntax.
    ///
    /// Input was found that matches none of the grammar's line forms.
    E002,

    /// Invalid command.
    ///
    /// A block header named a section kind outside the command set.
    E003,

    // =========================================================================
    // Structural Errors (E1xx)
    // =========================================================================
    /// Empty file.
    ///
    /// The file contains nothing but whitespace.
    E100,

    /// Not a Fluent Bit configuration.
    ///
    /// The file contains neither a block header nor an include directive.
    E101,

    /// Unreadable file.
    ///
    /// The top-level file could not be read.
    E102,

    // =========================================================================
    // Include Errors (E2xx)
    // =========================================================================
    /// Too many include arguments.
    ///
    /// `@INCLUDE` takes exactly one path.
    E200,

    /// Missing include argument.
    E201,

    /// Duplicate include.
    ///
    /// A file was included twice in the same configuration.
    E202,

    /// Include not found.
    ///
    /// The included file does not exist or cannot be read.
    E203,

    /// Include depth exceeded.
    E204,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexical errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Structural errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            // Include errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexical errors
            ErrorCode::E001 => "unrecognized directive",
            ErrorCode::E002 => "invalid syntax",
            ErrorCode::E003 => "invalid command",
            // Structural errors
            ErrorCode::E100 => "empty file",
            ErrorCode::E101 => "not a fluent bit configuration",
            ErrorCode::E102 => "unreadable file",
            // Include errors
            ErrorCode::E200 => "too many include arguments",
            ErrorCode::E201 => "missing include argument",
            ErrorCode::E202 => "duplicate include",
            ErrorCode::E203 => "include not found",
            ErrorCode::E204 => "include depth exceeded",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
