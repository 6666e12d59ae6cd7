//! Error system for the bitconf parser.
//!
//! Every failure in the parsing pipeline (lexing, directive resolution and
//! structure building) is reported as a single [`ParseError`]. The error
//! carries:
//! - An [`ErrorCode`] for documentation and searchability
//! - The file the error was found in, with a 1-based line and column
//!   (both `0` for whole-file errors)
//! - An optional byte [`Span`](crate::Span) and help text for rich rendering
//!
//! # Example
//!
//! ```
//! # use bitconf_parser::error::{ErrorCode, ParseError};
//! let err = ParseError::whole_file(ErrorCode::E100, "File is empty", "/etc/fluent-bit.conf");
//! assert_eq!(err.to_string(), "/etc/fluent-bit.conf: 0:0 File is empty");
//! ```

mod error_code;
mod parse_error;

pub(crate) use parse_error::Result;

pub use error_code::ErrorCode;
pub use parse_error::ParseError;
