//! CLI logic for the bitconf tool.
//!
//! Reads a Fluent Bit classic configuration, resolves its includes and
//! prints the result as normalized text, JSON or a token dump.

pub mod config;
pub mod error;
pub mod error_adapter;

mod args;

pub use args::{Args, OutputFormat};

use std::{fmt::Write as _, fs, io, path::Path};

use log::{debug, info};
use serde::Serialize;

use bitconf_parser::{
    Directive, ParseError, ParsedConfig, RenderOptions, SchemaEntry, TokenKind,
    looks_like_fluent_bit, parse,
};

use error::CliError;

/// JSON document written by [`OutputFormat::Json`].
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    directives: &'a [Directive],
    config: &'a [SchemaEntry],
}

/// Run the bitconf CLI application
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors, carrying the text of the file they were found in
/// - JSON serialization errors
pub fn run(args: &Args) -> Result<(), CliError> {
    let format = args.format;
    info!(input_path = args.input, format:?; "Processing configuration");

    let source = fs::read_to_string(&args.input)?;

    if args.detect {
        let detected = looks_like_fluent_bit(&source);
        debug!(detected; "Detection finished");
        return write_output(args.output.as_deref(), &format!("{detected}\n"));
    }

    let app_config = config::load_config(args.config.as_ref())?.with_overrides(args);
    debug!(app_config:?; "Effective configuration");

    let parsed = parse(&source, &args.input, &app_config.parser)
        .map_err(|err| parse_failure(err, &args.input, &source))?;
    info!(
        blocks = parsed.structure().len(),
        directives = parsed.directives().len();
        "Configuration parsed"
    );

    let output = format_output(&parsed, format, &app_config.render)?;
    write_output(args.output.as_deref(), &output)?;

    if let Some(path) = &args.output {
        info!(output_file = path; "Output written");
    }

    Ok(())
}

/// Format a parsed configuration for output.
///
/// # Errors
///
/// Returns `CliError::Json` when JSON serialization fails.
pub fn format_output(
    parsed: &ParsedConfig,
    format: OutputFormat,
    render: &RenderOptions,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(parsed.render(render)),
        OutputFormat::Json => {
            let document = JsonOutput {
                directives: parsed.directives(),
                config: parsed.schema(),
            };
            let mut json = serde_json::to_string_pretty(&document)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Tokens => Ok(token_dump(parsed)),
    }
}

/// One line per significant token: `file:line:col KIND value`.
fn token_dump(parsed: &ParsedConfig) -> String {
    let mut out = String::new();
    for token in parsed.tokens() {
        if *token.kind() == TokenKind::Whitespace {
            continue;
        }
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{}:{}:{}\t{}\t{}",
            token.source_file().display(),
            token.line(),
            token.col(),
            token.kind().name(),
            token.value()
        );
    }
    out
}

/// Attach the text of the file the error points into.
fn parse_failure(err: ParseError, input: &str, source: &str) -> CliError {
    let in_input = fs::canonicalize(input)
        .ok()
        .zip(fs::canonicalize(err.file_path()).ok())
        .is_some_and(|(input, failed)| input == failed);

    let src = if in_input {
        source.to_string()
    } else {
        fs::read_to_string(err.file_path()).unwrap_or_default()
    };
    CliError::new_parse_error(err, src)
}

fn write_output(path: Option<&str>, contents: &str) -> Result<(), CliError> {
    match path {
        Some(path) => fs::write(Path::new(path), contents)?,
        None => {
            use io::Write as _;
            io::stdout().lock().write_all(contents.as_bytes())?;
        }
    }
    Ok(())
}
