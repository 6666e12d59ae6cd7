//! Command-line argument definitions for the bitconf CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input file, the output format and
//! destination, parser and layout overrides, configuration file selection and
//! logging verbosity.

use clap::{Parser, ValueEnum};

/// What to print for a successfully parsed configuration.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Normalized configuration text
    #[default]
    Text,
    /// Directives and public schema as JSON
    Json,
    /// The flattened token stream, one token per line
    Tokens,
}

/// Command-line arguments for the bitconf tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input Fluent Bit configuration file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output file; standard output when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip `@INCLUDE` directives with absolute paths
    #[arg(long)]
    pub ignore_full_paths: bool,

    /// Property indentation for text output
    #[arg(long)]
    pub indent: Option<usize>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Only report whether the input looks like a Fluent Bit configuration
    #[arg(long)]
    pub detect: bool,
}
