//! # Bitconf Parser
//!
//! Parser for Fluent Bit's classic configuration format. This crate turns
//! the text of a configuration file, with its `@INCLUDE` tree, into a
//! flattened token stream, an ordered list of blocks and a public schema.
//!
//! ## Usage
//!
//! ```
//! # use bitconf_parser::{parse, ParseOptions, ParseError, Command};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "[INPUT]\n    Name tail\n    Tag  tail.01\n";
//!
//!     let config = parse(source, "fluent-bit.conf", &ParseOptions::default())?;
//!     assert_eq!(config.schema()[0].command, Command::Input);
//!     Ok(())
//! }
//! ```

mod detect;
pub mod error;
mod lexer;
mod render;
mod resolver;
mod schema;
mod span;
mod structure;
mod token_index;
mod tokens;

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, trace};
use serde::Deserialize;

pub use detect::looks_like_fluent_bit;
pub use error::{ErrorCode, ParseError};
pub use render::{RenderOptions, render};
pub use resolver::{Directive, DirectiveKind, MAX_INCLUDE_DEPTH};
pub use schema::{INTERNAL_NAME_MARKERS, SchemaEntry, is_public_block};
pub use span::{Position, Span};
pub use structure::{Block, BlockId};
pub use tokens::{Command, DirectiveKeyword, Token, TokenKind};

use resolver::ResolveContext;
use token_index::TokenIndex;

/// Options that change how a configuration is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Skip `@INCLUDE` directives whose path is absolute.
    pub ignore_full_paths: bool,
}

/// The result of a successful parse.
///
/// Every view is computed once during [`parse`]; accessors are cheap.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    file_path: Arc<Path>,
    source: String,
    tokens: Vec<Token>,
    directives: Vec<Directive>,
    blocks: Vec<Block>,
    index: TokenIndex,
    schema: Vec<SchemaEntry>,
}

impl ParsedConfig {
    /// Absolute path of the top-level file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Text of the top-level file, as given to [`parse`].
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Flattened token stream with every include expanded in place.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// `@SET` and `@INCLUDE` directives in resolution order.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Every block, including reserved and internal ones.
    pub fn structure(&self) -> &[Block] {
        &self.blocks
    }

    /// The user-facing subset of [`Self::structure`].
    pub fn schema(&self) -> &[SchemaEntry] {
        &self.schema
    }

    /// Tokens that built block `id`, in stream order.
    ///
    /// Returns `None` for an id that does not belong to this parse.
    pub fn tokens_for_block(&self, id: BlockId) -> Option<Vec<&Token>> {
        let positions = self.index.get(id)?;
        Some(positions.iter().map(|&idx| &self.tokens[idx]).collect())
    }

    /// Render the schema and `@SET` directives back to configuration text.
    pub fn render(&self, options: &RenderOptions) -> String {
        render::render(&self.schema, &self.directives, options)
    }
}

/// Parse configuration text into a [`ParsedConfig`].
///
/// The pipeline:
///
/// 1. **Resolve** - Lex the text and expand `@INCLUDE` directives depth-first
/// 2. **Build** - Reduce the flattened tokens into blocks
/// 3. **Project** - Keep the public blocks as the schema
///
/// `path` names the file the text was read from. Relative `@INCLUDE` paths
/// are resolved against its directory, so it is made absolute first.
///
/// # Errors
///
/// Returns the first [`ParseError`] found in the file or in any included
/// file. No partial result is produced.
pub fn parse(
    source: &str,
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<ParsedConfig, ParseError> {
    let file_path: Arc<Path> = Arc::from(absolute_path(path.as_ref()));
    debug!(file = file_path.display().to_string(); "Parsing configuration");

    // Step 1: Resolve
    let mut context = ResolveContext::new(options);
    let tokens = context.resolve(source, &file_path)?;
    let directives = context.into_directives();
    trace!(tokens = tokens.len(), directives = directives.len(); "Resolved token stream");

    // Step 2: Build
    let (blocks, index) = structure::build(&tokens);

    // Step 3: Project
    let schema = schema::project(&blocks);
    debug!(blocks = blocks.len(), schema = schema.len(); "Parsed configuration");

    Ok(ParsedConfig {
        file_path,
        source: source.to_string(),
        tokens,
        directives,
        blocks,
        index,
        schema,
    })
}

/// Read `path` and [`parse`] its contents.
///
/// # Errors
///
/// An unreadable file is reported as [`ErrorCode::E102`]; everything else is
/// as for [`parse`].
pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<ParsedConfig, ParseError> {
    let path = absolute_path(path.as_ref());
    let source = fs::read_to_string(&path).map_err(|err| unreadable(&path, &err))?;
    parse(&source, path, options)
}

fn unreadable(path: &Path, err: &io::Error) -> ParseError {
    ParseError::whole_file(
        ErrorCode::E102,
        format!("Can not read file {}: {err}", path.display()),
        path,
    )
}

/// Absolute paths are kept as given. Relative paths are canonicalized when
/// they exist, otherwise anchored to the working directory.
fn absolute_path(path: &Path) -> PathBuf {
    let resolved = if path.is_absolute() {
        std::path::absolute(path)
    } else {
        fs::canonicalize(path).or_else(|_| std::path::absolute(path))
    };
    resolved.unwrap_or_else(|_| path.to_path_buf())
}
