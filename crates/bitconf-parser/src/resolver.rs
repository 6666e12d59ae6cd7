//! Directive resolution.
//!
//! The resolver lexes a file and walks its tokens, handling directives:
//!
//! - `@SET` lines are recorded in the shared directive list and kept in the
//!   token stream. Their values are never interpreted.
//! - `@INCLUDE path` lines are replaced by the tokens of the included file,
//!   resolved depth-first with the same [`ResolveContext`].
//! - Any other `@word` line is an error.
//!
//! A file may be included at most once per parse. The check is made on the
//! canonical (symlink-resolved) path, so transitive and aliased includes are
//! caught as well.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, trace};
use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{
    ParseOptions,
    detect::looks_like_fluent_bit,
    error::{ErrorCode, ParseError, Result},
    lexer,
    tokens::{DirectiveKeyword, Token, TokenKind},
};

/// Maximum nesting of `@INCLUDE` chains.
pub const MAX_INCLUDE_DEPTH: usize = 32;

/// Kind of a recorded directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Set,
    Include,
}

impl DirectiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveKind::Set => "SET",
            DirectiveKind::Include => "INCLUDE",
        }
    }
}

/// A `@SET` or `@INCLUDE` directive found while resolving a configuration.
///
/// The token's source file is the file the directive was written in for
/// `@SET`, and the resolved path of the included file for `@INCLUDE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    kind: DirectiveKind,
    token: Token,
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Normalized `@KEYWORD argument` text.
    pub fn value(&self) -> &str {
        self.token.value()
    }

    /// The argument after the keyword (`A=B` for `@SET A=B`).
    pub fn argument(&self) -> &str {
        self.token
            .value()
            .split_once(' ')
            .map_or("", |(_, argument)| argument)
    }

    pub fn source_file(&self) -> &Path {
        self.token.source_file()
    }
}

impl Serialize for Directive {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Directive", 5)?;
        state.serialize_field("kind", self.kind.as_str())?;
        state.serialize_field("value", self.value())?;
        state.serialize_field("line", &self.token.line())?;
        state.serialize_field("col", &self.token.col())?;
        state.serialize_field("file", &self.source_file().display().to_string())?;
        state.end()
    }
}

/// Mutable state shared by every file resolved within one top-level parse.
///
/// A context must not be reused across unrelated parses.
#[derive(Debug)]
pub(crate) struct ResolveContext<'o> {
    options: &'o ParseOptions,
    included: HashSet<PathBuf>,
    directives: Vec<Directive>,
    depth: usize,
}

impl<'o> ResolveContext<'o> {
    pub(crate) fn new(options: &'o ParseOptions) -> Self {
        Self {
            options,
            included: HashSet::new(),
            directives: Vec::new(),
            depth: 0,
        }
    }

    /// Consume the context, yielding the directives in resolution order.
    pub(crate) fn into_directives(self) -> Vec<Directive> {
        self.directives
    }

    /// Lex `source` and expand its directives, returning the flattened
    /// token stream.
    ///
    /// # Errors
    ///
    /// Fails on the first structural, lexical or include error in this file
    /// or in any file it includes. Errors from nested files are returned
    /// unchanged.
    pub(crate) fn resolve(&mut self, source: &str, file: &Arc<Path>) -> Result<Vec<Token>> {
        if source.trim_matches(lexer::is_space).is_empty() {
            return Err(ParseError::whole_file(
                ErrorCode::E100,
                "File is empty",
                file.to_path_buf(),
            ));
        }

        let is_config = looks_like_fluent_bit(source);
        let not_a_config = || {
            ParseError::whole_file(
                ErrorCode::E101,
                "This file is not a valid Fluent Bit config file",
                file.to_path_buf(),
            )
            .with_help("add a block header such as `[INPUT]` or an `@INCLUDE` directive")
        };

        debug!(file = file.display().to_string(), depth = self.depth; "Resolving file");

        // Lex failures in marker-less text are reported as E101.
        let lexed = lexer::tokenize(source, file).map_err(|err| {
            if is_config { err } else { not_a_config() }
        })?;

        let mut tokens = Vec::new();
        for token in lexed {
            match token.kind() {
                TokenKind::Directive(DirectiveKeyword::Set) => {
                    trace!(value = token.value(); "Recording @SET directive");
                    self.directives.push(Directive {
                        kind: DirectiveKind::Set,
                        token: token.clone(),
                    });
                    tokens.push(token);
                }
                TokenKind::Directive(DirectiveKeyword::Include) => {
                    tokens.extend(self.include(&token, file)?);
                }
                TokenKind::Directive(DirectiveKeyword::Unrecognized(raw)) => {
                    return Err(ParseError::at(
                        ErrorCode::E001,
                        format!(
                            "You have defined a Directive not supported ({raw}). The supported directives are: {}",
                            DirectiveKeyword::SUPPORTED.join(",")
                        ),
                        file,
                        token.position(),
                        token.span(),
                    ));
                }
                _ => tokens.push(token),
            }
        }

        // Unrecognized directives take precedence over E101.
        if !is_config {
            return Err(not_a_config());
        }

        Ok(tokens)
    }

    /// Expand one `@INCLUDE` token into the included file's tokens.
    fn include(&mut self, token: &Token, file: &Arc<Path>) -> Result<Vec<Token>> {
        let located = |code, message: String| {
            ParseError::at(code, message, file, token.position(), token.span())
        };

        let mut arguments = token.value().split_whitespace().skip(1);
        let Some(include_path) = arguments.next() else {
            return Err(located(
                ErrorCode::E201,
                "@INCLUDE directive requires a path (ex: @INCLUDE path/to/a/file)".to_string(),
            ));
        };
        let extra: Vec<&str> = arguments.collect();
        if !extra.is_empty() {
            return Err(located(
                ErrorCode::E200,
                format!(
                    "You are trying to include {include_path}, but we also found more arguments ({}). @INCLUDE directive can only have a single value (ex: @INCLUDE path/to/a/file)",
                    extra.join(",")
                ),
            ));
        }

        let written = Path::new(include_path);
        if written.is_absolute() && self.options.ignore_full_paths {
            debug!(path = include_path; "Skipping absolute @INCLUDE");
            return Ok(Vec::new());
        }

        if self.depth >= MAX_INCLUDE_DEPTH {
            return Err(located(
                ErrorCode::E204,
                format!(
                    "You are trying to include {include_path}, but includes are nested more than {MAX_INCLUDE_DEPTH} levels deep"
                ),
            ));
        }

        let full_path: Arc<Path> = match file.parent() {
            Some(dir) => Arc::from(dir.join(written)),
            None => Arc::from(written),
        };

        let not_found = || located(ErrorCode::E203, format!("Can not find file {include_path}"));
        let canonical = fs::canonicalize(&full_path).map_err(|_| not_found())?;

        if self.included.contains(&canonical) {
            return Err(located(
                ErrorCode::E202,
                format!(
                    "You are trying to include {}. Fluent Bit does not allow a file to be included twice in the same configuration",
                    canonical.display()
                ),
            ));
        }

        let included_source = fs::read_to_string(&canonical).map_err(|_| not_found())?;
        self.included.insert(canonical);

        debug!(
            path = full_path.display().to_string(),
            from = file.display().to_string();
            "Resolving @INCLUDE"
        );

        self.directives.push(Directive {
            kind: DirectiveKind::Include,
            token: token.with_source_file(Arc::clone(&full_path)),
        });

        self.depth += 1;
        let result = self.resolve(&included_source, &full_path);
        self.depth -= 1;
        result
    }
}
