//! Token types produced by the lexer.

use std::{fmt, path::Path, sync::Arc};

use serde::Serialize;

use crate::span::{Position, Span};

/// Section kinds that may appear in a block header (`[INPUT]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Service,
    Input,
    Filter,
    Output,
    Parser,
    MultilineParser,
    Custom,
    Plugins,
    Upstream,
    Node,
}

impl Command {
    /// Every command, in declaration order.
    pub const ALL: [Command; 10] = [
        Command::Service,
        Command::Input,
        Command::Filter,
        Command::Output,
        Command::Parser,
        Command::MultilineParser,
        Command::Custom,
        Command::Plugins,
        Command::Upstream,
        Command::Node,
    ];

    /// The keyword as written in a block header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Service => "SERVICE",
            Command::Input => "INPUT",
            Command::Filter => "FILTER",
            Command::Output => "OUTPUT",
            Command::Parser => "PARSER",
            Command::MultilineParser => "MULTILINE_PARSER",
            Command::Custom => "CUSTOM",
            Command::Plugins => "PLUGINS",
            Command::Upstream => "UPSTREAM",
            Command::Node => "NODE",
        }
    }

    /// Match a header word against the command set, ignoring case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(word))
    }

    /// Reserved commands are structurally valid but hidden from the public
    /// schema.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            Command::Service
                | Command::Parser
                | Command::MultilineParser
                | Command::Plugins
                | Command::Upstream
                | Command::Node
        )
    }

    /// Comma separated list of every command keyword, for error messages.
    pub(crate) fn keyword_list() -> String {
        Self::ALL
            .iter()
            .map(Command::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of an `@word` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKeyword {
    /// `@SET NAME=value`
    Set,
    /// `@INCLUDE path`
    Include,
    /// Any other keyword; carries the raw directive text.
    Unrecognized(String),
}

impl DirectiveKeyword {
    /// Keywords accepted by [`DirectiveKeyword::classify`].
    pub const SUPPORTED: [&'static str; 2] = ["SET", "INCLUDE"];

    /// Classify a directive word (without the `@`), ignoring case.
    ///
    /// `raw_text` is kept on the unrecognized variant for diagnostics.
    pub fn classify(word: &str, raw_text: &str) -> Self {
        if word.eq_ignore_ascii_case("SET") {
            DirectiveKeyword::Set
        } else if word.eq_ignore_ascii_case("INCLUDE") {
            DirectiveKeyword::Include
        } else {
            DirectiveKeyword::Unrecognized(raw_text.to_string())
        }
    }
}

/// Token kinds for the Fluent Bit classic grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `[`
    OpenBlock,
    /// `]`
    CloseBlock,
    /// Section keyword inside a block header.
    Command(Command),
    /// `@word rest-of-line`
    Directive(DirectiveKeyword),
    /// `key value`
    Property,
    /// `# ...`
    Comment,
    /// Any whitespace run, line breaks included.
    Whitespace,
}

impl TokenKind {
    /// Short name used in token dumps.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::OpenBlock => "OPEN_BLOCK",
            TokenKind::CloseBlock => "CLOSE_BLOCK",
            TokenKind::Command(_) => "COMMAND",
            TokenKind::Directive(DirectiveKeyword::Set) => "SET",
            TokenKind::Directive(DirectiveKeyword::Include) => "INCLUDE",
            TokenKind::Directive(DirectiveKeyword::Unrecognized(_)) => "DIRECTIVE",
            TokenKind::Property => "PROPERTY",
            TokenKind::Comment => "COMMENT",
            TokenKind::Whitespace => "SPACE",
        }
    }
}

/// A lexed token with its raw text, normalized value and location.
///
/// `offset` and `span` are relative to the token's own source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    value: String,
    position: Position,
    span: Span,
    source_file: Arc<Path>,
}

impl Token {
    pub(crate) fn new(
        kind: TokenKind,
        text: impl Into<String>,
        value: impl Into<String>,
        position: Position,
        span: Span,
        source_file: Arc<Path>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            value: value.into(),
            position,
            span,
            source_file,
        }
    }

    /// Copy of this token attributed to another file.
    pub(crate) fn with_source_file(&self, source_file: Arc<Path>) -> Self {
        Self {
            source_file,
            ..self.clone()
        }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// The text exactly as it appears in the source.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The normalized value (upper-cased commands and directive keywords,
    /// collapsed property separators).
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn col(&self) -> usize {
        self.position.col
    }

    pub fn offset(&self) -> usize {
        self.position.offset
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn source_file(&self) -> &Arc<Path> {
        &self.source_file
    }
}
