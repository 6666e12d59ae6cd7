//! Lexical analyzer for Fluent Bit classic configuration text.
//!
//! The lexer converts one file's source into a stream of [`Token`]s. It is a
//! two-state machine:
//!
//! - **top-level**: block-open `[`, `@word` directive lines, `key value`
//!   property lines, `#` comments and whitespace runs.
//! - **block-header**: the command keyword, inline whitespace, comments and
//!   the closing `]` that returns to top-level.
//!
//! Lexing fails fast: the first input that matches no form of the current
//! state is reported as a [`ParseError`].

use std::{path::Path, sync::Arc};

use log::trace;
use winnow::{
    Parser as _,
    combinator::alt,
    error::{ContextError, ModalResult},
    stream::{LocatingSlice, Location},
    token::{one_of, take_till, take_while},
};

use crate::{
    error::{ErrorCode, ParseError, Result},
    span::{LineIndex, Span},
    tokens::{Command, DirectiveKeyword, Token, TokenKind},
};

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    TopLevel,
    BlockHeader,
}

/// Shape recognized by a single state parser, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme<'a> {
    OpenBlock,
    CloseBlock,
    Word(&'a str),
    Directive { keyword: &'a str, rest: &'a str },
    Property { key: &'a str, rest: &'a str },
    Comment,
    Whitespace,
}

/// Whitespace, including the byte order mark some editors write at the
/// start of a file.
pub(crate) fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_key_char(c: char) -> bool {
    is_word_char(c) || matches!(c, '-' | '.' | '*')
}

/// Everything up to (not including) the line break.
fn rest_of_line<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_till(0.., ['\r', '\n']).parse_next(input)
}

fn open_block<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    '['.value(Lexeme::OpenBlock).parse_next(input)
}

fn close_block<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    ']'.value(Lexeme::CloseBlock).parse_next(input)
}

/// `@word rest-of-line`
fn directive<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    ('@', take_while(1.., is_word_char), rest_of_line)
        .map(|(_, keyword, rest)| Lexeme::Directive { keyword, rest })
        .parse_next(input)
}

/// `key<inline whitespace>rest-of-line`
///
/// Keys start with a word character and may contain `-`, `.` and `*`
/// (`tls.verify`, `storage.total_limit_size`).
fn property<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    (
        (one_of(is_word_char), take_while(0.., is_key_char)).take(),
        take_while(1.., [' ', '\t']),
        rest_of_line,
    )
        .map(|(key, _, rest)| Lexeme::Property { key, rest })
        .parse_next(input)
}

fn comment<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    ('#', rest_of_line).value(Lexeme::Comment).parse_next(input)
}

fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    take_while(1.., is_space)
        .value(Lexeme::Whitespace)
        .parse_next(input)
}

fn inline_whitespace<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    take_while(1.., [' ', '\t'])
        .value(Lexeme::Whitespace)
        .parse_next(input)
}

fn word<'a>(input: &mut Input<'a>) -> IResult<Lexeme<'a>> {
    take_while(1.., is_word_char)
        .map(Lexeme::Word)
        .parse_next(input)
}

fn top_level_lexeme<'a>(input: &mut Input<'a>) -> IResult<(Lexeme<'a>, &'a str)> {
    alt((open_block, directive, property, comment, whitespace))
        .with_taken()
        .parse_next(input)
}

fn block_header_lexeme<'a>(input: &mut Input<'a>) -> IResult<(Lexeme<'a>, &'a str)> {
    alt((word, close_block, comment, inline_whitespace))
        .with_taken()
        .parse_next(input)
}

/// Normalized `@KEYWORD rest` form of a directive.
fn directive_value(keyword: &str, rest: &str) -> String {
    let keyword = keyword.to_ascii_uppercase();
    match rest.trim() {
        "" => format!("@{keyword}"),
        rest => format!("@{keyword} {rest}"),
    }
}

/// Normalized `key value` form of a property, with the separator collapsed
/// to a single space and the value trimmed.
fn property_value(key: &str, rest: &str) -> String {
    match rest.trim() {
        "" => key.to_string(),
        rest => format!("{key} {rest}"),
    }
}

/// Lexer state for one file.
struct Lexer<'a> {
    source: &'a str,
    file: Arc<Path>,
    lines: LineIndex<'a>,
    state: LexState,
    /// Start of the block header currently open, for unterminated headers.
    header_start: Option<usize>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, file: Arc<Path>) -> Self {
        Self {
            source,
            file,
            lines: LineIndex::new(source),
            state: LexState::TopLevel,
            header_start: None,
            tokens: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut input = LocatingSlice::new(self.source);

        while !input.is_empty() {
            let start = input.current_token_start();
            let parsed = match self.state {
                LexState::TopLevel => top_level_lexeme(&mut input),
                LexState::BlockHeader => block_header_lexeme(&mut input),
            };
            let Ok((lexeme, text)) = parsed else {
                return Err(self.invalid_syntax(start));
            };
            let end = input.current_token_start();
            self.push(lexeme, text, Span::new(start..end))?;
        }

        if let Some(start) = self.header_start {
            return Err(self.unclosed_header(start));
        }

        trace!(
            file = self.file.display().to_string(),
            count = self.tokens.len();
            "Tokenized file"
        );

        Ok(self.tokens)
    }

    fn push(&mut self, lexeme: Lexeme<'a>, text: &'a str, span: Span) -> Result<()> {
        let position = self.lines.position(span.start());

        let (kind, value) = match lexeme {
            Lexeme::OpenBlock => {
                self.state = LexState::BlockHeader;
                self.header_start = Some(span.start());
                (TokenKind::OpenBlock, text.to_string())
            }
            Lexeme::CloseBlock => {
                self.state = LexState::TopLevel;
                self.header_start = None;
                (TokenKind::CloseBlock, text.to_string())
            }
            Lexeme::Word(word) => {
                let Some(command) = Command::from_keyword(word) else {
                    return Err(ParseError::at(
                        ErrorCode::E003,
                        format!(
                            "Command is not valid, we got {word}, it should be {}",
                            Command::keyword_list()
                        ),
                        &self.file,
                        position,
                        span,
                    ));
                };
                (TokenKind::Command(command), command.as_str().to_string())
            }
            Lexeme::Directive { keyword, rest } => (
                TokenKind::Directive(DirectiveKeyword::classify(keyword, text)),
                directive_value(keyword, rest),
            ),
            Lexeme::Property { key, rest } => (TokenKind::Property, property_value(key, rest)),
            Lexeme::Comment => (TokenKind::Comment, text.to_string()),
            Lexeme::Whitespace => (TokenKind::Whitespace, text.to_string()),
        };

        self.tokens.push(Token::new(
            kind,
            text,
            value,
            position,
            span,
            Arc::clone(&self.file),
        ));
        Ok(())
    }

    fn invalid_syntax(&self, start: usize) -> ParseError {
        let line_rest = &self.source[start..];
        let snippet = line_rest
            .split(['\r', '\n'])
            .next()
            .unwrap_or_default()
            .trim_end();

        if self.state == LexState::BlockHeader && snippet.is_empty() {
            return self.unclosed_header(self.header_start.unwrap_or(start));
        }

        let len = line_rest.chars().next().map_or(0, char::len_utf8);
        let span = Span::new(start..start + len);
        ParseError::at(
            ErrorCode::E002,
            format!("Invalid syntax ({snippet})"),
            &self.file,
            self.lines.position(start),
            span,
        )
        .with_help(match self.state {
            LexState::TopLevel => {
                "expected a block header `[NAME]`, a `key value` property, an `@SET`/`@INCLUDE` directive or a `#` comment"
            }
            LexState::BlockHeader => "block headers contain a single command, e.g. `[INPUT]`",
        })
    }

    fn unclosed_header(&self, start: usize) -> ParseError {
        ParseError::at(
            ErrorCode::E002,
            "Block header is not closed",
            &self.file,
            self.lines.position(start),
            Span::new(start..start + 1),
        )
        .with_help("add a closing `]` on the same line")
    }
}

/// Tokenize one file's source text.
///
/// Token offsets, lines and columns are relative to `source`; every token is
/// tagged with `file`.
///
/// # Errors
///
/// - `E002` when input matches no grammar form, or a block header is left open
/// - `E003` when a block header names an unknown command
pub(crate) fn tokenize(source: &str, file: &Arc<Path>) -> Result<Vec<Token>> {
    Lexer::new(source, Arc::clone(file)).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_file() -> Arc<Path> {
        Arc::from(Path::new("/test/fluent-bit.conf"))
    }

    fn lex(source: &str) -> Vec<Token> {
        tokenize(source, &test_file()).expect("Should tokenize")
    }

    fn lex_err(source: &str) -> ParseError {
        tokenize(source, &test_file()).expect_err("Should fail to tokenize")
    }

    /// Tokens without whitespace, as `(kind, value)` pairs.
    fn significant(source: &str) -> Vec<(TokenKind, String)> {
        lex(source)
            .into_iter()
            .filter(|t| *t.kind() != TokenKind::Whitespace)
            .map(|t| (t.kind().clone(), t.value().to_string()))
            .collect()
    }

    #[test]
    fn test_block_header() {
        assert_eq!(
            significant("[INPUT]"),
            vec![
                (TokenKind::OpenBlock, "[".to_string()),
                (TokenKind::Command(Command::Input), "INPUT".to_string()),
                (TokenKind::CloseBlock, "]".to_string()),
            ]
        );
    }

    #[test]
    fn test_block_header_case_insensitive_command() {
        let tokens = significant("[output]");
        assert_eq!(
            tokens[1],
            (TokenKind::Command(Command::Output), "OUTPUT".to_string())
        );
    }

    #[test]
    fn test_block_header_inner_whitespace() {
        let tokens = significant("[ FILTER ]");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].0, TokenKind::Command(Command::Filter));
    }

    #[test]
    fn test_property_value_normalization() {
        let tokens = lex("    Name        tail # some comment  \n");
        let property = tokens
            .iter()
            .find(|t| *t.kind() == TokenKind::Property)
            .expect("property token");

        assert_eq!(property.text(), "Name        tail # some comment  ");
        assert_eq!(property.value(), "Name tail # some comment");
        assert_eq!(property.line(), 1);
        assert_eq!(property.col(), 5);
        assert_eq!(property.offset(), 4);
    }

    #[test]
    fn test_property_dotted_key() {
        let tokens = significant("TLS.Verify  Off");
        assert_eq!(
            tokens,
            vec![(TokenKind::Property, "TLS.Verify Off".to_string())]
        );
    }

    #[test]
    fn test_property_keeps_inner_value_whitespace() {
        let tokens = significant("Regex  ^(?<a>[^ ]*) (?<b>.*)$");
        assert_eq!(tokens[0].1, "Regex ^(?<a>[^ ]*) (?<b>.*)$");
    }

    #[test]
    fn test_property_with_empty_value() {
        let tokens = significant("Key   \n");
        assert_eq!(tokens, vec![(TokenKind::Property, "Key".to_string())]);
    }

    #[test]
    fn test_directive_set() {
        let tokens = lex("@set A=some configuration here");
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            *tokens[0].kind(),
            TokenKind::Directive(DirectiveKeyword::Set)
        );
        assert_eq!(tokens[0].text(), "@set A=some configuration here");
        assert_eq!(tokens[0].value(), "@SET A=some configuration here");
    }

    #[test]
    fn test_directive_include_mixed_case() {
        let tokens = lex("@InClUdE nested/service.conf");
        assert_eq!(
            *tokens[0].kind(),
            TokenKind::Directive(DirectiveKeyword::Include)
        );
        assert_eq!(tokens[0].value(), "@INCLUDE nested/service.conf");
    }

    #[test]
    fn test_directive_unrecognized_keeps_raw_text() {
        let tokens = lex("    @WHATEVER something invalid. \n");
        let directive = &tokens[1];

        assert_eq!(
            *directive.kind(),
            TokenKind::Directive(DirectiveKeyword::Unrecognized(
                "@WHATEVER something invalid. ".to_string()
            ))
        );
        assert_eq!(directive.line(), 1);
        assert_eq!(directive.col(), 5);
    }

    #[test]
    fn test_comments_are_tokens() {
        let tokens = significant("# comment\n[INPUT] # trailing\n");
        assert_eq!(tokens[0].0, TokenKind::Comment);
        assert_eq!(tokens.last().map(|t| &t.0), Some(&TokenKind::Comment));
    }

    #[test]
    fn test_positions_across_lines() {
        let source = "[INPUT]\n    Name tail\n\n[OUTPUT]\n    Match *\n";
        let tokens: Vec<_> = lex(source)
            .into_iter()
            .filter(|t| *t.kind() != TokenKind::Whitespace)
            .collect();

        let output = tokens
            .iter()
            .find(|t| *t.kind() == TokenKind::Command(Command::Output))
            .unwrap();
        assert_eq!(output.line(), 4);
        assert_eq!(output.col(), 2);
        assert_eq!(output.offset(), source.find("OUTPUT").unwrap());

        let matcher = tokens.last().unwrap();
        assert_eq!(matcher.value(), "Match *");
        assert_eq!(matcher.line(), 5);
        assert_eq!(matcher.col(), 5);
    }

    #[test]
    fn test_spans_cover_source() {
        let source = "[INPUT]\n  Name dummy\n# c\n@SET x=1\n";
        let tokens = lex(source);

        let mut expected_start = 0;
        for token in &tokens {
            assert_eq!(token.span().start(), expected_start);
            assert_eq!(&source[token.span().start()..token.span().end()], token.text());
            expected_start = token.span().end();
        }
        assert_eq!(expected_start, source.len());
    }

    #[test]
    fn test_crlf_line_endings() {
        let tokens = significant("[INPUT]\r\n    Name tail\r\n");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[3], (TokenKind::Property, "Name tail".to_string()));
    }

    #[test]
    fn test_byte_order_mark_is_whitespace() {
        let tokens = lex("\u{FEFF}[INPUT]\n    Name tail\n");

        assert_eq!(*tokens[0].kind(), TokenKind::Whitespace);
        assert_eq!(tokens[0].text(), "\u{FEFF}");
        assert_eq!(*tokens[1].kind(), TokenKind::OpenBlock);
        assert_eq!((tokens[1].line(), tokens[1].col()), (1, 2));
        assert_eq!(tokens[1].offset(), 3);
    }

    #[test]
    fn test_invalid_command() {
        let err = lex_err("\n[INVALID]\n");
        assert_eq!(err.code(), ErrorCode::E003);
        assert_eq!(err.line(), 2);
        assert_eq!(err.col(), 2);
        assert_eq!(
            err.message(),
            "Command is not valid, we got INVALID, it should be SERVICE,INPUT,FILTER,OUTPUT,PARSER,MULTILINE_PARSER,CUSTOM,PLUGINS,UPSTREAM,NODE"
        );
    }

    #[test]
    fn test_unclosed_block_header() {
        let err = lex_err("[INPUT\n  Name tail\n");
        assert_eq!(err.code(), ErrorCode::E002);
        assert_eq!(err.message(), "Block header is not closed");
        assert_eq!((err.line(), err.col()), (1, 1));

        let err = lex_err("  [INPUT");
        assert_eq!(err.message(), "Block header is not closed");
        assert_eq!((err.line(), err.col()), (1, 3));
    }

    #[test]
    fn test_invalid_syntax_bare_word() {
        let err = lex_err("[INPUT]\n    Name tail\n    orphan\n");
        assert_eq!(err.code(), ErrorCode::E002);
        assert_eq!(err.message(), "Invalid syntax (orphan)");
        assert_eq!((err.line(), err.col()), (3, 5));
        assert!(err.help().is_some());
    }

    #[test]
    fn test_invalid_syntax_in_header() {
        let err = lex_err("[INPUT=1]");
        assert_eq!(err.code(), ErrorCode::E002);
        assert_eq!((err.line(), err.col()), (1, 7));
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Strategy for property keys.
    fn key_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z_][A-Za-z0-9_.-]{0,15}"
    }

    /// Strategy for property values without line breaks.
    fn value_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_./*${}:=-][A-Za-z0-9_./*${}:= -]{0,30}"
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every property line lexes to a single property token whose value is
    /// the key and the trimmed value joined by one space.
    fn check_property_line(
        key: &str,
        value: &str,
        indent: usize,
    ) -> std::result::Result<(), TestCaseError> {
        let source = format!("{}{key}   {value}\n", " ".repeat(indent));
        let file: Arc<Path> = Arc::from(Path::new("/p.conf"));
        let tokens = tokenize(&source, &file).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let properties: Vec<_> = tokens
            .iter()
            .filter(|t| *t.kind() == TokenKind::Property)
            .collect();
        prop_assert_eq!(properties.len(), 1);
        prop_assert_eq!(properties[0].value(), property_value(key, value));
        prop_assert_eq!(properties[0].col(), indent + 1);
        prop_assert_eq!(properties[0].offset(), indent);
        Ok(())
    }

    /// Tokens always tile the source exactly.
    fn check_tokens_tile_source(
        lines: &[(String, String)],
    ) -> std::result::Result<(), TestCaseError> {
        let mut source = String::from("[INPUT]\n");
        for (key, value) in lines {
            source.push_str(&format!("    {key} {value}\n"));
        }
        let file: Arc<Path> = Arc::from(Path::new("/p.conf"));
        let tokens = tokenize(&source, &file).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let rebuilt: String = tokens.iter().map(Token::text).collect();
        prop_assert_eq!(rebuilt, source);
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn property_lines_normalize(key in key_strategy(), value in value_strategy(), indent in 0usize..8) {
            check_property_line(&key, &value, indent)?;
        }

        #[test]
        fn tokens_tile_source(lines in prop::collection::vec((key_strategy(), value_strategy()), 0..10)) {
            check_tokens_tile_source(&lines)?;
        }
    }
}
