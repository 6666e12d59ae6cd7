//! Structure builder.
//!
//! Reduces the flattened, include-expanded token stream into an ordered
//! sequence of [`Block`]s. The builder is a two-state machine:
//!
//! - **awaiting-command**: after a block-open token, until a command is seen
//! - **collecting-properties**: after a command, until the next block-open
//!
//! A block is sealed (appended to the output) when the next block-open token
//! arrives while collecting. The last in-progress block is always appended
//! at the end of the stream, even when it has no command; the schema
//! projection drops such blocks.

use std::{fmt, path::Path, sync::Arc};

use indexmap::IndexMap;
use log::trace;

use crate::{
    token_index::TokenIndex,
    tokens::{Command, Token, TokenKind},
};

/// Identifier of a block, unique within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// One bracketed section with its accumulated properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    command: Option<Command>,
    name: Option<String>,
    properties: IndexMap<String, String>,
    source_file: Option<Arc<Path>>,
}

impl Block {
    fn new(id: BlockId) -> Self {
        Self {
            id,
            command: None,
            name: None,
            properties: IndexMap::new(),
            source_file: None,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    /// The block's command; `None` only for an incomplete trailing block.
    pub fn command(&self) -> Option<Command> {
        self.command
    }

    /// Value of the block's `Name` property.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Properties other than `name`, keyed by lower-cased key, in first
    /// insertion order.
    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Shorthand for a single property lookup.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// File the block's command was read from.
    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }
}

/// Lower-case a property key and apply key aliases.
fn normalize_key(key: &str) -> String {
    let key = key.to_lowercase();
    if key == "match_regex" {
        "match".to_string()
    } else {
        key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    AwaitingCommand,
    CollectingProperties,
}

struct StructureBuilder {
    state: BuildState,
    next_id: u32,
    current: Block,
    blocks: Vec<Block>,
    index: TokenIndex,
}

impl StructureBuilder {
    fn new() -> Self {
        Self {
            state: BuildState::AwaitingCommand,
            next_id: 1,
            current: Block::new(BlockId(0)),
            blocks: Vec::new(),
            index: TokenIndex::new(),
        }
    }

    fn fresh_block(&mut self) -> Block {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        Block::new(id)
    }

    fn feed(&mut self, token_idx: usize, token: &Token) {
        match token.kind() {
            TokenKind::Whitespace => {}
            TokenKind::OpenBlock => {
                let next = self.fresh_block();
                let previous = std::mem::replace(&mut self.current, next);
                if self.state == BuildState::CollectingProperties {
                    self.blocks.push(previous);
                }
                self.index.insert(self.current.id, token_idx);
                self.state = BuildState::AwaitingCommand;
            }
            TokenKind::Command(command) => {
                self.current.command = Some(*command);
                self.current.source_file = Some(Arc::clone(token.source_file()));
                self.current.properties.clear();
                self.index.insert(self.current.id, token_idx);
                self.state = BuildState::CollectingProperties;
            }
            _ if self.state == BuildState::CollectingProperties => {
                if *token.kind() == TokenKind::Property {
                    self.apply_property(token.value());
                }
                self.index.insert(self.current.id, token_idx);
            }
            _ => {}
        }
    }

    fn apply_property(&mut self, value: &str) {
        let (key, value) = value
            .split_once(char::is_whitespace)
            .unwrap_or((value, ""));
        let key = normalize_key(key);

        if key == "name" {
            self.current.name = Some(value.to_string());
        } else {
            self.current.properties.insert(key, value.to_string());
        }
    }

    fn finish(mut self) -> (Vec<Block>, TokenIndex) {
        self.blocks.push(self.current);
        trace!(blocks = self.blocks.len(); "Built structure");
        (self.blocks, self.index)
    }
}

/// Reduce a flattened token stream into blocks, recording each block's
/// contributing tokens in a fresh [`TokenIndex`].
pub(crate) fn build(tokens: &[Token]) -> (Vec<Block>, TokenIndex) {
    let mut builder = StructureBuilder::new();
    for (token_idx, token) in tokens.iter().enumerate() {
        builder.feed(token_idx, token);
    }
    builder.finish()
}
