//! Public schema projection.
//!
//! The raw structure contains every block, including sections Fluent Bit
//! treats as internal (`[SERVICE]`, `[PARSER]`, ...) and blocks generated by
//! tooling. The schema keeps only user-facing pipeline sections and drops
//! the parse bookkeeping (block id, source file).

use indexmap::IndexMap;
use serde::Serialize;

use crate::{structure::Block, tokens::Command};

/// Name fragments that mark a block as generated by tooling.
pub const INTERNAL_NAME_MARKERS: [&str; 2] = ["fluentbit_metrics", "calyptia"];

/// A public, bookkeeping-free view of a [`Block`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaEntry {
    pub command: Command,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: IndexMap<String, String>,
}

/// Whether `block` belongs in the public schema.
pub fn is_public_block(block: &Block) -> bool {
    let Some(command) = block.command() else {
        return false;
    };
    let internal_name = block.name().is_some_and(|name| {
        INTERNAL_NAME_MARKERS
            .iter()
            .any(|marker| name.contains(marker))
    });

    !command.is_reserved() && !internal_name
}

/// Project the raw structure onto the public schema, preserving order.
pub fn project(blocks: &[Block]) -> Vec<SchemaEntry> {
    blocks
        .iter()
        .filter(|block| is_public_block(block))
        .filter_map(|block| {
            Some(SchemaEntry {
                command: block.command()?,
                name: block.name().map(str::to_string),
                properties: block.properties().clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Arc};

    use super::*;
    use crate::{lexer, structure};

    fn blocks(source: &str) -> Vec<Block> {
        let file: Arc<Path> = Arc::from(Path::new("/schema.conf"));
        let tokens = lexer::tokenize(source, &file).expect("Should tokenize");
        structure::build(&tokens).0
    }

    #[test]
    fn test_reserved_commands_are_dropped() {
        let source = "[SERVICE]\n  Flush 1\n[INPUT]\n  Name cpu\n[PARSER]\n  Name json\n[OUTPUT]\n  Name stdout\n";
        let schema = project(&blocks(source));

        let commands: Vec<_> = schema.iter().map(|entry| entry.command).collect();
        assert_eq!(commands, vec![Command::Input, Command::Output]);
    }

    #[test]
    fn test_internal_names_are_dropped() {
        let source = "[INPUT]\n  Name fluentbit_metrics\n[OUTPUT]\n  Name calyptia\n[OUTPUT]\n  Name stdout\n";
        let schema = project(&blocks(source));

        assert_eq!(schema.len(), 1);
        assert_eq!(schema[0].name.as_deref(), Some("stdout"));
    }

    #[test]
    fn test_commandless_block_is_dropped() {
        assert!(project(&blocks("# nothing\n")).is_empty());
    }

    #[test]
    fn test_custom_is_public() {
        let schema = project(&blocks("[CUSTOM]\n  Name calico\n"));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema[0].command, Command::Custom);
    }

    #[test]
    fn test_entry_carries_name_and_properties() {
        let schema = project(&blocks("[INPUT]\n  Name tail\n  Tag t.01\n"));
        let entry = &schema[0];

        assert_eq!(entry.name.as_deref(), Some("tail"));
        assert_eq!(
            entry.properties.get("tag").map(String::as_str),
            Some("t.01")
        );
    }
}
