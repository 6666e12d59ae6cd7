//! Rendering the public schema back to configuration text.
//!
//! Output layout:
//!
//! ```text
//! @SET A=B
//!
//! [INPUT]
//!     name tail
//!     tag  tail.01
//!
//! [OUTPUT]
//!     name  stdout
//!     match *
//! ```
//!
//! `@INCLUDE` directives are not rendered; the included blocks are already
//! part of the schema.

use std::fmt::Write as _;

use serde::Deserialize;

use crate::{
    resolver::{Directive, DirectiveKind},
    schema::SchemaEntry,
};

/// Layout options for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Spaces before each property line.
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

/// Render `@SET` directives followed by every schema entry.
pub fn render(schema: &[SchemaEntry], directives: &[Directive], options: &RenderOptions) -> String {
    let mut out = String::new();

    let sets: Vec<_> = directives
        .iter()
        .filter(|directive| directive.kind() == DirectiveKind::Set)
        .collect();
    for directive in &sets {
        out.push_str(directive.value());
        out.push('\n');
    }
    if !sets.is_empty() && !schema.is_empty() {
        out.push('\n');
    }

    let indent = " ".repeat(options.indent);
    for (i, entry) in schema.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_entry(&mut out, entry, &indent);
    }

    out
}

fn render_entry(out: &mut String, entry: &SchemaEntry, indent: &str) {
    let lines: Vec<(&str, &str)> = entry
        .name
        .as_deref()
        .map(|name| ("name", name))
        .into_iter()
        .chain(
            entry
                .properties
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
        .collect();
    let width = lines.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    // Writing to a String cannot fail.
    let _ = writeln!(out, "[{}]", entry.command);
    for (key, value) in lines {
        // An empty value keeps its separator so the line still lexes as a
        // property.
        let _ = writeln!(out, "{indent}{key:<width$} {value}");
    }
}
