//! Format detection.

use crate::lexer::is_space;

/// Returns `true` when `text` looks like a Fluent Bit classic configuration.
///
/// The text qualifies if any line contains an upper-case block header such as
/// `[INPUT]` that is not commented out, or if any line starts with an
/// `@INCLUDE` directive (in any letter case). Collaborators use this to tell
/// this grammar apart from other formats (Fluentd `<source>` blocks, YAML)
/// before attempting a parse.
pub fn looks_like_fluent_bit(text: &str) -> bool {
    text.lines()
        .any(|line| has_block_header(line) || is_include_line(line))
}

fn has_block_header(line: &str) -> bool {
    let mut search_from = 0;
    while let Some(found) = line[search_from..].find('[') {
        let open = search_from + found;
        let after = &line[open + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_uppercase() || c == '_'))
            .unwrap_or(after.len());

        let is_header = name_len > 0
            && after[name_len..].starts_with(']')
            && after.starts_with(|c: char| c.is_ascii_uppercase())
            && !line[..open].trim_end_matches(' ').ends_with('#');
        if is_header {
            return true;
        }
        search_from = open + 1;
    }
    false
}

fn is_include_line(line: &str) -> bool {
    let Some(rest) = line.trim_start_matches(is_space).strip_prefix('@') else {
        return false;
    };
    let keyword_len = "include".len();
    rest.get(..keyword_len)
        .is_some_and(|keyword| keyword.eq_ignore_ascii_case("include"))
        && rest[keyword_len..].starts_with(char::is_whitespace)
}
