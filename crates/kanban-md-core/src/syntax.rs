//! Line predicates shared by the board parser and the detail-file codec.
//!
//! The dialect reuses the `- ` bullet for task titles, property lines and
//! step checkboxes, so each line is classified by indentation and by the
//! reserved property keys below rather than by a grammar.

use crate::task::Step;

/// Property keys recognised under a task.
///
/// Title disambiguation and property parsing both read this list. The
/// generator writes the same keys in its own canonical order
/// (`generator::write_properties`); adding a key means updating both places.
///
/// A bullet like `- due: friday` is always a property, so a task titled
/// `due: friday` can only be written as a `### ` heading.
pub const PROPERTY_KEYS: &[&str] = &[
    "id",
    "due",
    "tags",
    "priority",
    "workload",
    "steps",
    "defaultExpanded",
    "start",
    "milestone",
    "detail",
    "updated",
    "completed",
];

/// Minimum indentation of a step checkbox line.
pub const STEP_INDENT: usize = 6;

/// Indentation of property lines written by the generator.
pub const PROPERTY_PREFIX: &str = "  - ";

/// Indentation of step lines written by the generator.
pub const STEP_PREFIX: &str = "      - ";

/// Indentation of the fenced description block written by the generator.
pub const DESCRIPTION_INDENT: &str = "    ";

pub const FENCE: &str = "```";

pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Split `- key: value` into a reserved key and its trimmed value.
fn reserved_key_value(bullet: &str) -> Option<(&'static str, &str)> {
    let rest = bullet.strip_prefix("- ")?;
    let (key, value) = rest.split_once(':')?;
    let key = PROPERTY_KEYS.iter().copied().find(|k| *k == key)?;
    Some((key, value.trim()))
}

/// An indented `- key: value` line with a reserved key.
pub fn property_line(line: &str) -> Option<(&'static str, &str)> {
    if leading_whitespace(line) == 0 {
        return None;
    }
    reserved_key_value(line.trim_start())
}

/// A bullet whose key is reserved, at any indentation.
///
/// Such a line is never a task title even when it is unindented.
pub fn is_reserved_bullet(trimmed: &str) -> bool {
    reserved_key_value(trimmed).is_some()
}

/// `      - [ ] text` / `      - [x] text` with at least six leading spaces.
pub fn step_line(line: &str) -> Option<Step> {
    if leading_whitespace(line) < STEP_INDENT {
        return None;
    }
    let rest = line.trim_start().strip_prefix("- [")?;
    let mut chars = rest.chars();
    let completed = match chars.next()? {
        ' ' => false,
        'x' => true,
        _ => return None,
    };
    let text = chars.as_str().strip_prefix(']')?;
    Some(Step::new(text.trim(), completed))
}

/// Text after a heading marker such as `##`. A bare marker is a heading with
/// empty text; `###` is not a `##` heading.
pub fn heading_text<'a>(trimmed: &'a str, marker: &str) -> Option<&'a str> {
    let rest = trimmed.strip_prefix(marker)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

/// Opening fence of a description block: bare or tagged `md`.
pub fn is_description_fence(trimmed: &str) -> bool {
    matches!(trimmed.strip_prefix(FENCE), Some("") | Some("md"))
}

pub fn is_fence_close(trimmed: &str) -> bool {
    trimmed == FENCE
}

/// Opening fence of a detail file's description: any indented fence,
/// whatever its language tag.
pub fn is_detail_description_fence(line: &str) -> bool {
    leading_whitespace(line) > 0 && line.trim_start().starts_with(FENCE)
}

/// The `steps:` property line of a detail file, which must be indented.
pub fn is_detail_steps_line(line: &str) -> bool {
    leading_whitespace(line) > 0 && line.trim() == "- steps:"
}

/// Remove up to four leading spaces of description indentation.
pub fn strip_description_indent(line: &str) -> &str {
    let spaces = line
        .bytes()
        .take(DESCRIPTION_INDENT.len())
        .take_while(|b| *b == b' ')
        .count();
    &line[spaces..]
}

/// Remove a `[ ] ` or `[x] ` checkbox prefix from a bullet title.
pub fn strip_title_checkbox(title: &str) -> &str {
    title
        .strip_prefix("[ ] ")
        .or_else(|| title.strip_prefix("[x] "))
        .unwrap_or(title)
}
