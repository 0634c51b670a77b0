//! Type-name normalization and top-level splitting helpers.
//!
//! Nothing here resolves names. `normalize_type_name` deliberately reduces a
//! reference to a single token so hierarchy lookups can compare plain strings.

use crate::types::Parameter;

/// Reduce a referenced type to a bare name.
///
/// Generic arguments and array markers are dropped and only the first
/// dot-separated segment is kept:
/// `List<String>` becomes `List`, `java.util.List[]` becomes `java`.
pub fn normalize_type_name(raw: &str) -> String {
    let without_generics = match raw.find('<') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let cleaned = without_generics.replace("[]", "").replace("...", "");
    let cleaned = cleaned.trim();
    cleaned
        .split('.')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Collapse runs of whitespace inside raw type text
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split on `separator` only where `<>`, `()` and `[]` are balanced.
///
/// Empty pieces are dropped, remaining pieces are trimmed.
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (offset, ch) in text.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            c if c == separator && depth <= 0 => {
                pieces.push(&text[start..offset]);
                start = offset + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Split a comma separated list of type references and normalize each one
pub fn normalize_type_list(list: &str) -> Vec<String> {
    split_top_level(list, ',')
        .into_iter()
        .map(normalize_type_name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Parse the text between a method's parentheses into parameters.
///
/// Annotations and `final` are dropped; C-style array suffixes on the name
/// (`int values[]`) move onto the type. A piece with a single token is kept
/// as a nameless parameter so the count still matches the source.
pub fn parse_parameters(params: &str) -> Vec<Parameter> {
    split_top_level(params, ',')
        .into_iter()
        .map(parse_parameter)
        .collect()
}

fn parse_parameter(piece: &str) -> Parameter {
    let stripped = strip_annotations(piece);
    let tokens: Vec<&str> = stripped
        .split_whitespace()
        .filter(|token| *token != "final")
        .collect();
    let joined = tokens.join(" ");

    // The name is the last whitespace separated token at bracket depth 0.
    let split_at = last_top_level_space(&joined);
    let (mut param_type, mut name) = match split_at {
        Some(pos) => (joined[..pos].trim().to_string(), joined[pos + 1..].to_string()),
        None => (joined.clone(), String::new()),
    };

    while name.ends_with("[]") {
        name.truncate(name.len() - 2);
        param_type.push_str("[]");
    }

    Parameter { name, param_type }
}

fn last_top_level_space(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut last = None;
    for (offset, ch) in text.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ' ' if depth <= 0 => last = Some(offset),
            _ => {}
        }
    }
    last
}

fn strip_annotations(piece: &str) -> &str {
    let mut rest = piece.trim_start();
    while let Some(after_at) = rest.strip_prefix('@') {
        let name_len = after_at
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '$'))
            .unwrap_or(after_at.len());
        let mut remainder = after_at[name_len..].trim_start();
        if remainder.starts_with('(') {
            remainder = skip_balanced(remainder, '(', ')');
        }
        rest = remainder.trim_start();
    }
    rest
}

/// Skip a balanced group starting at the first character of `text`
pub fn skip_balanced(text: &str, open: char, close: char) -> &str {
    let mut depth = 0i32;
    for (offset, ch) in text.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return &text[offset + ch.len_utf8()..];
            }
        }
    }
    ""
}
