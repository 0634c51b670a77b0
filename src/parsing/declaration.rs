//! Pattern-driven declaration parser.
//!
//! Extracts the shape of the first top-level type declared in a Java source
//! file: kind, supertype, interfaces, fields and methods with line ranges.
//! This is not a grammar. Known limits:
//! - only the first type header is used; members of nested and anonymous
//!   types are attributed to it
//! - comments and string literals are scanned like code, so commented-out
//!   members can show up
//! - method end lines come from brace counting and fall back to
//!   `line_start + 10` when the braces do not balance

use super::lines::{LineIndex, resolve_line_end};
use super::normalize::{
    collapse_whitespace, normalize_type_list, normalize_type_name, parse_parameters, skip_balanced,
};
use super::patterns::{
    FIELD, HEADER_CLAUSE, METHOD, MODIFIER_KEYWORDS, NON_TYPE_KEYWORDS, PACKAGE, TYPE_HEADER,
};
use super::DeclarationParser;
use crate::types::{
    ClassDeclaration, ClassKind, FieldDeclaration, MethodDeclaration, Modifier, ParsedDeclaration,
};

/// Regex based implementation of [`DeclarationParser`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternParser;

impl PatternParser {
    pub fn new() -> Self {
        Self
    }
}

impl DeclarationParser for PatternParser {
    fn parse(&self, text: &str, path: &str) -> Option<ParsedDeclaration> {
        parse_declaration(text, path)
    }
}

/// Header of the primary type
#[derive(Debug, PartialEq, Eq)]
struct TypeHeader {
    kind: ClassKind,
    name: String,
    super_type: Option<String>,
    interfaces: Vec<String>,
}

/// Parse one source file.
///
/// Returns `None` when no type header is found (for example a
/// `package-info.java`). Never fails on malformed input.
pub fn parse_declaration(text: &str, path: &str) -> Option<ParsedDeclaration> {
    let header = find_type_header(text)?;
    let lines = LineIndex::new(text);

    let package_name = PACKAGE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let declaration = ClassDeclaration {
        kind: header.kind,
        super_type: header.super_type,
        interfaces: header.interfaces,
        fields: extract_fields(text, &lines),
        methods: extract_methods(text, &lines, &header.name),
        source_path: path.to_string(),
    };

    Some(ParsedDeclaration {
        package_name,
        simple_name: header.name,
        declaration,
    })
}

fn find_type_header(text: &str) -> Option<TypeHeader> {
    for caps in TYPE_HEADER.captures_iter(text) {
        let (Some(keyword), Some(name)) = (caps.get(2), caps.get(3)) else {
            continue;
        };

        let rest = &text[name.end()..];
        let Some(brace) = rest.find('{') else {
            continue;
        };
        let tail = &rest[..brace];
        // A real header tail holds only generics and supertype clauses.
        if tail.contains([';', '}', '(', ')', '=']) {
            continue;
        }

        let kind = match keyword.as_str() {
            "interface" => ClassKind::Interface,
            "enum" => ClassKind::Enum,
            _ => ClassKind::Class,
        };
        let (extends, implements) = split_header_clauses(tail);

        let (super_type, interfaces) = match kind {
            // An interface's `extends` list names interfaces, not a superclass.
            ClassKind::Interface => (None, extends.map(normalize_type_list).unwrap_or_default()),
            _ => (
                extends
                    .map(normalize_type_name)
                    .filter(|name| !name.is_empty()),
                implements.map(normalize_type_list).unwrap_or_default(),
            ),
        };

        return Some(TypeHeader {
            kind,
            name: name.as_str().to_string(),
            super_type,
            interfaces,
        });
    }
    None
}

/// Split a header tail into its `extends` and `implements` clause bodies
fn split_header_clauses(tail: &str) -> (Option<&str>, Option<&str>) {
    let mut rest = tail.trim_start();
    if rest.starts_with('<') {
        rest = skip_balanced(rest, '<', '>');
    }

    // Clause keywords only count outside of generic argument lists.
    let mut clauses: Vec<(&str, usize, usize)> = Vec::new();
    for m in HEADER_CLAUSE.find_iter(rest) {
        if angle_depth(&rest[..m.start()]) == 0 {
            clauses.push((m.as_str(), m.start(), m.end()));
        }
    }

    let mut extends = None;
    let mut implements = None;
    for (i, (keyword, _, body_start)) in clauses.iter().enumerate() {
        let body_end = clauses.get(i + 1).map(|c| c.1).unwrap_or(rest.len());
        let body = rest[*body_start..body_end].trim();
        match *keyword {
            "extends" => extends = Some(body),
            "implements" => implements = Some(body),
            _ => {}
        }
    }
    (extends, implements)
}

fn angle_depth(text: &str) -> i32 {
    text.chars().fold(0, |depth, ch| match ch {
        '<' => depth + 1,
        '>' => depth - 1,
        _ => depth,
    })
}

fn extract_fields(text: &str, lines: &LineIndex) -> Vec<FieldDeclaration> {
    let mut fields = Vec::new();

    for caps in FIELD.captures_iter(text) {
        let (Some(modifiers), Some(field_type), Some(name)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };

        // Method signatures can look like fields; their line carries a
        // parameter list.
        let line = lines.line_text(text, lines.line_of(name.start()));
        if line.contains('(') && line.contains(')') {
            continue;
        }

        fields.push(FieldDeclaration {
            name: name.as_str().to_string(),
            declared_type: collapse_whitespace(field_type.as_str()),
            modifiers: Modifier::collect_from(modifiers.as_str()),
        });
    }

    fields
}

fn extract_methods(text: &str, lines: &LineIndex, class_name: &str) -> Vec<MethodDeclaration> {
    let mut methods = Vec::new();

    for caps in METHOD.captures_iter(text) {
        let (Some(modifiers), Some(return_type), Some(name), Some(params), Some(terminator)) = (
            caps.get(2),
            caps.get(3),
            caps.get(4),
            caps.get(5),
            caps.get(6),
        ) else {
            continue;
        };

        let return_type_text = return_type.as_str();
        if NON_TYPE_KEYWORDS.contains(&return_type_text) {
            continue;
        }
        // Constructor: a modifier landed in return-type position, or the
        // name repeats the class name.
        if MODIFIER_KEYWORDS.contains(&return_type_text) || name.as_str() == class_name {
            continue;
        }

        let line_start = lines.line_of(modifiers.start());
        let line_end = if terminator.as_str() == "{" {
            resolve_line_end(text, lines, terminator.start(), line_start)
        } else {
            lines.line_of(terminator.start())
        };

        methods.push(MethodDeclaration {
            name: name.as_str().to_string(),
            return_type: collapse_whitespace(return_type_text),
            parameters: parse_parameters(params.as_str()),
            modifiers: Modifier::collect_from(modifiers.as_str()),
            line_start,
            line_end,
        });
    }

    methods
}
