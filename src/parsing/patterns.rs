//! Compiled declaration patterns.
//!
//! The patterns are line anchored (`(?m)^`) and intentionally loose. They do
//! not know about comments or string literals.

use regex::Regex;
use std::sync::LazyLock;

/// `package a.b.c;`
pub static PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").expect("package pattern is valid")
});

/// Start of a type header: modifiers, keyword and name.
///
/// The remainder of the header (generic parameters, `extends`,
/// `implements`) is scanned by hand up to the opening brace.
pub static TYPE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|protected|private|abstract|final|static|sealed|non-sealed|strictfp)\s+)*)(class|interface|enum)\s+([\w$]+)",
    )
    .expect("type header pattern is valid")
});

/// `extends` / `implements` / `permits` clause keywords inside a header tail
pub static HEADER_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(extends|implements|permits)\b").expect("header clause pattern is valid")
});

/// `<visibility> [static] [final] [volatile] [transient] <Type> <name> (=|;)`
///
/// Groups: 1 modifiers, 2 type, 3 name.
pub static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:public|protected|private)\s+(?:(?:static|final|volatile|transient)\s+)*)([\w$.]+(?:\s*<[^;=(){}]*>)?(?:\s*\[\s*\])*)\s+([\w$]+)\s*(?:=|;)",
    )
    .expect("field pattern is valid")
});

/// `[annotations] [modifiers] [<T>] <ReturnType> <name>(<params>) [throws ...] ({|;)`
///
/// Groups: 1 annotations, 2 modifiers, 3 return type, 4 name, 5 parameters,
/// 6 terminator.
pub static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:@[\w$.]+(?:\([^)]*\))?\s+)*)((?:(?:public|protected|private|static|final|abstract|synchronized|native|default|strictfp)\s+)*)(?:<[^(){};=]*>\s+)?([\w$.]+(?:\s*<[^(){};=]*>)?(?:\s*\[\s*\])*)\s+([\w$]+)\s*\(([^)]*)\)(?:\s*\[\s*\])*\s*(?:throws\s+[\w$.,\s<>]+?)?\s*([{;])",
    )
    .expect("method pattern is valid")
});

/// Tokens that look like a return type but start a statement instead
pub const NON_TYPE_KEYWORDS: &[&str] = &[
    "class", "if", "while", "for", "switch", "catch", "return", "new", "else", "throw", "case",
    "do", "try",
];

/// Modifier keywords; seeing one in return-type position means the match is
/// a constructor with no return type.
pub const MODIFIER_KEYWORDS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "default",
    "strictfp",
];
