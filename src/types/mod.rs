//! Core data model shared by the parser, the index builder and the query layer.
//!
//! Everything in here is plain data. A [`ClassDeclaration`] is created once per
//! build pass and never mutated afterwards; a rebuild replaces it wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Package name used for classes that declare no package.
pub const DEFAULT_PACKAGE: &str = "default";

/// Kind of a parsed type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

impl ClassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Enum => "enum",
        }
    }
}

impl FromStr for ClassKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(ClassKind::Class),
            "interface" => Ok(ClassKind::Interface),
            "enum" => Ok(ClassKind::Enum),
            _ => Err("Unknown class kind"),
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration modifiers recognized by the parser.
///
/// This is a closed vocabulary: keywords outside of it (`default`, `sealed`,
/// `strictfp`, ...) are never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Synchronized,
    Volatile,
    Transient,
    Native,
}

impl Modifier {
    pub const ALL: [Modifier; 10] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Static,
        Modifier::Final,
        Modifier::Abstract,
        Modifier::Synchronized,
        Modifier::Volatile,
        Modifier::Transient,
        Modifier::Native,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Synchronized => "synchronized",
            Modifier::Volatile => "volatile",
            Modifier::Transient => "transient",
            Modifier::Native => "native",
        }
    }

    /// Look up a keyword in the vocabulary
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == word)
    }

    /// Collect the vocabulary keywords out of a whitespace separated prefix,
    /// keeping source order and dropping duplicates.
    pub fn collect_from(prefix: &str) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        for word in prefix.split_whitespace() {
            if let Some(modifier) = Self::from_keyword(word) {
                if !modifiers.contains(&modifier) {
                    modifiers.push(modifier);
                }
            }
        }
        modifiers
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field declared in a class body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    /// Raw, unresolved type text
    #[serde(rename = "type")]
    pub declared_type: String,
    pub modifiers: Vec<Modifier>,
}

/// A single method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

/// A method declared in a class body.
///
/// `line_start` and `line_end` are 1-based and inclusive. `line_end` comes
/// from brace matching and is best effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDeclaration {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub modifiers: Vec<Modifier>,
    pub line_start: usize,
    pub line_end: usize,
}

impl MethodDeclaration {
    /// Human readable signature, e.g. `public static int max(int a, int b)`
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.param_type, p.name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut signature = String::new();
        for modifier in &self.modifiers {
            signature.push_str(modifier.as_str());
            signature.push(' ');
        }
        signature.push_str(&format!("{} {}({params})", self.return_type, self.name));
        signature
    }
}

/// One parsed type.
///
/// Serializes exactly the attributes stored in a package shard. The simple
/// name and package live in the shard itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDeclaration {
    pub kind: ClassKind,
    #[serde(rename = "super")]
    pub super_type: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    /// Path relative to the corpus root, always `/` separated
    pub source_path: String,
}

/// Parser output: a declaration plus the coordinates needed to place it
/// into a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeclaration {
    /// Declared package, empty when the file has no `package` statement
    pub package_name: String,
    pub simple_name: String,
    pub declaration: ClassDeclaration,
}

impl ParsedDeclaration {
    /// Package bucket used by the index, `"default"` for package-less files
    pub fn package_bucket(&self) -> &str {
        if self.package_name.is_empty() {
            DEFAULT_PACKAGE
        } else {
            &self.package_name
        }
    }
}

/// Top-level partition of the indexed corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Primary,
    Secondary,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Primary, Namespace::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Primary => "primary",
            Namespace::Secondary => "secondary",
        }
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Namespace::Primary),
            "secondary" => Ok(Namespace::Secondary),
            other => Err(format!(
                "Unknown namespace '{other}'. Expected 'primary' or 'secondary'"
            )),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the dotted name of a class inside a package bucket
pub fn qualify(package: &str, simple_name: &str) -> String {
    if package.is_empty() || package == DEFAULT_PACKAGE {
        simple_name.to_string()
    } else {
        format!("{package}.{simple_name}")
    }
}

/// Split a dotted class name into its package bucket and simple name.
///
/// A name without a dot belongs to the default package.
pub fn split_qualified(qualified_name: &str) -> (&str, &str) {
    match qualified_name.rsplit_once('.') {
        Some((package, simple)) => (package, simple),
        None => (DEFAULT_PACKAGE, qualified_name),
    }
}
