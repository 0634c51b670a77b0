//! Plain result records returned by [`IndexSession`](super::IndexSession)

use crate::types::{ClassDeclaration, MethodDeclaration, Namespace};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// What a search hit refers to; also the optional search type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Class,
    Field,
    Method,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
        }
    }
}

impl FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "class" => Ok(SymbolKind::Class),
            "field" => Ok(SymbolKind::Field),
            "method" => Ok(SymbolKind::Method),
            other => Err(format!(
                "Unknown symbol kind '{other}'. Expected 'class', 'field' or 'method'"
            )),
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub kind: SymbolKind,
    pub qualified_class_name: String,
    pub name: String,
    /// Method signature or `Type name` for fields
    pub signature: Option<String>,
    pub source_path: String,
    /// Only set for methods
    pub line_start: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub qualified_name: String,
    pub simple_name: String,
    pub source_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEntry {
    pub namespace: Namespace,
    pub name: String,
}

/// A class together with its source text
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassView {
    pub qualified_name: String,
    pub namespace: Namespace,
    pub declaration: ClassDeclaration,
    pub source_path: String,
    pub source_text: String,
}

/// A method with a few lines of surrounding source
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodView {
    pub owning_class: String,
    pub method: MethodDeclaration,
    pub signature: String,
    pub source_path: String,
    /// First excerpt line, 1-based
    pub excerpt_start: usize,
    /// Last excerpt line, inclusive
    pub excerpt_end: usize,
    pub excerpt_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyDirection {
    /// Classes whose supertype is the given name
    Subclasses,
    /// Classes listing the given name among their interfaces
    Implementors,
}

impl FromStr for HierarchyDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "subclasses" => Ok(HierarchyDirection::Subclasses),
            "implementors" => Ok(HierarchyDirection::Implementors),
            other => Err(format!(
                "Unknown direction '{other}'. Expected 'subclasses' or 'implementors'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    pub qualified_name: String,
    pub source_path: String,
}
