//! Declaration parsing.
//!
//! Callers depend on the [`DeclarationParser`] trait only, so the regex
//! based [`PatternParser`] can be replaced by a tokenizer backed parser
//! without touching the index builder.

pub mod declaration;
pub mod lines;
pub mod normalize;
pub mod patterns;

pub use declaration::{PatternParser, parse_declaration};
pub use lines::{LineIndex, fallback_line_end, find_block_end};
pub use normalize::normalize_type_name;

use crate::types::ParsedDeclaration;

/// Turns one source file into the declaration it contains
pub trait DeclarationParser: Send + Sync {
    /// Parse `text`, recording `path` as the declaration's source path.
    ///
    /// Returns `None` when the file declares no recognizable type. Must not
    /// panic on malformed input.
    fn parse(&self, text: &str, path: &str) -> Option<ParsedDeclaration>;
}
