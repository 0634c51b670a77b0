/// The main library module for classdex
pub mod callgraph;
pub mod config;
pub mod display;
pub mod error;
pub mod indexing;
pub mod io;
pub mod lazy;
pub mod parsing;
pub mod query;
pub mod storage;
pub mod types;

// Explicit exports for better API clarity
pub use callgraph::{CallGraphSession, CallGraphStats, CallRecord, IngestSummary, MethodRef};
pub use config::Settings;
pub use error::{CallGraphError, CallGraphResult, IndexError, IndexResult};
pub use indexing::{BuildSummary, CorpusRoots, CorpusVersions, IndexBuilder};
pub use lazy::LazyInit;
pub use parsing::{DeclarationParser, PatternParser, parse_declaration};
pub use query::{IndexSession, QueryService};
pub use storage::{CorpusManifest, IndexPersistence, PackageShard, StorageError, StorageResult};
pub use types::{
    ClassDeclaration, ClassKind, FieldDeclaration, MethodDeclaration, Modifier, Namespace,
    Parameter, ParsedDeclaration,
};
