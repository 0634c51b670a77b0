//! Queries over the class index: search, class and method retrieval,
//! package listing and hierarchy scans.

pub mod results;
pub mod service;
pub mod session;

pub use results::{
    ClassSummary, ClassView, HierarchyDirection, HierarchyEntry, MethodView, PackageEntry,
    SearchHit, SymbolKind,
};
pub use service::QueryService;
pub use session::IndexSession;
