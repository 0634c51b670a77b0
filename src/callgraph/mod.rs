//! Call graph ingestion and queries.
//!
//! A flat call dump is bulk-loaded into a SQLite table `call_edges`, indexed
//! on both the caller and the callee `(class, method)` pair.

pub mod ingest;
pub mod record;
pub mod session;
pub mod store;

pub use ingest::{IngestSummary, Ingestor, ingest};
pub use record::CallRecord;
pub use session::CallGraphSession;
pub use store::{CallGraphStats, CallGraphStore, MethodRef};
