pub mod builder;
pub mod progress;
pub mod walker;

pub use builder::{CorpusRoots, CorpusVersions, IndexBuilder};
pub use progress::{BuildSummary, ProgressCallback};
pub use walker::FileWalker;
