//! Terminal display utilities: progress bars, tables and the text form of
//! query results.

pub mod progress;
pub mod results;
pub mod tables;

pub use progress::{StageProgress, create_progress_bar};
pub use tables::{TableBuilder, create_build_table, create_stats_table};
