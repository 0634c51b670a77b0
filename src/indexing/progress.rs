//! Progress reporting for index builds

use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Advisory progress callback: `(stage, percent 0..=100, message)`.
///
/// Called from parser worker threads; it cannot stop a build.
pub type ProgressCallback<'a> = dyn Fn(&str, u8, &str) + Send + Sync + 'a;

/// Stage names passed to the progress callback
pub mod stage {
    pub const SCAN: &str = "scan";
    pub const PARSE: &str = "parse";
    pub const WRITE: &str = "write";
    pub const DONE: &str = "done";
}

/// Percentage of `done` out of `total`, clamped to 0..=100
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

/// Outcome of one build pass
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    /// Number of shards written, both namespaces
    pub packages_indexed: usize,

    /// Number of classes stored in shards
    pub class_count: usize,

    /// Number of source files found by the walker
    pub files_scanned: usize,

    /// Files that were not UTF-8 or declared no type
    pub files_skipped: usize,

    /// Time elapsed during the build
    #[serde(rename = "elapsedMs", serialize_with = "as_millis")]
    pub elapsed: Duration,

    /// Skip reasons (limited to first N)
    #[serde(skip)]
    pub skipped: Vec<(PathBuf, String)>,

    #[serde(skip)]
    start_time: Option<Instant>,
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

impl BuildSummary {
    /// Create an empty summary and start timing
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Stop timing and record elapsed time
    pub fn stop_timing(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed = start.elapsed();
            self.start_time = None;
        }
    }

    /// Record a skipped file (reasons limited to the first 100)
    pub fn add_skipped(&mut self, path: PathBuf, reason: String) {
        if self.skipped.len() < 100 {
            self.skipped.push((path, reason));
        }
        self.files_skipped += 1;
    }
}
