//! Progress display for index builds and call graph ingestion.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a styled percentage bar.
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {prefix:.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders `(stage, percent, message)` progress callbacks on one bar.
#[derive(Clone)]
pub struct StageProgress {
    bar: ProgressBar,
}

impl StageProgress {
    pub fn new(message: &str) -> Self {
        Self {
            bar: create_progress_bar(100, message),
        }
    }

    /// Hidden bar, used for JSON output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn report(&self, stage: &str, percent: u8, message: &str) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_position(u64::from(percent.min(100)));
        self.bar.set_message(message.to_string());
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}
