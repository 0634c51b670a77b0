//! Table formatting utilities for structured output.

use crate::callgraph::CallGraphStats;
use crate::indexing::BuildSummary;
use comfy_table::{Attribute, Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Create a new table builder.
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    /// Set the table headers.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    /// Add a row to the table.
    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    /// Build and return the formatted table.
    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// Two-column table of an index build.
pub fn create_build_table(summary: &BuildSummary) -> String {
    let rate = if summary.elapsed.as_secs_f64() > 0.0 {
        summary.files_scanned as f64 / summary.elapsed.as_secs_f64()
    } else {
        0.0
    };

    TableBuilder::new()
        .set_headers(vec!["Metric", "Value"])
        .add_row(vec!["Files scanned".to_string(), summary.files_scanned.to_string()])
        .add_row(vec!["Files skipped".to_string(), summary.files_skipped.to_string()])
        .add_row(vec!["Classes".to_string(), summary.class_count.to_string()])
        .add_row(vec!["Packages".to_string(), summary.packages_indexed.to_string()])
        .add_row(vec!["Time".to_string(), format!("{:.2}s", summary.elapsed.as_secs_f64())])
        .add_row(vec!["Rate".to_string(), format!("{rate:.0} files/s")])
        .build()
}

/// Two-column table of call graph aggregates.
pub fn create_stats_table(stats: &CallGraphStats) -> String {
    TableBuilder::new()
        .set_headers(vec!["Metric", "Value"])
        .add_row(vec!["Call edges".to_string(), stats.total_edges.to_string()])
        .add_row(vec!["Distinct callers".to_string(), stats.distinct_callers.to_string()])
        .add_row(vec!["Distinct callees".to_string(), stats.distinct_callees.to_string()])
        .build()
}
