//! Text rendering of query results.

use super::tables::{create_build_table, create_stats_table};
use crate::callgraph::{CallGraphStats, IngestSummary, MethodRef};
use crate::indexing::BuildSummary;
use crate::query::{
    ClassSummary, ClassView, HierarchyEntry, MethodView, PackageEntry, SearchHit, SymbolKind,
};
use std::fmt;

impl fmt::Display for SearchHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SymbolKind::Class => write!(f, "class   {}", self.qualified_class_name)?,
            _ => write!(
                f,
                "{:<7} {}.{}",
                self.kind.as_str(),
                self.qualified_class_name,
                self.name
            )?,
        }
        if let Some(signature) = &self.signature {
            write!(f, "  [{signature}]")?;
        }
        match self.line_start {
            Some(line) => write!(f, "  {}:{line}", self.source_path),
            None => write!(f, "  {}", self.source_path),
        }
    }
}

impl fmt::Display for ClassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.qualified_name, self.source_path)
    }
}

impl fmt::Display for PackageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<9} {}", self.namespace.as_str(), self.name)
    }
}

impl fmt::Display for HierarchyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.qualified_name, self.source_path)
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.qualified_name, self.descriptor)?;
        if let Some(line) = self.line_number {
            write!(f, "  line {line}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declaration = &self.declaration;
        writeln!(
            f,
            "{} {} ({})",
            declaration.kind, self.qualified_name, self.namespace
        )?;
        if let Some(super_type) = &declaration.super_type {
            writeln!(f, "  extends {super_type}")?;
        }
        if !declaration.interfaces.is_empty() {
            writeln!(f, "  implements {}", declaration.interfaces.join(", "))?;
        }
        writeln!(
            f,
            "  {} fields, {} methods  {}",
            declaration.fields.len(),
            declaration.methods.len(),
            self.source_path
        )?;
        writeln!(f, "{}", "-".repeat(40))?;
        write!(f, "{}", self.source_text.trim_end())
    }
}

impl fmt::Display for MethodView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  ({})", self.signature, self.owning_class)?;
        writeln!(
            f,
            "{}:{}-{}",
            self.source_path, self.method.line_start, self.method.line_end
        )?;
        writeln!(f, "{}", "-".repeat(40))?;
        for (offset, line) in self.excerpt_text.lines().enumerate() {
            writeln!(f, "{:>5} | {line}", self.excerpt_start + offset)?;
        }
        Ok(())
    }
}

impl fmt::Display for CallGraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", create_stats_table(self))
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", create_build_table(self))?;
        if !self.skipped.is_empty() {
            write!(f, "\nSkipped (showing first {}):", self.skipped.len().min(5))?;
            for (path, reason) in self.skipped.iter().take(5) {
                write!(f, "\n  {}: {reason}", path.display())?;
            }
            if self.files_skipped > 5 {
                write!(f, "\n  ... and {} more", self.files_skipped - 5)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ingested {} call records ({} lines skipped) in {:.2}s",
            self.record_count,
            self.lines_skipped,
            self.elapsed.as_secs_f64()
        )
    }
}
