//! Read-only queries over an ingested call graph store.

use crate::error::{CallGraphError, CallGraphResult};
use rusqlite::{Connection, OpenFlags, Row, params};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Hard cap on rows returned by any query
pub const MAX_RESULTS: usize = 100;

/// Default limit for [`CallGraphStore::search_methods`]
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// One side of a call edge.
///
/// `qualified_name` is `type.method` and is ambiguous for overloads; use
/// `descriptor` to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRef {
    #[serde(rename = "type")]
    pub type_name: String,
    pub method: String,
    pub descriptor: String,
    pub qualified_name: String,
    pub line_number: Option<u32>,
}

impl MethodRef {
    pub fn new(type_name: String, method: String, descriptor: String, line_number: Option<u32>) -> Self {
        let qualified_name = format!("{type_name}.{method}");
        Self {
            type_name,
            method,
            descriptor,
            qualified_name,
            line_number,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let line: Option<i64> = row.get(3)?;
        Ok(Self::new(
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            line.and_then(|l| u32::try_from(l).ok()),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGraphStats {
    pub total_edges: u64,
    /// Distinct `(caller_class, caller_method)` pairs
    pub distinct_callers: u64,
    /// Distinct `(callee_class, callee_method)` pairs
    pub distinct_callees: u64,
}

pub struct CallGraphStore {
    conn: Connection,
    path: PathBuf,
    result_limit: usize,
}

impl CallGraphStore {
    /// Open an existing store read-only
    pub fn open(path: &Path) -> CallGraphResult<Self> {
        if !path.is_file() {
            return Err(CallGraphError::NotInitialized {
                path: path.to_path_buf(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(
            "
            PRAGMA query_only = ON;
            PRAGMA cache_size = -64000;
            PRAGMA temp_store = MEMORY;
            ",
        )?;
        tracing::debug!("[callgraph] opened {}", path.display());

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            result_limit: MAX_RESULTS,
        })
    }

    /// Lower the row cap. Values above [`MAX_RESULTS`] are clamped.
    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit.clamp(1, MAX_RESULTS);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Methods calling `type_name.method`, caller side projected
    pub fn find_callers(&self, type_name: &str, method: &str) -> CallGraphResult<Vec<MethodRef>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT caller_class, caller_method, caller_desc, line_number
             FROM call_edges
             WHERE callee_class = ?1 AND callee_method = ?2
             ORDER BY rowid
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(
            params![type_name, method, self.result_limit as i64],
            MethodRef::from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Methods called by `type_name.method`, callee side projected
    pub fn find_callees(&self, type_name: &str, method: &str) -> CallGraphResult<Vec<MethodRef>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT callee_class, callee_method, callee_desc, line_number
             FROM call_edges
             WHERE caller_class = ?1 AND caller_method = ?2
             ORDER BY rowid
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(
            params![type_name, method, self.result_limit as i64],
            MethodRef::from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Distinct methods on either side whose `type.method` contains `query`,
    /// ignoring case. At most `min(limit, result limit)` rows.
    pub fn search_methods(&self, query: &str, limit: usize) -> CallGraphResult<Vec<MethodRef>> {
        let limit = limit.min(self.result_limit);
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT class, method, descriptor, NULL FROM (
                 SELECT caller_class AS class, caller_method AS method, caller_desc AS descriptor
                 FROM call_edges
                 WHERE lower(caller_class || '.' || caller_method) LIKE ?1 ESCAPE '\\'
                 UNION ALL
                 SELECT callee_class, callee_method, callee_desc
                 FROM call_edges
                 WHERE lower(callee_class || '.' || callee_method) LIKE ?1 ESCAPE '\\'
             )
             ORDER BY class, method, descriptor
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![pattern, limit as i64], MethodRef::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn stats(&self) -> CallGraphResult<CallGraphStats> {
        let count = |sql: &str| -> CallGraphResult<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n.max(0) as u64)
        };

        Ok(CallGraphStats {
            total_edges: count("SELECT COUNT(*) FROM call_edges")?,
            distinct_callers: count(
                "SELECT COUNT(*) FROM (SELECT DISTINCT caller_class, caller_method FROM call_edges)",
            )?,
            distinct_callees: count(
                "SELECT COUNT(*) FROM (SELECT DISTINCT callee_class, callee_method FROM call_edges)",
            )?,
        })
    }
}

/// Escape `\`, `%` and `_` for a `LIKE ... ESCAPE '\'` pattern
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
