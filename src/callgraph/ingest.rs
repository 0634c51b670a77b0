//! Bulk load of a call dump into a fresh SQLite store.

use super::record::{CallRecord, LineRejection};
use crate::error::{CallGraphError, CallGraphResult};
use crate::indexing::ProgressCallback;
use crate::indexing::progress::{percent, stage};
use rusqlite::{Connection, Transaction, params};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Rows inserted per transaction
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

const SCHEMA: &str = "
    CREATE TABLE call_edges (
        caller_class  TEXT NOT NULL,
        caller_method TEXT NOT NULL,
        caller_desc   TEXT NOT NULL,
        callee_class  TEXT NOT NULL,
        callee_method TEXT NOT NULL,
        callee_desc   TEXT NOT NULL,
        line_number   INTEGER
    );
";

const INDEXES: &str = "
    CREATE INDEX idx_callee ON call_edges (callee_class, callee_method);
    CREATE INDEX idx_caller ON call_edges (caller_class, caller_method);
";

/// Bulk load pragmas; the store is rebuilt from scratch on failure anyway
const LOAD_PRAGMAS: &str = "
    PRAGMA journal_mode = MEMORY;
    PRAGMA synchronous = OFF;
    PRAGMA temp_store = MEMORY;
    PRAGMA cache_size = -64000;
";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub record_count: usize,
    /// Lines with too few fields or unparsable caller/callee
    pub lines_skipped: usize,
    #[serde(rename = "elapsedMs", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// Replace the store at `target` with the records of `raw_dump`.
/// Returns the number of records inserted.
pub fn ingest(raw_dump: &Path, target: &Path) -> CallGraphResult<usize> {
    Ingestor::new(target)
        .ingest(raw_dump, None)
        .map(|summary| summary.record_count)
}

/// Configurable ingestion into one store path
#[derive(Debug, Clone)]
pub struct Ingestor {
    target: PathBuf,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Load `raw_dump` into a staging file next to the store, then rename
    /// it over the store.
    ///
    /// The previous store stays in place until the new one is complete, so a
    /// failed load (missing dump, read error, SQLite error) leaves it intact.
    pub fn ingest(
        &self,
        raw_dump: &Path,
        progress: Option<&ProgressCallback<'_>>,
    ) -> CallGraphResult<IngestSummary> {
        let start = Instant::now();
        let file = File::open(raw_dump).map_err(|source| CallGraphError::DumpRead {
            path: raw_dump.to_path_buf(),
            source,
        })?;
        let total_bytes = file.metadata().map(|m| m.len() as usize).unwrap_or(0);

        if let Some(parent) = self.target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| store_io(parent, e))?;
        }

        let staging = self.staging_path();
        remove_sqlite_files(&staging)?;

        let mut summary =
            match self.load(BufReader::new(file), raw_dump, total_bytes, &staging, progress) {
                Ok(summary) => summary,
                Err(e) => {
                    if let Err(cleanup) = remove_sqlite_files(&staging) {
                        tracing::warn!("[ingest] staging cleanup failed: {cleanup}");
                    }
                    return Err(e);
                }
            };

        remove_sqlite_sidecars(&self.target)?;
        fs::rename(&staging, &self.target).map_err(|e| store_io(&self.target, e))?;

        summary.elapsed = start.elapsed();
        tracing::info!(
            "[ingest] {} call records ({} lines skipped) into {} in {:.2}s",
            summary.record_count,
            summary.lines_skipped,
            self.target.display(),
            summary.elapsed.as_secs_f64()
        );
        if let Some(callback) = progress {
            callback(stage::DONE, 100, "Call graph ingestion complete");
        }

        Ok(summary)
    }

    /// Hidden sibling of the store, on the same filesystem so rename is atomic
    pub fn staging_path(&self) -> PathBuf {
        let name = self
            .target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "callgraph.db".to_string());
        self.target.with_file_name(format!(".{name}.ingest"))
    }

    fn load(
        &self,
        mut reader: BufReader<File>,
        raw_dump: &Path,
        total_bytes: usize,
        staging: &Path,
        progress: Option<&ProgressCallback<'_>>,
    ) -> CallGraphResult<IngestSummary> {
        let mut conn = Connection::open(staging)?;
        conn.execute_batch(LOAD_PRAGMAS)?;
        conn.execute_batch(SCHEMA)?;

        let mut summary = IngestSummary::default();
        let mut batch: Vec<CallRecord> = Vec::with_capacity(self.batch_size);
        let mut bytes_read = 0usize;
        let mut line_no = 0usize;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| CallGraphError::DumpRead {
                    path: raw_dump.to_path_buf(),
                    source,
                })?;
            if n == 0 {
                break;
            }
            bytes_read += n;
            line_no += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                tracing::debug!("[ingest] line {line_no}: not valid UTF-8");
                summary.lines_skipped += 1;
                continue;
            };

            match CallRecord::parse_line(line) {
                Ok(record) => batch.push(record),
                Err(LineRejection::Ignored) => {}
                Err(reason) => {
                    tracing::debug!("[ingest] line {line_no}: skipped ({reason:?})");
                    summary.lines_skipped += 1;
                }
            }

            if batch.len() >= self.batch_size {
                summary.record_count += insert_batch(&mut conn, &batch)?;
                batch.clear();
                if let Some(callback) = progress {
                    callback(
                        stage::PARSE,
                        percent(bytes_read, total_bytes),
                        &format!("{} call records loaded", summary.record_count),
                    );
                }
            }
        }

        if !batch.is_empty() {
            summary.record_count += insert_batch(&mut conn, &batch)?;
        }

        if let Some(callback) = progress {
            callback(stage::WRITE, 100, "Creating indexes");
        }
        conn.execute_batch(INDEXES)?;
        conn.close().map_err(|(_, e)| e)?;

        Ok(summary)
    }
}

fn store_io(path: &Path, source: std::io::Error) -> CallGraphError {
    CallGraphError::StoreIo {
        path: path.to_path_buf(),
        source,
    }
}

fn remove_if_present(path: &Path) -> CallGraphResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("[ingest] removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(store_io(path, e)),
    }
}

/// Remove the `-wal`, `-shm` and `-journal` files SQLite keeps beside `db`
fn remove_sqlite_sidecars(db: &Path) -> CallGraphResult<()> {
    for suffix in ["-wal", "-shm", "-journal"] {
        let mut path = db.as_os_str().to_owned();
        path.push(suffix);
        remove_if_present(Path::new(&path))?;
    }
    Ok(())
}

fn remove_sqlite_files(db: &Path) -> CallGraphResult<()> {
    remove_if_present(db)?;
    remove_sqlite_sidecars(db)
}

fn insert_batch(conn: &mut Connection, records: &[CallRecord]) -> CallGraphResult<usize> {
    let tx = conn.transaction()?;
    let count = insert_records(&tx, records)?;
    tx.commit()?;
    Ok(count)
}

fn insert_records(tx: &Transaction<'_>, records: &[CallRecord]) -> CallGraphResult<usize> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO call_edges
         (caller_class, caller_method, caller_desc, callee_class, callee_method, callee_desc, line_number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for record in records {
        stmt.execute(params![
            record.caller_type,
            record.caller_method,
            record.caller_descriptor,
            record.callee_type,
            record.callee_method,
            record.callee_descriptor,
            record.line_number,
        ])?;
    }
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DUMP: &str = "# seq\tnum\tcaller\tcallee\tline\n\
1\t1\tfoo.Bar:baz()\t(VIR)foo.Qux:quux()\t42\t\n\
2\t1\tfoo.Bar:baz()\t(STA)foo.Util:log(Ljava/lang/String;)V\t43\t\n\
garbage line\n\
\n\
3\t2\tfoo.Main:main([Ljava/lang/String;)V\t(SPE)foo.Bar:<init>()V\t\t\n";

    fn count_rows(path: &Path) -> i64 {
        let conn = Connection::open(path).unwrap();
        conn.query_row("SELECT COUNT(*) FROM call_edges", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_ingest_counts_and_skips() {
        let temp_dir = TempDir::new().unwrap();
        let dump = temp_dir.path().join("calls.tsv");
        fs::write(&dump, DUMP).unwrap();
        let store = temp_dir.path().join("db").join("calls.db");

        let summary = Ingestor::new(&store)
            .with_batch_size(2)
            .ingest(&dump, None)
            .unwrap();

        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.lines_skipped, 1);
        assert_eq!(count_rows(&store), 3);
    }

    #[test]
    fn test_reingest_replaces_store() {
        let temp_dir = TempDir::new().unwrap();
        let dump = temp_dir.path().join("calls.tsv");
        let store = temp_dir.path().join("calls.db");

        fs::write(&dump, DUMP).unwrap();
        assert_eq!(ingest(&dump, &store).unwrap(), 3);

        fs::write(&dump, "1\t1\ta.B:c()\t(VIR)d.E:f()\t1\t\n").unwrap();
        assert_eq!(ingest(&dump, &store).unwrap(), 1);
        assert_eq!(count_rows(&store), 1);
    }

    #[test]
    fn test_indexes_created() {
        let temp_dir = TempDir::new().unwrap();
        let dump = temp_dir.path().join("calls.tsv");
        let store = temp_dir.path().join("calls.db");
        fs::write(&dump, DUMP).unwrap();
        ingest(&dump, &store).unwrap();

        let conn = Connection::open(&store).unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index' ORDER BY name")
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(names, vec!["idx_callee", "idx_caller"]);
    }

    #[test]
    fn test_missing_dump_keeps_existing_store() {
        let temp_dir = TempDir::new().unwrap();
        let dump = temp_dir.path().join("calls.tsv");
        let store = temp_dir.path().join("calls.db");
        fs::write(&dump, DUMP).unwrap();
        ingest(&dump, &store).unwrap();

        let err = ingest(&temp_dir.path().join("missing.tsv"), &store).unwrap_err();
        assert!(matches!(err, CallGraphError::DumpRead { .. }));
        assert_eq!(count_rows(&store), 3);
    }

    #[test]
    fn test_failed_read_keeps_store_and_removes_staging() {
        let temp_dir = TempDir::new().unwrap();
        let dump = temp_dir.path().join("calls.tsv");
        let store = temp_dir.path().join("calls.db");
        fs::write(&dump, DUMP).unwrap();
        ingest(&dump, &store).unwrap();

        // A directory opens fine but fails on the first read
        let not_a_file = temp_dir.path().join("dump_dir");
        fs::create_dir(&not_a_file).unwrap();
        let ingestor = Ingestor::new(&store);
        let err = ingestor.ingest(&not_a_file, None).unwrap_err();

        assert!(matches!(err, CallGraphError::DumpRead { .. }));
        assert_eq!(count_rows(&store), 3);
        assert!(!ingestor.staging_path().exists());
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let ingestor = Ingestor::new("/data/.classdex/callgraph.db");
        assert_eq!(
            ingestor.staging_path(),
            PathBuf::from("/data/.classdex/.callgraph.db.ingest")
        );
    }
}
