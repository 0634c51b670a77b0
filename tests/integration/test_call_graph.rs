//! Call graph ingestion and queries against a real SQLite file

use classdex::callgraph::{CallGraphSession, CallGraphStats, CallGraphStore, ingest};
use classdex::io::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DUMP: &str = "# seq\tnum\tcaller\tcallee\tline\n\
1\t1\tfoo.Bar:baz()\t(VIR)foo.Qux:quux()\t42\t...\n\
2\t1\tfoo.Bar:baz()\t(STA)foo.Util:log(Ljava/lang/String;)V\t43\n\
3\t1\tfoo.Zed:run()V\t(VIR)foo.Qux:quux()\t\t\n\
4\t1\tfoo.Zed:run()V\t(VIR)foo.Qux:quux()\t7\n\
\n\
not a record\n\
5\t1\tbroken caller\t(VIR)foo.Qux:quux()\t1\n";

fn write_dump(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("calls.tsv");
    fs::write(&path, DUMP).unwrap();
    path
}

#[test]
fn test_ingest_then_find_callers() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(temp_dir.path());
    let store_path = temp_dir.path().join("callgraph.db");

    assert_eq!(ingest(&dump, &store_path).unwrap(), 4);

    let store = CallGraphStore::open(&store_path).unwrap();
    let callers = store.find_callers("foo.Qux", "quux").unwrap();
    assert_eq!(callers.len(), 3);
    assert_eq!(callers[0].qualified_name, "foo.Bar.baz");
    assert_eq!(callers[0].descriptor, "()");
    assert_eq!(callers[0].line_number, Some(42));
    assert_eq!(callers[1].qualified_name, "foo.Zed.run");
    assert_eq!(callers[1].line_number, None);

    let callees = store.find_callees("foo.Bar", "baz").unwrap();
    let names: Vec<&str> = callees.iter().map(|m| m.qualified_name.as_str()).collect();
    assert_eq!(names, ["foo.Qux.quux", "foo.Util.log"]);

    assert!(store.find_callers("foo.Bar", "baz").unwrap().is_empty());
}

#[test]
fn test_stats_are_exact() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(temp_dir.path());
    let session = CallGraphSession::with_path(temp_dir.path().join("callgraph.db"));

    let summary = session.reingest(&dump, None).unwrap();
    assert_eq!(summary.record_count, 4);
    assert_eq!(summary.lines_skipped, 2);

    assert_eq!(
        session.stats().unwrap(),
        Some(CallGraphStats {
            total_edges: 4,
            distinct_callers: 2,
            distinct_callees: 2,
        })
    );
}

#[test]
fn test_search_methods_is_distinct_and_escaped() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(temp_dir.path());
    let session = CallGraphSession::with_path(temp_dir.path().join("callgraph.db"));
    session.reingest(&dump, None).unwrap();

    let found = session.search_methods("QUX.QU", None).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].qualified_name, "foo.Qux.quux");

    let everything = session.search_methods("foo.", Some(2)).unwrap();
    assert_eq!(everything.len(), 2);

    assert!(session.search_methods("%", None).unwrap().is_empty());
    assert!(session.search_methods("foo_Bar", None).unwrap().is_empty());
}

#[test]
fn test_queries_before_ingest_are_not_initialized() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.db");

    let err = CallGraphStore::open(&path).err().unwrap();
    assert!(err.is_not_initialized());
    assert_eq!(ExitCode::from_call_graph_error(&err), ExitCode::NotInitialized);

    let session = CallGraphSession::with_path(&path);
    assert!(session.stats().unwrap().is_none());
    assert!(session.find_callees("foo.Bar", "baz").unwrap_err().is_not_initialized());
    assert!(!path.exists());
}

#[test]
fn test_reingest_replaces_previous_store() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(temp_dir.path());
    let session = CallGraphSession::with_path(temp_dir.path().join("callgraph.db"));
    session.reingest(&dump, None).unwrap();
    assert_eq!(session.find_callers("foo.Qux", "quux").unwrap().len(), 3);

    let smaller = temp_dir.path().join("smaller.tsv");
    fs::write(&smaller, "1\t1\ta.B:c()\t(VIR)a.D:e()\t1\n").unwrap();
    session.reingest(&smaller, None).unwrap();

    assert!(session.find_callers("foo.Qux", "quux").unwrap().is_empty());
    assert_eq!(session.stats().unwrap().unwrap().total_edges, 1);
}

#[test]
fn test_missing_dump_keeps_existing_store() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(temp_dir.path());
    let session = CallGraphSession::with_path(temp_dir.path().join("callgraph.db"));
    session.reingest(&dump, None).unwrap();

    let err = session
        .reingest(&temp_dir.path().join("nope.tsv"), None)
        .unwrap_err();
    assert_eq!(err.status_code(), "DUMP_READ_ERROR");
    assert_eq!(session.stats().unwrap().unwrap().total_edges, 4);
}

#[test]
fn test_dump_read_failure_keeps_existing_store() {
    let temp_dir = TempDir::new().unwrap();
    let dump = write_dump(temp_dir.path());
    let store_path = temp_dir.path().join("callgraph.db");
    let session = CallGraphSession::with_path(&store_path);
    session.reingest(&dump, None).unwrap();
    let before = session.stats().unwrap();

    // Opening a directory succeeds; reading it does not
    let dump_dir = temp_dir.path().join("dump.d");
    fs::create_dir(&dump_dir).unwrap();
    let err = session.reingest(&dump_dir, None).unwrap_err();
    assert_eq!(err.status_code(), "DUMP_READ_ERROR");

    assert!(session.is_initialized());
    assert_eq!(session.stats().unwrap(), before);
    assert_eq!(session.find_callers("foo.Qux", "quux").unwrap().len(), 3);

    let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".ingest"))
        .collect();
    assert!(leftovers.is_empty(), "staging files left behind: {leftovers:?}");
}
