//! Settings file loading and path resolution

use classdex::Settings;
use classdex::callgraph::CallGraphSession;
use classdex::query::IndexSession;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_settings_file_drives_sessions() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(
        &config_path,
        format!(
            r#"
workspace_root = "{}"
index_path = "build/index"

[corpus]
primary_root = "decompiled/1.21.4"
version = "1.21.4"
secondary_prefix = "org.example"

[query]
search_limit = 5

[call_graph]
store_path = "build/calls.db"
result_limit = 10
"#,
            temp_dir.path().display()
        ),
    )
    .unwrap();

    let settings = Settings::load_from(&config_path).unwrap();
    assert_eq!(settings.corpus.version, "1.21.4");
    assert_eq!(settings.query.search_limit, 5);
    assert_eq!(settings.query.excerpt_context, 3);
    assert_eq!(settings.index_dir(), temp_dir.path().join("build/index"));

    let calls = CallGraphSession::new(&settings);
    assert_eq!(calls.path(), temp_dir.path().join("build/calls.db"));
    assert!(!calls.is_initialized());

    let session = IndexSession::new(&settings);
    assert_eq!(session.resolve_namespace("org.example.Mod").as_str(), "secondary");
    assert_eq!(session.resolve_namespace("org.examples.Mod").as_str(), "primary");
    assert!(session.manifest().is_none());
}

#[test]
fn test_invalid_settings_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(&config_path, "[query]\nsearch_limit = \"many\"\n").unwrap();

    assert!(Settings::load_from(&config_path).is_err());
}

#[test]
fn test_settings_file_in_config_dir_sets_workspace_root() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join(".classdex");
    fs::create_dir_all(&config_dir).unwrap();
    let config_path = config_dir.join("settings.toml");
    fs::write(
        &config_path,
        "index_path = \"build/index\"\n\n[call_graph]\nstore_path = \"build/calls.db\"\n",
    )
    .unwrap();

    let settings = Settings::load_from(&config_path).unwrap();
    assert_eq!(settings.workspace_root.as_deref(), Some(temp_dir.path()));
    assert_eq!(settings.index_dir(), temp_dir.path().join("build/index"));
    assert_eq!(
        CallGraphSession::new(&settings).path(),
        temp_dir.path().join("build/calls.db")
    );
}
