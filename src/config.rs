//! Configuration module for the class index.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.classdex/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CDX_` and use double underscores
//! to separate nested levels:
//! - `CDX_INDEXING__PARALLEL_THREADS=8` sets `indexing.parallel_threads`
//! - `CDX_CORPUS__VERSION=1.21.4` sets `corpus.version`
//! - `CDX_CALL_GRAPH__STORE_PATH=/tmp/calls.db` sets `call_graph.store_path`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the settings file and, by default, the index
pub const CONFIG_DIR: &str = ".classdex";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the manifest and package shards
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Workspace root directory (where .classdex is located)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Source corpus locations and versions
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Index build settings
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Class index query settings
    #[serde(default)]
    pub query: QueryConfig,

    /// Call graph store settings
    #[serde(default)]
    pub call_graph: CallGraphConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorpusConfig {
    /// Root of the primary source tree for `version`
    #[serde(default = "default_primary_root")]
    pub primary_root: PathBuf,

    /// Root of the optional secondary source tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_root: Option<PathBuf>,

    /// Version label of the primary corpus
    #[serde(default = "default_corpus_version")]
    pub version: String,

    /// Version label of the secondary corpus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_version: Option<String>,

    /// Qualified names starting with this package resolve to the secondary
    /// namespace
    #[serde(default = "default_secondary_prefix")]
    pub secondary_prefix: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Number of parallel threads for parsing
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// File extensions treated as source files
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueryConfig {
    /// Maximum number of search hits
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Lines of context around a method excerpt
    #[serde(default = "default_excerpt_context")]
    pub excerpt_context: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CallGraphConfig {
    /// SQLite file produced by ingestion
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Rows per insert transaction
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Row cap for caller/callee/search queries
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    PathBuf::from(".classdex/index")
}
fn default_false() -> bool {
    false
}
fn default_primary_root() -> PathBuf {
    PathBuf::from("sources/primary")
}
fn default_corpus_version() -> String {
    "unknown".to_string()
}
fn default_secondary_prefix() -> String {
    "net.fabricmc".to_string()
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_extensions() -> Vec<String> {
    vec!["java".to_string()]
}
fn default_search_limit() -> usize {
    50
}
fn default_excerpt_context() -> usize {
    3
}
fn default_store_path() -> PathBuf {
    PathBuf::from(".classdex/callgraph.db")
}
fn default_batch_size() -> usize {
    10_000
}
fn default_result_limit() -> usize {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_path: default_index_path(),
            workspace_root: None,
            debug: false,
            corpus: CorpusConfig::default(),
            indexing: IndexingConfig::default(),
            query: QueryConfig::default(),
            call_graph: CallGraphConfig::default(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            primary_root: default_primary_root(),
            secondary_root: None,
            version: default_corpus_version(),
            secondary_version: None,
            secondary_prefix: default_secondary_prefix(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            extensions: default_extensions(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            excerpt_context: default_excerpt_context(),
        }
    }
}

impl Default for CallGraphConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            batch_size: default_batch_size(),
            result_limit: default_result_limit(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .classdex directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                // If workspace_root is not set in config, detect it
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file.
    ///
    /// Without an explicit `workspace_root`, a file inside a `.classdex`
    /// directory makes that directory's parent the root; any other file
    /// falls back to the same upward search `load` uses.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let path = path.as_ref();
        Self::figment(path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root =
                        Self::root_of_config(path).or_else(Self::workspace_root);
                }
                settings
            })
    }

    /// `<root>` for a config file at `<root>/.classdex/<file>`
    fn root_of_config(config_path: &Path) -> Option<PathBuf> {
        let config_dir = config_path.parent()?;
        if config_dir.file_name()? != CONFIG_DIR {
            return None;
        }
        let root = config_dir.parent()?;
        let root = if root.as_os_str().is_empty() {
            std::env::current_dir().ok()?
        } else {
            root.to_path_buf()
        };
        Some(root)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels, single underscores
            // stay inside field names
            .merge(Env::prefixed("CDX_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the workspace config by looking for a .classdex directory
    /// from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .classdex is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }

        None
    }

    /// Resolve a configured path against the workspace root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.workspace_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Index directory, resolved against the workspace root
    pub fn index_dir(&self) -> PathBuf {
        self.resolve(&self.index_path)
    }

    /// Call graph store path, resolved against the workspace root
    pub fn call_graph_store(&self) -> PathBuf {
        self.resolve(&self.call_graph.store_path)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = format!(
            r#"# classdex configuration file

# Version of the configuration schema
version = 1

# Directory holding manifest.json and the package shards
index_path = ".classdex/index"

# Global debug mode
debug = false

[corpus]
# Decompiled source tree of the primary corpus
primary_root = "sources/primary"

# Optional second source tree, indexed into the "secondary" namespace
# secondary_root = "sources/secondary"

# Version labels recorded in the manifest
version = "unknown"
# secondary_version = "unknown"

# Qualified names under this package are looked up in the secondary namespace
secondary_prefix = "net.fabricmc"

[indexing]
# Number of parallel parser threads (defaults to CPU count)
# parallel_threads = {}

# Source file extensions
extensions = ["java"]

[query]
# Maximum number of search hits
search_limit = 50

# Lines of context shown around a method body
excerpt_context = 3

[call_graph]
# SQLite store written by 'classdex ingest'
store_path = ".classdex/callgraph.db"

# Rows inserted per transaction
batch_size = 10000

# Maximum rows returned by caller/callee/method queries
result_limit = 100
"#,
            num_cpus::get()
        );

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_root_of_config() {
        assert_eq!(
            Settings::root_of_config(Path::new("/work/mod/.classdex/settings.toml")),
            Some(PathBuf::from("/work/mod"))
        );
        assert_eq!(
            Settings::root_of_config(Path::new("/work/mod/settings.toml")),
            None
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.index_path, PathBuf::from(".classdex/index"));
        assert!(settings.indexing.parallel_threads > 0);
        assert_eq!(settings.indexing.extensions, vec!["java"]);
        assert_eq!(settings.query.search_limit, 50);
        assert_eq!(settings.call_graph.result_limit, 100);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[corpus]
primary_root = "/data/mc/1.21"
version = "1.21"
secondary_root = "/data/fabric"

[indexing]
parallel_threads = 4
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.indexing.parallel_threads, 4);
        assert_eq!(settings.corpus.version, "1.21");
        assert_eq!(
            settings.corpus.secondary_root,
            Some(PathBuf::from("/data/fabric"))
        );
        // Untouched sections keep defaults
        assert_eq!(settings.corpus.secondary_prefix, "net.fabricmc");
        assert_eq!(settings.query.excerpt_context, 3);
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.indexing.parallel_threads = 2;
        settings.corpus.secondary_version = Some("0.100".to_string());

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.indexing.parallel_threads, 2);
        assert_eq!(loaded.corpus.secondary_version.as_deref(), Some("0.100"));
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[call_graph]\nbatch_size = 500\n").unwrap();

        unsafe {
            std::env::set_var("CDX_CALL_GRAPH__BATCH_SIZE", "250");
        }
        let settings = Settings::load_from(&config_path).unwrap();
        unsafe {
            std::env::remove_var("CDX_CALL_GRAPH__BATCH_SIZE");
        }

        assert_eq!(settings.call_graph.batch_size, 250);
    }

    #[test]
    fn test_resolve_against_workspace_root() {
        let mut settings = Settings::default();
        assert_eq!(settings.index_dir(), PathBuf::from(".classdex/index"));

        settings.workspace_root = Some(PathBuf::from("/work"));
        assert_eq!(settings.index_dir(), PathBuf::from("/work/.classdex/index"));

        settings.call_graph.store_path = PathBuf::from("/abs/calls.db");
        assert_eq!(settings.call_graph_store(), PathBuf::from("/abs/calls.db"));
    }
}
