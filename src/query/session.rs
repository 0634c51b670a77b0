//! Read side of the class index.
//!
//! An [`IndexSession`] memoizes the manifest and caches every shard it
//! touches for its whole lifetime. Nothing here mutates the index on disk.
//!
//! Absence is never an error: a missing manifest, package, class or source
//! file yields `None` or an empty list. A manifest or shard that fails to
//! deserialize is treated the same way and logged.

use super::results::{
    ClassSummary, ClassView, HierarchyDirection, HierarchyEntry, MethodView, PackageEntry,
    SearchHit, SymbolKind,
};
use crate::Settings;
use crate::indexing::CorpusRoots;
use crate::storage::{CorpusManifest, IndexPersistence, PackageShard, StorageResult};
use crate::types::{ClassDeclaration, Namespace, qualify, split_qualified};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

type ShardKey = (Namespace, String);

pub struct IndexSession {
    persistence: IndexPersistence,
    roots: CorpusRoots,
    secondary_prefix: String,
    search_limit: usize,
    excerpt_context: usize,
    manifest: OnceLock<Arc<CorpusManifest>>,
    shards: RwLock<HashMap<ShardKey, Arc<PackageShard>>>,
}

impl IndexSession {
    /// Open the configured index. Nothing is read until the first query.
    pub fn new(settings: &Settings) -> Self {
        Self::with_parts(
            IndexPersistence::new(settings.index_dir()),
            CorpusRoots::from_settings(settings),
            settings,
        )
    }

    pub fn with_parts(persistence: IndexPersistence, roots: CorpusRoots, settings: &Settings) -> Self {
        Self {
            persistence,
            roots,
            secondary_prefix: settings.corpus.secondary_prefix.clone(),
            search_limit: settings.query.search_limit,
            excerpt_context: settings.query.excerpt_context,
            manifest: OnceLock::new(),
            shards: RwLock::new(HashMap::new()),
        }
    }

    /// The manifest, if the index was built. Only a successful load is
    /// memoized, so a later build becomes visible to a session that started
    /// before it.
    pub fn manifest(&self) -> Option<Arc<CorpusManifest>> {
        if let Some(manifest) = self.manifest.get() {
            return Some(manifest.clone());
        }

        let loaded = absent_on_error(self.persistence.load_manifest(), "manifest")?;
        Some(self.manifest.get_or_init(|| Arc::new(loaded)).clone())
    }

    /// Number of shards currently cached
    pub fn cached_shards(&self) -> usize {
        self.shards.read().len()
    }

    /// Load a package shard, from cache when possible. Packages missing from
    /// the manifest are reported absent even if a stale shard file exists.
    pub fn shard(&self, namespace: Namespace, package: &str) -> Option<Arc<PackageShard>> {
        let key = (namespace, package.to_string());
        if let Some(shard) = self.shards.read().get(&key) {
            return Some(shard.clone());
        }

        let manifest = self.manifest()?;
        if manifest
            .packages(namespace)
            .binary_search_by(|p| p.as_str().cmp(package))
            .is_err()
        {
            return None;
        }

        let shard = absent_on_error(self.persistence.load_shard(namespace, package), "shard")?;
        tracing::debug!("[query] loaded shard {namespace}/{package}");

        let mut shards = self.shards.write();
        Some(shards.entry(key).or_insert_with(|| Arc::new(shard)).clone())
    }

    /// Namespace a qualified name belongs to
    pub fn resolve_namespace(&self, qualified_name: &str) -> Namespace {
        let prefix = self.secondary_prefix.as_str();
        let in_secondary = !prefix.is_empty()
            && (qualified_name == prefix
                || qualified_name
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.')));

        if in_secondary {
            Namespace::Secondary
        } else {
            Namespace::Primary
        }
    }

    /// Case-insensitive substring search over class, field and method names.
    ///
    /// Walks primary then secondary packages in manifest order, classes in
    /// scan order. Stops at the configured limit; there is no ranking.
    pub fn search(&self, query: &str, filter: Option<SymbolKind>) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        let Some(manifest) = self.manifest() else {
            return hits;
        };

        let needle = query.to_lowercase();
        let wants = |kind: SymbolKind| filter.is_none_or(|f| f == kind);

        for (namespace, package) in manifest.all_packages() {
            let Some(shard) = self.shard(namespace, package) else {
                continue;
            };

            for (simple_name, class) in shard.classes.iter() {
                let qualified = qualify(package, simple_name);

                if wants(SymbolKind::Class) && simple_name.to_lowercase().contains(&needle) {
                    hits.push(SearchHit {
                        kind: SymbolKind::Class,
                        qualified_class_name: qualified.clone(),
                        name: simple_name.to_string(),
                        signature: None,
                        source_path: class.source_path.clone(),
                        line_start: None,
                    });
                }

                if wants(SymbolKind::Field) {
                    for field in &class.fields {
                        if field.name.to_lowercase().contains(&needle) {
                            hits.push(SearchHit {
                                kind: SymbolKind::Field,
                                qualified_class_name: qualified.clone(),
                                name: field.name.clone(),
                                signature: Some(format!("{} {}", field.declared_type, field.name)),
                                source_path: class.source_path.clone(),
                                line_start: None,
                            });
                        }
                    }
                }

                if wants(SymbolKind::Method) {
                    for method in &class.methods {
                        if method.name.to_lowercase().contains(&needle) {
                            hits.push(SearchHit {
                                kind: SymbolKind::Method,
                                qualified_class_name: qualified.clone(),
                                name: method.name.clone(),
                                signature: Some(method.signature()),
                                source_path: class.source_path.clone(),
                                line_start: Some(method.line_start),
                            });
                        }
                    }
                }

                if hits.len() >= self.search_limit {
                    hits.truncate(self.search_limit);
                    return hits;
                }
            }
        }

        hits
    }

    /// Classes of a package and all of its sub-packages. The match is
    /// case-insensitive and stops at dots, so `net.minecraft` does not match
    /// `net.minecraftforge`. An empty prefix lists everything.
    pub fn list_classes(&self, package_prefix: &str) -> Vec<ClassSummary> {
        let mut classes = Vec::new();
        let Some(manifest) = self.manifest() else {
            return classes;
        };

        let prefix = package_prefix.trim().to_lowercase();
        for (namespace, package) in manifest.all_packages() {
            if !package_matches(package, &prefix) {
                continue;
            }
            let Some(shard) = self.shard(namespace, package) else {
                continue;
            };
            classes.extend(shard.classes.iter().map(|(simple_name, class)| ClassSummary {
                qualified_name: qualify(package, simple_name),
                simple_name: simple_name.to_string(),
                source_path: class.source_path.clone(),
            }));
        }

        classes
    }

    /// Packages of one namespace, or of both (primary first)
    pub fn list_packages(&self, namespace: Option<Namespace>) -> Vec<PackageEntry> {
        let Some(manifest) = self.manifest() else {
            return Vec::new();
        };

        manifest
            .all_packages()
            .filter(|(ns, _)| namespace.is_none_or(|wanted| wanted == *ns))
            .map(|(namespace, package)| PackageEntry {
                namespace,
                name: package.to_string(),
            })
            .collect()
    }

    /// Declaration and source text of a class
    pub fn get_class(&self, qualified_name: &str) -> Option<ClassView> {
        let namespace = self.resolve_namespace(qualified_name);
        let declaration = self.find_declaration(namespace, qualified_name)?;

        let path = self.source_file(namespace, &declaration.source_path)?;
        let source_text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("[query] cannot read source {}: {e}", path.display());
                return None;
            }
        };

        Some(ClassView {
            qualified_name: qualified_name.to_string(),
            namespace,
            source_path: declaration.source_path.clone(),
            declaration,
            source_text,
        })
    }

    /// One method of a class with `excerpt_context` lines around it.
    ///
    /// The name is matched exactly first, then ASCII case-insensitively. For
    /// overloads the first declared one wins.
    pub fn get_method(&self, qualified_name: &str, method_name: &str) -> Option<MethodView> {
        let class = self.get_class(qualified_name)?;
        let methods = &class.declaration.methods;

        let method = methods
            .iter()
            .find(|m| m.name == method_name)
            .or_else(|| methods.iter().find(|m| m.name.eq_ignore_ascii_case(method_name)))?
            .clone();

        let lines: Vec<&str> = class.source_text.lines().collect();
        let (excerpt_start, excerpt_end) = excerpt_bounds(
            method.line_start,
            method.line_end,
            self.excerpt_context,
            lines.len(),
        );
        let excerpt_text = if excerpt_start <= excerpt_end {
            lines[excerpt_start - 1..excerpt_end].join("\n")
        } else {
            String::new()
        };

        Some(MethodView {
            owning_class: class.qualified_name,
            signature: method.signature(),
            method,
            source_path: class.source_path,
            excerpt_start,
            excerpt_end,
            excerpt_text,
        })
    }

    /// Classes extending or implementing `name`.
    ///
    /// This is a linear scan over every class of every manifest package
    /// (loading all shards), not an indexed reverse lookup. Supertypes are
    /// stored normalized, so `name` is compared as recorded, usually a simple
    /// name.
    pub fn find_hierarchy(&self, name: &str, direction: HierarchyDirection) -> Vec<HierarchyEntry> {
        let mut entries = Vec::new();
        let Some(manifest) = self.manifest() else {
            return entries;
        };

        for (namespace, package) in manifest.all_packages() {
            let Some(shard) = self.shard(namespace, package) else {
                continue;
            };

            for (simple_name, class) in shard.classes.iter() {
                let matches = match direction {
                    HierarchyDirection::Subclasses => class.super_type.as_deref() == Some(name),
                    HierarchyDirection::Implementors => class.interfaces.iter().any(|i| i == name),
                };
                if matches {
                    entries.push(HierarchyEntry {
                        qualified_name: qualify(package, simple_name),
                        source_path: class.source_path.clone(),
                    });
                }
            }
        }

        entries
    }

    fn find_declaration(&self, namespace: Namespace, qualified_name: &str) -> Option<ClassDeclaration> {
        let (package, simple_name) = split_qualified(qualified_name);
        let shard = self.shard(namespace, package)?;
        shard.get(simple_name).cloned()
    }

    fn source_file(&self, namespace: Namespace, source_path: &str) -> Option<PathBuf> {
        let root = match namespace {
            Namespace::Primary => Some(&self.roots.primary),
            Namespace::Secondary => self.roots.secondary.as_ref(),
        }?;
        Some(root.join(source_path))
    }
}

/// `package` equals `prefix` or lies below it (both compared lowercase)
fn package_matches(package: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let package = package.to_lowercase();
    package == prefix
        || package
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// `[line_start - context, line_end + context]` clamped to `1..=line_count`
pub fn excerpt_bounds(
    line_start: usize,
    line_end: usize,
    context: usize,
    line_count: usize,
) -> (usize, usize) {
    let start = line_start.saturating_sub(context).max(1);
    let end = line_end.saturating_add(context).min(line_count);
    (start, end)
}

fn absent_on_error<T>(result: StorageResult<Option<T>>, what: &str) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("[query] treating {what} as absent: {e}");
            None
        }
    }
}
