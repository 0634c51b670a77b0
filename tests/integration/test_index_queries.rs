//! Query layer over a freshly built index

use crate::common::{settings_with_secondary, write_sample_corpus, write_source};
use classdex::indexing::{CorpusRoots, CorpusVersions, IndexBuilder};
use classdex::query::{HierarchyDirection, IndexSession, QueryService, SymbolKind};
use classdex::types::Namespace;
use classdex::Settings;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn indexed_session(settings: &Arc<Settings>) -> IndexSession {
    IndexBuilder::new(settings.clone())
        .build(
            &CorpusRoots::from_settings(settings),
            &CorpusVersions::from_settings(settings),
            None,
        )
        .unwrap();
    IndexSession::new(settings)
}

fn sample() -> (TempDir, Arc<Settings>, IndexSession) {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with_secondary(temp_dir.path());
    write_sample_corpus(&settings);
    let session = indexed_session(&settings);
    (temp_dir, settings, session)
}

#[test]
fn test_search_by_kind() {
    let (_temp_dir, _settings, session) = sample();

    let classes = session.search("Min", Some(SymbolKind::Class));
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].qualified_class_name, "net.minecraft.client.Minecraft");
    assert_eq!(classes[0].source_path, "net/minecraft/client/Minecraft.java");

    assert!(session.search("Min", Some(SymbolKind::Field)).is_empty());

    let methods = session.search("TICK", Some(SymbolKind::Method));
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "tick");
    assert_eq!(methods[0].line_start, Some(17));
    assert_eq!(methods[0].signature.as_deref(), Some("protected void tick()"));
}

#[test]
fn test_search_spans_both_namespaces_primary_first() {
    let (_temp_dir, _settings, session) = sample();

    let hits = session.search("i", None);
    let first_secondary = hits
        .iter()
        .position(|hit| hit.qualified_class_name.starts_with("net.fabricmc"))
        .unwrap();
    assert!(
        hits[..first_secondary]
            .iter()
            .all(|hit| hit.qualified_class_name.starts_with("net.minecraft"))
    );
}

#[test]
fn test_search_respects_limit() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = crate::common::settings_for(temp_dir.path());
    settings.query.search_limit = 2;
    let settings = Arc::new(settings);
    write_sample_corpus(&settings);
    let session = indexed_session(&settings);

    assert_eq!(session.search("e", None).len(), 2);
}

#[test]
fn test_list_classes_and_packages() {
    let (_temp_dir, _settings, session) = sample();

    let names: Vec<String> = session
        .list_classes("NET.minecraft.entity")
        .into_iter()
        .map(|c| c.qualified_name)
        .collect();
    assert_eq!(
        names,
        [
            "net.minecraft.entity.PlayerEntity",
            "net.minecraft.entity.mob.ZombieEntity"
        ]
    );
    assert!(session.list_classes("net.mine").is_empty());
    assert_eq!(session.list_classes("").len(), 4);

    let secondary = session.list_packages(Some(Namespace::Secondary));
    assert_eq!(secondary.len(), 1);
    assert_eq!(secondary[0].name, "net.fabricmc.api");
    assert_eq!(session.list_packages(None).len(), 4);
}

#[test]
fn test_get_class_reads_source_from_namespace_root() {
    let (_temp_dir, _settings, session) = sample();

    let class = session.get_class("net.minecraft.entity.PlayerEntity").unwrap();
    assert_eq!(class.namespace, Namespace::Primary);
    assert!(class.source_text.contains("extends LivingEntity"));

    let api = session.get_class("net.fabricmc.api.ModInitializer").unwrap();
    assert_eq!(api.namespace, Namespace::Secondary);
    assert_eq!(api.declaration.methods[0].name, "onInitialize");

    assert!(session.get_class("net.minecraft.entity.Missing").is_none());
    assert!(session.get_class("no.such.pkg.Thing").is_none());
}

#[test]
fn test_get_class_missing_source_is_none() {
    let (_temp_dir, settings, session) = sample();
    let primary = settings.resolve(&settings.corpus.primary_root);
    fs::remove_file(primary.join("net/minecraft/entity/PlayerEntity.java")).unwrap();

    assert!(session.get_class("net.minecraft.entity.PlayerEntity").is_none());
}

#[test]
fn test_get_method_excerpt() {
    let (_temp_dir, _settings, session) = sample();

    let view = session
        .get_method("net.minecraft.client.Minecraft", "TICK")
        .unwrap();
    assert_eq!(view.method.name, "tick");
    assert_eq!((view.excerpt_start, view.excerpt_end), (14, 20));
    assert!(view.excerpt_text.starts_with("        tick();"));
    assert!(view.excerpt_text.ends_with('}'));

    assert!(session.get_method("net.minecraft.client.Minecraft", "render").is_none());
}

#[test]
fn test_get_method_excerpt_clamps_to_first_line() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Arc::new(crate::common::settings_for(temp_dir.path()));
    let primary = settings.resolve(&settings.corpus.primary_root);
    write_source(
        &primary,
        "Tiny.java",
        "public class Tiny {\n    public void a() {\n    }\n}\n",
    );
    let session = indexed_session(&settings);

    let view = session.get_method("Tiny", "a").unwrap();
    assert_eq!(view.method.line_start, 2);
    assert_eq!((view.excerpt_start, view.excerpt_end), (1, 4));
    assert!(view.excerpt_text.starts_with("public class Tiny {"));
}

#[test]
fn test_find_hierarchy() {
    let (_temp_dir, _settings, session) = sample();

    let subclasses: Vec<String> = session
        .find_hierarchy("LivingEntity", HierarchyDirection::Subclasses)
        .into_iter()
        .map(|e| e.qualified_name)
        .collect();
    assert_eq!(
        subclasses,
        [
            "net.minecraft.entity.PlayerEntity",
            "net.minecraft.entity.mob.ZombieEntity"
        ]
    );

    let implementors = session.find_hierarchy("Attackable", HierarchyDirection::Implementors);
    assert_eq!(implementors.len(), 1);
    assert_eq!(implementors[0].source_path, "net/minecraft/entity/PlayerEntity.java");

    assert!(
        session
            .find_hierarchy("NoSuchType", HierarchyDirection::Subclasses)
            .is_empty()
    );
}

#[test]
fn test_corrupt_shard_is_treated_as_absent() {
    let (_temp_dir, settings, _session) = sample();
    let shard = settings
        .index_dir()
        .join("primary")
        .join("net.minecraft.client.json");
    fs::write(&shard, "{ truncated").unwrap();

    let session = IndexSession::new(&settings);
    assert!(session.get_class("net.minecraft.client.Minecraft").is_none());
    assert_eq!(session.list_classes("net.minecraft").len(), 2);
}

#[tokio::test]
async fn test_query_service_builds_missing_index() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with_secondary(temp_dir.path());
    write_sample_corpus(&settings);

    let service = QueryService::new(settings.clone());
    let session = service.session().await.unwrap();

    assert!(settings.index_dir().join("manifest.json").is_file());
    assert_eq!(session.list_packages(Some(Namespace::Primary)).len(), 3);
}
