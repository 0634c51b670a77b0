//! Index builds over a real directory tree

use crate::common::{settings_for, settings_with_secondary, write_sample_corpus, write_source};
use classdex::indexing::{CorpusRoots, CorpusVersions, IndexBuilder};
use classdex::storage::IndexPersistence;
use classdex::types::Namespace;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn build(settings: &Arc<classdex::Settings>) -> classdex::BuildSummary {
    let builder = IndexBuilder::new(settings.clone());
    builder
        .build(
            &CorpusRoots::from_settings(settings),
            &CorpusVersions::from_settings(settings),
            None,
        )
        .unwrap()
}

#[test]
fn test_build_writes_shards_and_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with_secondary(temp_dir.path());
    write_sample_corpus(&settings);

    let summary = build(&settings);
    assert_eq!(summary.class_count, 4);
    assert_eq!(summary.packages_indexed, 4);
    assert_eq!(summary.files_skipped, 0);

    let persistence = IndexPersistence::new(settings.index_dir());
    let manifest = persistence.load_manifest().unwrap().unwrap();
    assert_eq!(manifest.corpus_version, "1.21.4");
    assert_eq!(manifest.secondary_corpus_version.as_deref(), Some("0.16.9"));
    assert_eq!(
        manifest.packages(Namespace::Primary),
        [
            "net.minecraft.client",
            "net.minecraft.entity",
            "net.minecraft.entity.mob"
        ]
    );
    assert_eq!(manifest.packages(Namespace::Secondary), ["net.fabricmc.api"]);

    let shard = persistence
        .load_shard(Namespace::Primary, "net.minecraft.entity")
        .unwrap()
        .unwrap();
    let player = shard.get("PlayerEntity").unwrap();
    assert_eq!(player.super_type.as_deref(), Some("LivingEntity"));
    assert_eq!(player.interfaces, ["Attackable"]);
    assert_eq!(player.source_path, "net/minecraft/entity/PlayerEntity.java");
    assert_eq!(player.methods[0].parameters.len(), 2);

    assert!(
        settings
            .index_dir()
            .join("secondary")
            .join("net.fabricmc.api.json")
            .is_file()
    );
}

#[test]
fn test_rebuild_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_with_secondary(temp_dir.path());
    write_sample_corpus(&settings);

    let shard_path = settings
        .index_dir()
        .join("primary")
        .join("net.minecraft.client.json");

    build(&settings);
    let first = fs::read(&shard_path).unwrap();
    build(&settings);
    let second = fs::read(&shard_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_shard_json_shape() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Arc::new(settings_for(temp_dir.path()));
    write_sample_corpus(&settings);
    build(&settings);

    let text = fs::read_to_string(
        settings
            .index_dir()
            .join("primary")
            .join("net.minecraft.client.json"),
    )
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(json["package"], "net.minecraft.client");
    let class = &json["classes"]["Minecraft"];
    assert_eq!(class["kind"], "class");
    assert!(class["super"].is_null());
    assert_eq!(class["interfaces"][0], "Runnable");
    assert_eq!(class["fields"][0]["name"], "ticks");
    assert_eq!(class["fields"][0]["type"], "int");
    assert_eq!(class["fields"][0]["modifiers"][0], "private");
    assert_eq!(class["methods"][0]["name"], "run");
    assert_eq!(class["methods"][0]["returnType"], "void");
    assert_eq!(class["methods"][0]["lineStart"], 13);
    assert_eq!(class["methods"][0]["lineEnd"], 15);
}

#[test]
fn test_default_package_and_skipped_files() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Arc::new(settings_for(temp_dir.path()));
    let primary = settings.resolve(&settings.corpus.primary_root);
    write_source(&primary, "Main.java", "public class Main {\n}\n");
    write_source(&primary, "package-info.java", "package net.minecraft;\n");
    fs::write(primary.join("Broken.java"), [0xff, 0xfe, 0x00]).unwrap();

    let summary = build(&settings);
    assert_eq!(summary.class_count, 1);
    assert_eq!(summary.files_scanned, 3);
    assert_eq!(summary.files_skipped, 2);

    let persistence = IndexPersistence::new(settings.index_dir());
    let shard = persistence
        .load_shard(Namespace::Primary, "default")
        .unwrap()
        .unwrap();
    assert!(shard.get("Main").is_some());
}

#[test]
fn test_missing_root_builds_empty_index() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Arc::new(settings_for(temp_dir.path()));

    let summary = build(&settings);
    assert_eq!(summary.class_count, 0);

    let manifest = IndexPersistence::new(settings.index_dir())
        .load_manifest()
        .unwrap()
        .unwrap();
    assert_eq!(manifest.package_count(), 0);
}
