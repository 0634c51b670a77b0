//! Shared fixtures for the integration tests

use classdex::Settings;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const MINECRAFT: &str = r#"package net.minecraft.client;

import java.util.List;

public class Minecraft implements Runnable {
    private int ticks;
    public static final String VERSION = "1.21";

    public Minecraft() {
        this.ticks = 0;
    }

    public void run() {
        tick();
    }

    protected void tick() {
        ticks++;
    }
}
"#;

pub const PLAYER_ENTITY: &str = r#"package net.minecraft.entity;

public class PlayerEntity extends LivingEntity implements Attackable {
    private float health;

    public void attack(Entity target, float amount) {
        target.damage(amount);
    }
}
"#;

pub const ZOMBIE_ENTITY: &str = r#"package net.minecraft.entity.mob;

public class ZombieEntity extends LivingEntity {
    public boolean canPickUpLoot() {
        return true;
    }
}
"#;

pub const FABRIC_API: &str = r#"package net.fabricmc.api;

public interface ModInitializer {
    void onInitialize();
}
"#;

/// Settings rooted at `workspace` with small thread counts
pub fn settings_for(workspace: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.workspace_root = Some(workspace.to_path_buf());
    settings.indexing.parallel_threads = 2;
    settings.corpus.version = "1.21.4".to_string();
    settings
}

/// Same as [`settings_for`] with a secondary tree configured
pub fn settings_with_secondary(workspace: &Path) -> Arc<Settings> {
    let mut settings = settings_for(workspace);
    settings.corpus.secondary_root = Some("sources/secondary".into());
    settings.corpus.secondary_version = Some("0.16.9".to_string());
    Arc::new(settings)
}

pub fn write_source(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// Writes the sample corpus: three primary classes and one secondary
pub fn write_sample_corpus(settings: &Settings) {
    let primary = settings.resolve(&settings.corpus.primary_root);
    write_source(&primary, "net/minecraft/client/Minecraft.java", MINECRAFT);
    write_source(&primary, "net/minecraft/entity/PlayerEntity.java", PLAYER_ENTITY);
    write_source(&primary, "net/minecraft/entity/mob/ZombieEntity.java", ZOMBIE_ENTITY);

    if let Some(secondary) = &settings.corpus.secondary_root {
        let secondary = settings.resolve(secondary);
        write_source(&secondary, "net/fabricmc/api/ModInitializer.java", FABRIC_API);
    }
}
