//! Authored game data: archetype catalog + ordered level list.
//!
//! Loaded from RON (`assets/data/game.ron`). `GameConfig::default()` mirrors
//! the shipped file so the game still runs when the file is missing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading authored game data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("level {level} references unknown {kind} archetype '{name}'")]
    UnknownArchetype { level: usize, kind: &'static str, name: String },

    #[error("boss '{boss}' reinforces with unknown enemy archetype '{name}'")]
    UnknownReinforcement { boss: String, name: String },

    #[error("boss '{boss}' notify_delay must not exceed its death_delay")]
    NotifyAfterRemoval { boss: String },

    #[error("{owner} references unknown projectile '{name}'")]
    UnknownProjectile { owner: String, name: String },

    #[error("player weapon has no tiers")]
    EmptyWeaponTiers,

    #[error("no levels configured")]
    NoLevels,
}

/// Optional audio clip ids. Absent clips are skipped at runtime.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Sounds {
    pub shoot: Option<String>,
    pub hit: Option<String>,
    pub explosion: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectileArchetype {
    pub speed: f32,
    pub damage: u32,
    pub ttl: f32,
    pub radius: f32,
}

/// One step of the player's weapon upgrade ladder.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WeaponTier {
    pub projectile: String,
    pub shots: u32,
    /// Total fan angle in degrees across all shots of one trigger pull.
    #[serde(default)]
    pub spread_deg: f32,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PlayerArchetype {
    pub max_lives: u32,
    pub speed: f32,
    pub shoot_delay: f32,
    pub invincibility: f32,
    pub blink_interval: f32,
    pub death_delay: f32,
    pub radius: f32,
    pub weapon_tiers: Vec<WeaponTier>,
    #[serde(default)]
    pub sounds: Sounds,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EnemyArchetype {
    pub max_hp: u32,
    pub speed: f32,
    pub retarget_interval: f32,
    pub wander_range: f32,
    pub shoot_cooldown: f32,
    pub projectile: Option<String>,
    pub score: u32,
    pub invincibility: f32,
    pub death_delay: f32,
    pub radius: f32,
    #[serde(default)]
    pub sounds: Sounds,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BossArchetype {
    pub max_hp: u32,
    pub speed: f32,
    pub retarget_interval: f32,
    pub shoot_cooldown: f32,
    pub first_shot_delay: f32,
    pub volley_delay: f32,
    /// Gun offsets relative to the boss centre.
    pub mounts: Vec<(f32, f32)>,
    pub projectile: Option<String>,
    /// Enemy archetypes spawned, one of each, every reinforcement interval.
    #[serde(default)]
    pub reinforcements: Vec<String>,
    pub reinforcement_interval: f32,
    pub max_reinforcements: u32,
    pub score: u32,
    pub invincibility: f32,
    /// Delay between the death transition and the orchestrator notification.
    pub notify_delay: f32,
    pub death_delay: f32,
    pub radius: f32,
    #[serde(default)]
    pub sounds: Sounds,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DropArchetype {
    pub lifetime: f32,
    pub blink_time: f32,
    pub blink_interval: f32,
    pub radius: f32,
    #[serde(default)]
    pub pickup_sound: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Catalog {
    pub player: PlayerArchetype,
    pub enemies: BTreeMap<String, EnemyArchetype>,
    pub bosses: BTreeMap<String, BossArchetype>,
    pub projectiles: BTreeMap<String, ProjectileArchetype>,
    #[serde(default)]
    pub drop: Option<DropArchetype>,
}

impl Catalog {
    pub fn enemy(&self, name: &str) -> Option<&EnemyArchetype> {
        self.enemies.get(name)
    }

    pub fn boss(&self, name: &str) -> Option<&BossArchetype> {
        self.bosses.get(name)
    }

    pub fn projectile(&self, name: &str) -> Option<&ProjectileArchetype> {
        self.projectiles.get(name)
    }
}

/// One authored wave. The ordinal index is the position in `GameConfig::levels`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WaveConfig {
    /// Enemy archetypes, cycled through until `enemy_count` are spawned.
    pub enemies: Vec<String>,
    pub enemy_count: u32,
    #[serde(default)]
    pub boss: Option<String>,
}

impl WaveConfig {
    #[inline]
    pub fn is_boss_level(&self) -> bool {
        self.boss.is_some()
    }
}

#[derive(Resource, Deserialize, Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub catalog: Catalog,
    pub levels: Vec<WaveConfig>,
}

impl GameConfig {
    pub fn from_ron_str(path: &str, text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        Self::from_ron_str(&shown, &text)
    }

    /// Load from disk, falling back to the built-in data on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Using built-in game data: {e}");
                Self::default()
            }
        }
    }

    pub fn level(&self, index: usize) -> Option<&WaveConfig> {
        self.levels.get(index)
    }

    /// Check every cross reference once, at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = &self.catalog;

        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        if catalog.player.weapon_tiers.is_empty() {
            return Err(ConfigError::EmptyWeaponTiers);
        }

        let check_projectile = |owner: &str, name: &str| {
            if catalog.projectile(name).is_some() {
                Ok(())
            } else {
                Err(ConfigError::UnknownProjectile { owner: owner.to_string(), name: name.to_string() })
            }
        };

        for tier in &catalog.player.weapon_tiers {
            check_projectile("player", &tier.projectile)?;
        }
        for (name, enemy) in &catalog.enemies {
            if let Some(p) = &enemy.projectile {
                check_projectile(name, p)?;
            }
        }
        for (name, boss) in &catalog.bosses {
            if let Some(p) = &boss.projectile {
                check_projectile(name, p)?;
            }
            if let Some(r) = boss.reinforcements.iter().find(|r| catalog.enemy(r).is_none()) {
                return Err(ConfigError::UnknownReinforcement { boss: name.clone(), name: r.clone() });
            }
            // The defeat notice is owned by the boss and dies with it.
            if boss.notify_delay > boss.death_delay {
                return Err(ConfigError::NotifyAfterRemoval { boss: name.clone() });
            }
        }

        for (level, wave) in self.levels.iter().enumerate() {
            for name in &wave.enemies {
                if catalog.enemy(name).is_none() {
                    return Err(ConfigError::UnknownArchetype { level, kind: "enemy", name: name.clone() });
                }
            }
            if let Some(boss) = &wave.boss
                && catalog.boss(boss).is_none()
            {
                return Err(ConfigError::UnknownArchetype { level, kind: "boss", name: boss.clone() });
            }
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let sounds = |shoot: &str| Sounds {
            shoot: Some(shoot.into()),
            hit: Some("hit".into()),
            explosion: Some("explosion".into()),
        };

        let projectiles = BTreeMap::from([
            ("bolt".to_string(), ProjectileArchetype { speed: 8.0, damage: 1, ttl: 2.0, radius: 0.08 }),
            ("heavy_bolt".to_string(), ProjectileArchetype { speed: 9.0, damage: 2, ttl: 2.0, radius: 0.1 }),
            ("enemy_bolt".to_string(), ProjectileArchetype { speed: 5.0, damage: 1, ttl: 3.0, radius: 0.08 }),
            ("boss_shell".to_string(), ProjectileArchetype { speed: 5.0, damage: 2, ttl: 5.0, radius: 0.12 }),
        ]);

        let player = PlayerArchetype {
            max_lives: 5,
            speed: 4.0,
            shoot_delay: 0.1,
            invincibility: 2.0,
            blink_interval: 0.1,
            death_delay: 1.0,
            radius: 0.3,
            weapon_tiers: vec![
                WeaponTier { projectile: "bolt".into(), shots: 1, spread_deg: 0.0 },
                WeaponTier { projectile: "heavy_bolt".into(), shots: 1, spread_deg: 0.0 },
                WeaponTier { projectile: "heavy_bolt".into(), shots: 3, spread_deg: 20.0 },
            ],
            sounds: Sounds { shoot: Some("player_shoot".into()), hit: Some("player_hit".into()), explosion: Some("explosion".into()) },
        };

        let enemies = BTreeMap::from([
            (
                "scout".to_string(),
                EnemyArchetype {
                    max_hp: 3,
                    speed: 3.0,
                    retarget_interval: 2.0,
                    wander_range: 3.0,
                    shoot_cooldown: 2.0,
                    projectile: Some("enemy_bolt".into()),
                    score: 10,
                    invincibility: 0.1,
                    death_delay: 0.5,
                    radius: 0.3,
                    sounds: sounds("enemy_shoot"),
                },
            ),
            (
                "brute".to_string(),
                EnemyArchetype {
                    max_hp: 6,
                    speed: 2.0,
                    retarget_interval: 2.5,
                    wander_range: 2.0,
                    shoot_cooldown: 2.5,
                    projectile: Some("enemy_bolt".into()),
                    score: 25,
                    invincibility: 0.1,
                    death_delay: 0.5,
                    radius: 0.4,
                    sounds: sounds("enemy_shoot"),
                },
            ),
        ]);

        let bosses = BTreeMap::from([(
            "warden".to_string(),
            BossArchetype {
                max_hp: 20,
                speed: 2.0,
                retarget_interval: 3.0,
                shoot_cooldown: 3.0,
                first_shot_delay: 1.0,
                volley_delay: 0.3,
                mounts: vec![(-0.8, -0.6), (0.0, -0.8), (0.8, -0.6)],
                projectile: Some("boss_shell".into()),
                reinforcements: vec!["scout".into()],
                reinforcement_interval: 5.0,
                max_reinforcements: 5,
                score: 200,
                invincibility: 0.1,
                notify_delay: 0.5,
                death_delay: 1.0,
                radius: 0.9,
                sounds: sounds("boss_shoot"),
            },
        )]);

        let drop = Some(DropArchetype {
            lifetime: 2.0,
            blink_time: 1.0,
            blink_interval: 0.2,
            radius: 0.25,
            pickup_sound: Some("pickup".into()),
        });

        let levels = vec![
            WaveConfig { enemies: vec!["scout".into()], enemy_count: 3, boss: None },
            WaveConfig { enemies: vec!["scout".into(), "brute".into()], enemy_count: 5, boss: None },
            WaveConfig { enemies: vec!["scout".into(), "brute".into()], enemy_count: 4, boss: Some("warden".into()) },
        ];

        Self {
            catalog: Catalog { player, enemies, bosses, projectiles, drop },
            levels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_data_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn unknown_enemy_is_rejected() {
        let mut config = GameConfig::default();
        config.levels[1].enemies.push("ghost".into());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownArchetype { level: 1, kind: "enemy", .. }));
    }

    #[test]
    fn unknown_boss_is_rejected() {
        let mut config = GameConfig::default();
        config.levels[0].boss = Some("nobody".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownArchetype { level: 0, kind: "boss", .. })
        ));
    }

    #[test]
    fn empty_weapon_ladder_is_rejected() {
        let mut config = GameConfig::default();
        config.catalog.player.weapon_tiers.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyWeaponTiers)));
    }

    #[test]
    fn boss_notice_after_removal_is_rejected() {
        let mut config = GameConfig::default();
        if let Some(boss) = config.catalog.bosses.get_mut("warden") {
            boss.notify_delay = 2.0;
        }
        assert!(matches!(config.validate(), Err(ConfigError::NotifyAfterRemoval { .. })));
    }

    #[test]
    fn unknown_reinforcement_is_rejected() {
        let mut config = GameConfig::default();
        if let Some(boss) = config.catalog.bosses.get_mut("warden") {
            boss.reinforcements.push("ghost".into());
        }
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownReinforcement { name, .. }) if name == "ghost"
        ));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = GameConfig::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_ron_reports_parse_error() {
        let err = GameConfig::from_ron_str("inline", "(catalog: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn boss_level_flag_follows_boss_field() {
        let config = GameConfig::default();
        assert!(!config.levels[0].is_boss_level());
        assert!(config.levels[2].is_boss_level());
    }
}
