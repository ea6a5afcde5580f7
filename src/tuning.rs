//! Data-driven encounter balance
//!
//! Everything here is loaded once before the director starts. Missing JSON
//! keys fall back to the authored defaults, so a tuning file only needs to
//! list what it changes.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clamp01;

/// Errors raised while loading or validating tuning data
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The director was started without a wave configuration
    #[error("no wave configuration supplied")]
    Missing,
    /// The tuning file could not be read
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The tuning file is not valid JSON for [`Tuning`]
    #[error("malformed tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the simulation cannot run with
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a positive number, got {value}"),
        })
    }
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a non-negative number, got {value}"),
        })
    }
}

/// Wave progression, spawn placement and mutation tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    // === Spawn placement ===
    /// How far outside the visible viewport agents appear
    pub offscreen_spawn_margin: f32,
    /// Off-screen candidates closer than this to the player are re-rolled
    pub min_spawn_distance_from_player: f32,
    /// Designer-authored spawn points; when non-empty they replace off-screen placement
    pub spawn_points: Vec<Vec2>,

    // === Waves ===
    /// Number of waves (0 = infinite)
    pub wave_count: u32,
    pub agents_per_wave: u32,
    pub agents_per_wave_increase: u32,
    /// Per-wave cap (0 = no cap)
    pub max_agents_per_wave: u32,
    /// Live population cap (0 = uncapped)
    pub max_alive_at_once: u32,

    // === Timing (seconds) ===
    pub time_before_first_wave: f32,
    pub time_between_spawns: f32,
    pub time_between_waves: f32,

    // === Difficulty scaling ===
    pub health_multiplier_per_wave: f32,
    pub speed_multiplier_per_wave: f32,

    // === Runners ===
    pub runner_chance_start: f32,
    pub runner_chance_increase_per_wave: f32,
    pub runner_speed_bonus: f32,
    pub runner_detection_bonus: f32,

    // === Radiated mutation ===
    /// First wave (1-based) where radiated agents can appear
    pub radiated_wave_start: u32,
    pub radiated_chance_start: f32,
    pub radiated_chance_increase_per_wave: f32,
    pub radiated_health_bonus: f32,
    pub radiated_speed_bonus: f32,

    // === Tank mutation ===
    /// First wave (1-based) where tanks can appear
    pub tank_wave_start: u32,
    pub tank_chance_start: f32,
    pub tank_chance_increase_per_wave: f32,
    pub tank_health_bonus: f32,
    pub tank_speed_multiplier: f32,
    /// Cosmetic only, passed through to the renderer
    pub tank_scale_multiplier: f32,

    // === Level flow ===
    /// Level to load once a finite wave list is exhausted
    pub next_level: Option<String>,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            offscreen_spawn_margin: 2.0,
            min_spawn_distance_from_player: 6.0,
            spawn_points: Vec::new(),

            wave_count: 0,
            agents_per_wave: 8,
            agents_per_wave_increase: 3,
            max_agents_per_wave: 0,
            max_alive_at_once: 12,

            time_before_first_wave: 1.0,
            time_between_spawns: 0.5,
            time_between_waves: 2.5,

            health_multiplier_per_wave: 1.10,
            speed_multiplier_per_wave: 1.05,

            runner_chance_start: 0.05,
            runner_chance_increase_per_wave: 0.03,
            runner_speed_bonus: 1.35,
            runner_detection_bonus: 1.25,

            radiated_wave_start: 3,
            radiated_chance_start: 0.10,
            radiated_chance_increase_per_wave: 0.03,
            radiated_health_bonus: 1.25,
            radiated_speed_bonus: 1.10,

            tank_wave_start: 5,
            tank_chance_start: 0.08,
            tank_chance_increase_per_wave: 0.02,
            tank_health_bonus: 2.0,
            tank_speed_multiplier: 0.75,
            tank_scale_multiplier: 1.25,

            next_level: None,
        }
    }
}

impl WaveConfig {
    /// Check that every timing is usable and every multiplier is positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("offscreen_spawn_margin", self.offscreen_spawn_margin)?;
        require_non_negative(
            "min_spawn_distance_from_player",
            self.min_spawn_distance_from_player,
        )?;
        if let Some(point) = self.spawn_points.iter().find(|p| !p.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "spawn_points",
                reason: format!("non-finite spawn point {point}"),
            });
        }

        require_non_negative("time_before_first_wave", self.time_before_first_wave)?;
        require_non_negative("time_between_spawns", self.time_between_spawns)?;
        require_non_negative("time_between_waves", self.time_between_waves)?;

        require_positive("health_multiplier_per_wave", self.health_multiplier_per_wave)?;
        require_positive("speed_multiplier_per_wave", self.speed_multiplier_per_wave)?;
        require_positive("runner_speed_bonus", self.runner_speed_bonus)?;
        require_positive("runner_detection_bonus", self.runner_detection_bonus)?;
        require_positive("radiated_health_bonus", self.radiated_health_bonus)?;
        require_positive("radiated_speed_bonus", self.radiated_speed_bonus)?;
        require_positive("tank_health_bonus", self.tank_health_bonus)?;
        require_positive("tank_speed_multiplier", self.tank_speed_multiplier)?;
        require_positive("tank_scale_multiplier", self.tank_scale_multiplier)?;

        let chances = [
            ("runner_chance_start", self.runner_chance_start),
            ("runner_chance_increase_per_wave", self.runner_chance_increase_per_wave),
            ("radiated_chance_start", self.radiated_chance_start),
            ("radiated_chance_increase_per_wave", self.radiated_chance_increase_per_wave),
            ("tank_chance_start", self.tank_chance_start),
            ("tank_chance_increase_per_wave", self.tank_chance_increase_per_wave),
        ];
        for (field, value) in chances {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a finite probability, got {value}"),
                });
            }
        }

        Ok(())
    }

    /// Clamp base chances into [0, 1], warning about each field that moved
    pub fn sanitized(mut self) -> Self {
        for (field, value) in [
            ("runner_chance_start", &mut self.runner_chance_start),
            ("radiated_chance_start", &mut self.radiated_chance_start),
            ("tank_chance_start", &mut self.tank_chance_start),
        ] {
            let clamped = clamp01(*value);
            if clamped != *value {
                log::warn!("{field} = {} clamped to {clamped}", *value);
                *value = clamped;
            }
        }
        self
    }

    /// Next level identifier, if one is configured and not blank
    pub fn next_level(&self) -> Option<&str> {
        self.next_level
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Base stats every spawned agent starts from before wave scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTemplate {
    pub max_health: i32,
    /// Units per second
    pub move_speed: f32,
    pub detection_radius: f32,
    /// Detection radius while alerted by damage
    pub alerted_detection_radius: f32,
    /// Seconds an alert lasts after the most recent hit
    pub alert_duration: f32,
    /// Base detection radius never drops below this
    pub min_detection_radius: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub damage: i32,
    /// Seconds a corpse stays in the scene before removal
    pub destroy_after_death: f32,
    pub collider_radius: f32,
}

impl Default for AgentTemplate {
    fn default() -> Self {
        Self {
            max_health: 10,
            move_speed: 2.0,
            detection_radius: 5.0,
            alerted_detection_radius: 15.0,
            alert_duration: 3.0,
            min_detection_radius: 5.0,
            attack_range: 1.0,
            attack_cooldown: 1.0,
            damage: 1,
            destroy_after_death: 3.0,
            collider_radius: 0.3,
        }
    }
}

impl AgentTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_health < 1 {
            return Err(ConfigError::Invalid {
                field: "max_health",
                reason: format!("expected at least 1, got {}", self.max_health),
            });
        }
        require_non_negative("move_speed", self.move_speed)?;
        require_non_negative("detection_radius", self.detection_radius)?;
        require_non_negative("alerted_detection_radius", self.alerted_detection_radius)?;
        require_non_negative("alert_duration", self.alert_duration)?;
        require_non_negative("min_detection_radius", self.min_detection_radius)?;
        require_non_negative("attack_range", self.attack_range)?;
        require_non_negative("attack_cooldown", self.attack_cooldown)?;
        require_non_negative("destroy_after_death", self.destroy_after_death)?;
        require_non_negative("collider_radius", self.collider_radius)?;
        Ok(())
    }
}

/// Player weapon tunables for both damage delivery mechanisms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    /// Damage per tick while the hit-scan trigger is held
    pub hitscan_damage: i32,
    pub hitscan_max_distance: f32,
    pub projectile_speed: f32,
    pub projectile_damage: i32,
    /// Seconds before an unspent projectile removes itself
    pub projectile_lifetime: f32,
    /// Distance in front of the player where projectiles appear
    pub muzzle_offset: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            hitscan_damage: 1,
            hitscan_max_distance: 10.0,
            projectile_speed: 10.0,
            projectile_damage: 5,
            projectile_lifetime: 1.5,
            muzzle_offset: 0.35,
        }
    }
}

/// Player stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: i32,
    pub collider_radius: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            collider_radius: 0.3,
        }
    }
}

/// Complete tuning set for one encounter
///
/// `wave` and `agent` are optional: a tuning file may set them to `null` to
/// describe a level with no director or no spawnable agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub wave: Option<WaveConfig>,
    pub agent: Option<AgentTemplate>,
    pub weapon: WeaponTuning,
    pub player: PlayerTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            wave: Some(WaveConfig::default()),
            agent: Some(AgentTemplate::default()),
            weapon: WeaponTuning::default(),
            player: PlayerTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse, validate and sanitize a JSON tuning document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validated()
    }

    /// Load a JSON tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if let Some(wave) = self.wave.take() {
            wave.validate()?;
            self.wave = Some(wave.sanitized());
        }
        if let Some(agent) = &self.agent {
            agent.validate()?;
        }
        require_positive("hitscan_max_distance", self.weapon.hitscan_max_distance)?;
        require_non_negative("projectile_speed", self.weapon.projectile_speed)?;
        require_non_negative("projectile_lifetime", self.weapon.projectile_lifetime)?;
        if self.player.max_health < 1 {
            return Err(ConfigError::Invalid {
                field: "player.max_health",
                reason: format!("expected at least 1, got {}", self.player.max_health),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json_str(r#"{ "wave": { "wave_count": 2 } }"#).unwrap();
        let wave = tuning.wave.unwrap();
        assert_eq!(wave.wave_count, 2);
        assert_eq!(wave.agents_per_wave, 8);
        assert_eq!(tuning.agent, Some(AgentTemplate::default()));
    }

    #[test]
    fn test_null_wave_means_missing() {
        let tuning = Tuning::from_json_str(r#"{ "wave": null }"#).unwrap();
        assert!(tuning.wave.is_none());
    }

    #[test]
    fn test_spawn_points_parse_as_pairs() {
        let tuning =
            Tuning::from_json_str(r#"{ "wave": { "spawn_points": [[1.0, 2.0], [-3.0, 4.5]] } }"#)
                .unwrap();
        let points = tuning.wave.unwrap().spawn_points;
        assert_eq!(points, vec![Vec2::new(1.0, 2.0), Vec2::new(-3.0, 4.5)]);
    }

    #[test]
    fn test_chance_start_is_clamped() {
        let tuning = Tuning::from_json_str(
            r#"{ "wave": { "runner_chance_start": 1.7, "tank_chance_start": -0.2 } }"#,
        )
        .unwrap();
        let wave = tuning.wave.unwrap();
        assert_eq!(wave.runner_chance_start, 1.0);
        assert_eq!(wave.tank_chance_start, 0.0);
    }

    #[test]
    fn test_non_positive_multiplier_rejected() {
        let err = Tuning::from_json_str(r#"{ "wave": { "health_multiplier_per_wave": 0.0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "health_multiplier_per_wave",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_timing_rejected() {
        let err =
            Tuning::from_json_str(r#"{ "wave": { "time_between_spawns": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = Tuning::from_json_str("{ wave: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_blank_next_level_is_ignored() {
        let mut wave = WaveConfig::default();
        assert_eq!(wave.next_level(), None);
        wave.next_level = Some("   ".to_string());
        assert_eq!(wave.next_level(), None);
        wave.next_level = Some("Level2".to_string());
        assert_eq!(wave.next_level(), Some("Level2"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
