//! Difficulty scaling and mutation rolls
//!
//! Pure functions of (wave index, config) plus the draws they consume. Waves
//! are 1-based. Draw order per spawn is fixed: runner (always), radiated (from
//! its start wave), tank (from its start wave).

use serde::{Deserialize, Serialize};

use super::dice::Dice;
use crate::clamp01;
use crate::tuning::{AgentTemplate, WaveConfig};

/// Scaled stats and mutation flags for one spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub max_health: i32,
    pub move_speed: f32,
    pub detection_radius: f32,
    pub runner: bool,
    pub radiated: bool,
    pub tank: bool,
    /// Cosmetic scale for the renderer
    pub visual_scale: f32,
}

fn waves_since(wave: u32, start: u32) -> f32 {
    wave.saturating_sub(start) as f32
}

fn growth_exponent(wave: u32) -> i32 {
    wave.saturating_sub(1).min(i32::MAX as u32) as i32
}

/// Agents spawned in `wave`, respecting the per-wave cap
pub fn agents_for_wave(config: &WaveConfig, wave: u32) -> u32 {
    let grown = config.agents_per_wave.saturating_add(
        wave.saturating_sub(1)
            .saturating_mul(config.agents_per_wave_increase),
    );
    if config.max_agents_per_wave > 0 {
        grown.min(config.max_agents_per_wave)
    } else {
        grown
    }
}

pub fn health_multiplier(config: &WaveConfig, wave: u32) -> f32 {
    config.health_multiplier_per_wave.powi(growth_exponent(wave))
}

pub fn speed_multiplier(config: &WaveConfig, wave: u32) -> f32 {
    config.speed_multiplier_per_wave.powi(growth_exponent(wave))
}

pub fn runner_chance(config: &WaveConfig, wave: u32) -> f32 {
    clamp01(config.runner_chance_start + waves_since(wave, 1) * config.runner_chance_increase_per_wave)
}

/// `None` before radiated agents are allowed
pub fn radiated_chance(config: &WaveConfig, wave: u32) -> Option<f32> {
    (wave >= config.radiated_wave_start).then(|| {
        clamp01(
            config.radiated_chance_start
                + waves_since(wave, config.radiated_wave_start)
                    * config.radiated_chance_increase_per_wave,
        )
    })
}

/// `None` before tanks are allowed
pub fn tank_chance(config: &WaveConfig, wave: u32) -> Option<f32> {
    (wave >= config.tank_wave_start).then(|| {
        clamp01(
            config.tank_chance_start
                + waves_since(wave, config.tank_wave_start) * config.tank_chance_increase_per_wave,
        )
    })
}

/// Apply a health multiplier with round-half-to-even, never below 1
pub fn scaled_health(health: i32, multiplier: f32) -> i32 {
    ((health as f32 * multiplier).round_ties_even() as i32).max(1)
}

/// Roll the full spec for one agent spawned in `wave`
pub fn scale_agent(
    config: &WaveConfig,
    template: &AgentTemplate,
    wave: u32,
    dice: &mut dyn Dice,
) -> AgentSpec {
    let mut spec = AgentSpec {
        max_health: scaled_health(template.max_health, health_multiplier(config, wave)),
        move_speed: template.move_speed * speed_multiplier(config, wave),
        detection_radius: template.detection_radius,
        runner: false,
        radiated: false,
        tank: false,
        visual_scale: 1.0,
    };

    if dice.roll() < runner_chance(config, wave) {
        spec.runner = true;
        spec.move_speed *= config.runner_speed_bonus;
        spec.detection_radius *= config.runner_detection_bonus;
    }

    if let Some(chance) = radiated_chance(config, wave) {
        if dice.roll() < chance {
            spec.radiated = true;
            spec.max_health = scaled_health(spec.max_health, config.radiated_health_bonus);
            spec.move_speed *= config.radiated_speed_bonus;
        }
    }

    if let Some(chance) = tank_chance(config, wave) {
        if dice.roll() < chance {
            spec.tank = true;
            spec.max_health = scaled_health(spec.max_health, config.tank_health_bonus);
            spec.move_speed *= config.tank_speed_multiplier;
            spec.visual_scale *= config.tank_scale_multiplier;
        }
    }

    spec
}
