//! Horde - a wave-survival encounter simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawn director, agents, damage, events)
//! - `tuning`: Data-driven encounter balance (waves, agent template, weapons)

pub mod sim;
pub mod tuning;

pub use sim::{Encounter, SimEvent, TickInput, tick};
pub use tuning::{AgentTemplate, ConfigError, Tuning, WaveConfig, WeaponTuning};

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Chase speed multiplier applied to runners on top of their spawn-time bonus
    pub const RUNNER_CHASE_MULTIPLIER: f32 = 1.35;

    /// Probability that a hit-scan ray keeps going after striking an agent
    pub const HITSCAN_CONTINUE_CHANCE: f32 = 0.5;
    /// Distance past a struck agent where a continuing ray restarts
    pub const HITSCAN_PENETRATION_OFFSET: f32 = 0.1;
    /// Hard stop for penetration chains against misbehaving ray queries
    pub const HITSCAN_MAX_SEGMENTS: usize = 32;

    /// Extra placement attempts when a candidate lands too close to the player
    pub const SPAWN_PLACEMENT_RETRIES: u32 = 20;
    /// Smallest off-screen margin used when expanding the viewport
    pub const MIN_OFFSCREEN_MARGIN: f32 = 0.1;
    /// Ring radius around the director used when no viewport is known
    pub const FALLBACK_SPAWN_RING_RADIUS: f32 = 10.0;
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Clamp a probability into [0, 1], mapping NaN to 0
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
