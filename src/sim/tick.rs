//! Fixed timestep simulation tick
//!
//! Advances an encounter deterministically: director, agents, player fire,
//! projectiles, in that order.

use glam::Vec2;

use super::state::Encounter;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Aim direction from the player; zero disables both weapons
    pub aim: Vec2,
    /// Hit-scan trigger held
    pub fire_hitscan: bool,
    /// Projectile trigger pressed this tick
    pub fire_projectile: bool,
}

/// Advance the encounter by one fixed timestep
pub fn tick(encounter: &mut Encounter, input: &TickInput, dt: f32) {
    encounter.time_ticks += 1;

    if let Some(request) = encounter
        .director
        .tick(dt, &encounter.population, &mut encounter.events)
    {
        encounter.spawn_agent(request.wave);
    }

    encounter.step_agents(dt);

    if input.fire_hitscan {
        encounter.fire_hitscan(input.aim);
    }
    if input.fire_projectile {
        encounter.launch_projectile(input.aim);
    }

    encounter.step_projectiles(dt);
    encounter.normalize_order();
}
