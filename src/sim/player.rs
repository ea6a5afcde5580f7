//! The tracked target
//!
//! Agents only see the target through [`Target`]; the encounter hands them the
//! player each tick instead of letting them search the scene.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{EventBus, SimEvent};
use crate::tuning::PlayerTuning;

/// Something agents can chase and hurt
pub trait Target {
    fn position(&self) -> Vec2;
    fn take_damage(&mut self, amount: i32, events: &mut EventBus);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Moved by the host; the core never drives the player
    pub position: Vec2,
    pub collider_radius: f32,
    health: i32,
    max_health: i32,
    kills: u32,
    dead: bool,
}

impl PlayerState {
    pub fn new(position: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            position,
            collider_radius: tuning.collider_radius,
            health: tuning.max_health,
            max_health: tuning.max_health,
            kills: 0,
            dead: false,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Count an agent death toward the kill counter
    pub fn record_kill(&mut self, events: &mut EventBus) {
        self.kills += 1;
        events.publish(SimEvent::KillCountChanged { kills: self.kills });
    }
}

impl Target for PlayerState {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn take_damage(&mut self, amount: i32, events: &mut EventBus) {
        if self.dead {
            return;
        }

        self.health = self.health.saturating_sub(amount);
        events.publish(SimEvent::PlayerDamaged {
            health: self.health,
        });

        if self.health <= 0 {
            self.dead = true;
            log::info!("Player died with {} kills", self.kills);
            events.publish(SimEvent::PlayerDied);
        }
    }
}
