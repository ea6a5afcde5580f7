//! Hostile agent behavior and combat state machine
//!
//! `Tracking` covers both "target unknown or out of range" and "chasing";
//! the only difference is whether the agent moves. `Dead` is terminal: the
//! agent ignores damage and only counts down to its removal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{EventBus, HitEffect, SimEvent};
use super::player::Target;
use super::scaling::AgentSpec;
use super::timer::{Timer, advance_slot};
use crate::consts::RUNNER_CHASE_MULTIPLIER;
use crate::move_towards;
use crate::tuning::AgentTemplate;

/// Unique identifier assigned to an agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Tracking,
    Attacking,
    Dead,
}

/// Result of [`Agent::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead agent or non-positive amount
    Ignored,
    Wounded { health: i32 },
    Killed,
}

#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    pub position: Vec2,
    spec: AgentSpec,
    health: i32,
    state: AgentState,
    collidable: bool,

    base_detection_radius: f32,
    detection_radius: f32,
    alerted_detection_radius: f32,
    alert_duration: f32,

    attack_range: f32,
    attack_cooldown: f32,
    damage: i32,
    destroy_after_death: f32,
    collider_radius: f32,

    alert: Option<Timer>,
    cooldown: Option<Timer>,
    removal: Option<Timer>,
}

impl Agent {
    /// Build an agent from its rolled spec and the shared template
    pub fn spawn(id: AgentId, position: Vec2, spec: AgentSpec, template: &AgentTemplate) -> Self {
        let base_detection_radius = spec.detection_radius.max(template.min_detection_radius);
        Self {
            id,
            position,
            spec,
            health: spec.max_health,
            state: AgentState::Tracking,
            collidable: true,
            base_detection_radius,
            detection_radius: base_detection_radius,
            alerted_detection_radius: template.alerted_detection_radius,
            alert_duration: template.alert_duration,
            attack_range: template.attack_range,
            attack_cooldown: template.attack_cooldown,
            damage: template.damage,
            destroy_after_death: template.destroy_after_death,
            collider_radius: template.collider_radius,
            alert: None,
            cooldown: None,
            removal: None,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.spec.max_health
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == AgentState::Dead
    }

    /// Dead agents drop out of ray and projectile queries
    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn collider_radius(&self) -> f32 {
        self.collider_radius
    }

    /// Current awareness radius, boosted while alerted
    pub fn detection_radius(&self) -> f32 {
        self.detection_radius
    }

    pub fn base_detection_radius(&self) -> f32 {
        self.base_detection_radius
    }

    pub fn is_alerted(&self) -> bool {
        self.alert.is_some()
    }

    /// Effective chase speed
    pub fn chase_speed(&self) -> f32 {
        if self.spec.runner {
            self.spec.move_speed * RUNNER_CHASE_MULTIPLIER
        } else {
            self.spec.move_speed
        }
    }

    /// Advance timers and run one behavior step against `target`
    ///
    /// Returns true on the tick a dead agent's removal delay runs out.
    pub fn tick(&mut self, dt: f32, target: Option<&mut dyn Target>, events: &mut EventBus) -> bool {
        if self.state == AgentState::Dead {
            return advance_slot(&mut self.removal, dt);
        }

        if advance_slot(&mut self.alert, dt) {
            self.detection_radius = self.base_detection_radius;
            log::debug!("Agent {} alert expired", self.id.get());
        }
        advance_slot(&mut self.cooldown, dt);

        let Some(target) = target else {
            self.state = AgentState::Tracking;
            return false;
        };

        let goal = target.position();
        let distance = self.position.distance(goal);

        if distance <= self.attack_range {
            self.state = AgentState::Attacking;
            if self.cooldown.is_none() {
                self.cooldown = Some(Timer::new(self.attack_cooldown));
                events.publish(SimEvent::AgentAttacked {
                    agent: self.id,
                    damage: self.damage,
                });
                target.take_damage(self.damage, events);
            }
        } else {
            self.state = AgentState::Tracking;
            if distance <= self.detection_radius {
                self.position = move_towards(self.position, goal, self.chase_speed() * dt);
            }
        }

        false
    }

    /// Apply damage; lethal damage moves the agent to `Dead` for good
    ///
    /// Non-positive amounts are ignored like hits on a corpse.
    pub fn take_damage(&mut self, amount: i32, events: &mut EventBus) -> DamageOutcome {
        if self.state == AgentState::Dead || amount <= 0 {
            return DamageOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health <= 0 {
            self.die(events);
            return DamageOutcome::Killed;
        }

        // last hit wins: restart rather than stack
        self.detection_radius = self.alerted_detection_radius;
        self.alert = Some(Timer::new(self.alert_duration));

        let effect = if self.spec.radiated {
            HitEffect::Radiated
        } else {
            HitEffect::Standard
        };
        events.publish(SimEvent::AgentDamaged {
            agent: self.id,
            health: self.health,
            effect,
        });

        DamageOutcome::Wounded {
            health: self.health,
        }
    }

    fn die(&mut self, events: &mut EventBus) {
        self.state = AgentState::Dead;
        self.collidable = false;
        self.alert = None;
        self.cooldown = None;
        self.removal = Some(Timer::new(self.destroy_after_death));
        log::debug!("Agent {} died", self.id.get());
        events.publish(SimEvent::AgentDied { agent: self.id });
    }

    /// Drop every pending timer; called when the agent leaves the scene
    pub fn cancel_timers(&mut self) {
        self.alert = None;
        self.cooldown = None;
        self.removal = None;
    }

    #[cfg(test)]
    pub fn has_pending_timers(&self) -> bool {
        self.alert.is_some() || self.cooldown.is_some() || self.removal.is_some()
    }
}
