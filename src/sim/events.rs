//! Events raised to external collaborators
//!
//! Rendering, audio, UI and scene loading never reach into the simulation.
//! They either drain the pending queue after each tick or subscribe an
//! observer that sees every event as it is published.

use std::fmt;

use glam::Vec2;

use super::agent::AgentId;
use super::damage::{DamageEvent, ProjectileId};
use super::scaling::AgentSpec;

/// Which hit-effect set the VFX layer should use for a non-lethal hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitEffect {
    Standard,
    Radiated,
}

/// Everything observable that happens during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A new wave began; `agents` is the number it will spawn
    WaveStarted { wave: u32, agents: u32 },
    AgentSpawned {
        agent: AgentId,
        spec: AgentSpec,
        position: Vec2,
    },
    /// An agent swung at its target (animation trigger)
    AgentAttacked { agent: AgentId, damage: i32 },
    /// Non-lethal damage taken
    AgentDamaged {
        agent: AgentId,
        health: i32,
        effect: HitEffect,
    },
    /// Every landed hit, lethal or not, with its source and delivery kind
    DamageDealt(DamageEvent),
    AgentDied { agent: AgentId },
    /// The agent left the live set (corpse cleanup or despawn)
    AgentRemoved { agent: AgentId },
    /// A finite wave list finished and names the level to load next
    LevelCompleted { next_level: String },
    /// Hit-scan trace from the muzzle through every struck point
    ShotTraced { points: Vec<Vec2> },
    ProjectileLaunched {
        projectile: ProjectileId,
        position: Vec2,
        velocity: Vec2,
    },
    /// `impact` is set when the projectile struck something
    ProjectileRemoved {
        projectile: ProjectileId,
        impact: Option<Vec2>,
    },
    PlayerDamaged { health: i32 },
    PlayerDied,
    KillCountChanged { kills: u32 },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Observer = Box<dyn FnMut(&SimEvent)>;

/// Pending event queue plus the observer registry
#[derive(Default)]
pub struct EventBus {
    pending: Vec<SimEvent>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify observers in subscription order, then queue the event
    pub fn publish(&mut self, event: SimEvent) {
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
        self.pending.push(event);
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SimEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Events published since the last drain
    pub fn pending(&self) -> &[SimEvent] {
        &self.pending
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
