//! Deterministic simulation module
//!
//! All encounter logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded dice only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or scene-loading dependencies

pub mod agent;
pub mod collision;
pub mod damage;
pub mod dice;
pub mod director;
pub mod events;
pub mod player;
pub mod population;
pub mod scaling;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;

pub use agent::{Agent, AgentId, AgentState, DamageOutcome};
pub use collision::{Collider, Obstacle, PhysicsQuery, RayHit, SceneColliders};
pub use damage::{DamageEvent, DamageKind, DamageSource, HitScan, Projectile, ProjectileId, resolve_hitscan};
pub use dice::{Dice, SequenceDice};
pub use director::{DirectorPhase, SpawnDirector, SpawnRequest};
pub use events::{EventBus, HitEffect, SimEvent, SubscriptionId};
pub use player::{PlayerState, Target};
pub use population::PopulationTracker;
pub use scaling::{AgentSpec, scale_agent};
pub use spawn::{Rect, SpawnSite, Viewport, select_spawn_point};
pub use state::Encounter;
pub use tick::{TickInput, tick};
pub use timer::Timer;
