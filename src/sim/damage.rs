//! Damage delivery: instant hit-scan and travelling projectiles
//!
//! Neither path touches agents directly. Hit-scan reports each landed hit to a
//! callback, and a projectile step reports what it struck; the encounter turns
//! both into [`DamageEvent`]s applied through one code path.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::agent::AgentId;
use super::collision::{Collider, PhysicsQuery};
use super::dice::Dice;
use super::timer::Timer;
use crate::consts::{HITSCAN_CONTINUE_CHANCE, HITSCAN_MAX_SEGMENTS, HITSCAN_PENETRATION_OFFSET};
use crate::tuning::WeaponTuning;

/// Unique identifier assigned to a projectile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Delivery mechanism, for VFX selection only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    HitScan,
    Projectile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Player,
    Projectile(ProjectileId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub source: DamageSource,
    pub target: AgentId,
    pub amount: i32,
    pub kind: DamageKind,
}

/// One hit-scan trigger pull
#[derive(Debug, Clone, Copy)]
pub struct HitScan {
    pub origin: Vec2,
    pub dir: Vec2,
    pub max_distance: f32,
    pub damage: i32,
}

/// Trace a hit-scan ray, penetrating agents at random
///
/// Each agent struck takes `damage` and the ray then continues with
/// probability [`HITSCAN_CONTINUE_CHANCE`], restarting a short way past the
/// hit point with the full range again. Anything that is not an agent stops
/// the ray. Trigger colliders are ignored.
///
/// Returns the traced points starting at the origin; the last point is the
/// final hit, or the end of the range on a miss. A zero direction traces
/// nothing.
pub fn resolve_hitscan(
    shot: &HitScan,
    query: &dyn PhysicsQuery,
    dice: &mut dyn Dice,
    apply: &mut dyn FnMut(DamageEvent),
) -> Vec<Vec2> {
    let dir = shot.dir.normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }

    let mut points = vec![shot.origin];
    let mut from = shot.origin;

    for _ in 0..HITSCAN_MAX_SEGMENTS {
        let hit = query
            .raycast_all(from, dir, shot.max_distance)
            .into_iter()
            .find(|hit| !hit.collider.is_trigger());

        let Some(hit) = hit else {
            points.push(from + dir * shot.max_distance);
            break;
        };
        points.push(hit.point);

        let Collider::Agent(target) = hit.collider else {
            break;
        };
        apply(DamageEvent {
            source: DamageSource::Player,
            target,
            amount: shot.damage,
            kind: DamageKind::HitScan,
        });

        if dice.roll() <= 1.0 - HITSCAN_CONTINUE_CHANCE {
            break;
        }
        from = hit.point + dir * HITSCAN_PENETRATION_OFFSET;
    }

    points
}

/// Outcome of advancing a projectile one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileStep {
    Flying,
    /// Struck something solid; `agent` is set when it was an agent
    Impact { point: Vec2, agent: Option<AgentId> },
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    id: ProjectileId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: i32,
    lifetime: Timer,
}

impl Projectile {
    /// Launch from `muzzle` along `aim`; `None` when `aim` is zero
    pub fn launch(id: ProjectileId, muzzle: Vec2, aim: Vec2, weapon: &WeaponTuning) -> Option<Self> {
        let dir = aim.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }
        Some(Self {
            id,
            position: muzzle,
            velocity: dir * weapon.projectile_speed,
            damage: weapon.projectile_damage,
            lifetime: Timer::new(weapon.projectile_lifetime),
        })
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    /// Sweep along this tick's travel and stop at the first solid contact
    ///
    /// The launcher (the player) and trigger colliders are passed through.
    pub fn step(&mut self, dt: f32, query: &dyn PhysicsQuery) -> ProjectileStep {
        let travel = self.velocity.length() * dt;
        let dir = self.velocity.normalize_or_zero();

        let contact = query
            .overlapping(self.position)
            .into_iter()
            .find(|collider| blocks_projectile(collider))
            .map(|collider| (self.position, collider))
            .or_else(|| {
                query
                    .raycast_all(self.position, dir, travel)
                    .into_iter()
                    .find(|hit| blocks_projectile(&hit.collider))
                    .map(|hit| (hit.point, hit.collider))
            });

        if let Some((point, collider)) = contact {
            self.position = point;
            let agent = match collider {
                Collider::Agent(agent) => Some(agent),
                _ => None,
            };
            return ProjectileStep::Impact { point, agent };
        }

        self.position += self.velocity * dt;
        if self.lifetime.advance(dt) {
            ProjectileStep::Expired
        } else {
            ProjectileStep::Flying
        }
    }

    pub fn damage_event(&self, target: AgentId) -> DamageEvent {
        DamageEvent {
            source: DamageSource::Projectile(self.id),
            target,
            amount: self.damage,
            kind: DamageKind::Projectile,
        }
    }
}

fn blocks_projectile(collider: &Collider) -> bool {
    !matches!(collider, Collider::Player) && !collider.is_trigger()
}
