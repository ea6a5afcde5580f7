//! Ray queries against circular colliders
//!
//! The damage resolver only needs "what does this ray hit, and where". Any
//! physics backend can answer that through [`PhysicsQuery`]; the built-in
//! [`SceneColliders`] answers it for agents, the player and static obstacles
//! treated as circles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, AgentId};
use super::player::PlayerState;

/// What a ray struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collider {
    Agent(AgentId),
    Player,
    /// Static scenery; triggers are passed through by projectiles
    Obstacle { trigger: bool },
}

impl Collider {
    pub fn is_trigger(&self) -> bool {
        matches!(self, Collider::Obstacle { trigger: true })
    }
}

/// Result of a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    /// Distance from the ray origin to `point`
    pub distance: f32,
    pub collider: Collider,
}

/// Raycast capability the resolver depends on
///
/// `dir` is expected to be normalized.
pub trait PhysicsQuery {
    /// Every hit along the ray, nearest first
    fn raycast_all(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Vec<RayHit>;

    /// Nearest hit along the ray
    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<RayHit> {
        self.raycast_all(origin, dir, max_distance).into_iter().next()
    }

    /// Colliders containing `point`; backends without overlap tests report none
    fn overlapping(&self, _point: Vec2) -> Vec<Collider> {
        Vec::new()
    }
}

/// Static circular obstacle placed by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f32,
    #[serde(default)]
    pub trigger: bool,
}

/// Entry distance of a ray into a circle
///
/// A circle that already contains the origin is ignored, so a shooter never
/// hits itself and a continued hit-scan ray does not re-hit the agent it
/// just passed through.
pub fn ray_circle(origin: Vec2, dir: Vec2, max_distance: f32, center: Vec2, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let radius_sq = radius * radius;
    let dist_sq = to_center.length_squared();
    if dist_sq <= radius_sq {
        return None;
    }

    let along = to_center.dot(dir);
    if along < 0.0 {
        return None;
    }

    let perp_sq = dist_sq - along * along;
    if perp_sq > radius_sq {
        return None;
    }

    let entry = along - (radius_sq - perp_sq).sqrt();
    (entry <= max_distance).then_some(entry)
}

#[derive(Debug, Clone, Copy)]
struct CircleCollider {
    center: Vec2,
    radius: f32,
    collider: Collider,
}

/// Snapshot of every collidable circle in the scene
#[derive(Debug, Clone, Default)]
pub struct SceneColliders {
    circles: Vec<CircleCollider>,
}

impl SceneColliders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot live agents, the player and obstacles
    ///
    /// Dead agents have collision disabled and are left out.
    pub fn from_scene(agents: &[Agent], player: Option<&PlayerState>, obstacles: &[Obstacle]) -> Self {
        let mut scene = Self::new();
        for agent in agents.iter().filter(|a| a.is_collidable()) {
            scene.push(agent.position, agent.collider_radius(), Collider::Agent(agent.id()));
        }
        if let Some(player) = player {
            scene.push(player.position, player.collider_radius, Collider::Player);
        }
        for obstacle in obstacles {
            scene.push(
                obstacle.center,
                obstacle.radius,
                Collider::Obstacle {
                    trigger: obstacle.trigger,
                },
            );
        }
        scene
    }

    pub fn push(&mut self, center: Vec2, radius: f32, collider: Collider) {
        self.circles.push(CircleCollider {
            center,
            radius,
            collider,
        });
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }
}

impl PhysicsQuery for SceneColliders {
    fn raycast_all(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .circles
            .iter()
            .filter_map(|circle| {
                ray_circle(origin, dir, max_distance, circle.center, circle.radius).map(|distance| RayHit {
                    point: origin + dir * distance,
                    distance,
                    collider: circle.collider,
                })
            })
            .collect();
        // stable: equal distances keep insertion order
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn overlapping(&self, point: Vec2) -> Vec<Collider> {
        self.circles
            .iter()
            .filter(|circle| circle.center.distance_squared(point) <= circle.radius * circle.radius)
            .map(|circle| circle.collider)
            .collect()
    }
}
