//! Spawn placement
//!
//! Designer-authored points win when present. Otherwise agents appear on a
//! ring just outside the visible viewport, re-rolled a bounded number of times
//! when they land too close to the player.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::dice::Dice;
use crate::consts::{FALLBACK_SPAWN_RING_RADIUS, MIN_OFFSCREEN_MARGIN, SPAWN_PLACEMENT_RETRIES};
use crate::polar_to_cartesian;
use crate::tuning::WaveConfig;

/// Axis-aligned rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() / 2.0;
        Self::new(center - half, center + half)
    }

    /// Grow every edge outward by `margin`
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
    }

    #[cfg(test)]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Camera capability: the world-space rectangle currently on screen
pub trait Viewport {
    fn bounds(&self) -> Rect;
}

impl Viewport for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// What the selector can see about the scene at spawn time
#[derive(Clone, Copy)]
pub struct SpawnSite<'a> {
    pub viewport: Option<&'a dyn Viewport>,
    pub player: Option<Vec2>,
    /// Where the director itself sits; centre of the fallback ring
    pub origin: Vec2,
}

/// Pick a spawn position for the next agent
pub fn select_spawn_point(config: &WaveConfig, site: &SpawnSite<'_>, dice: &mut dyn Dice) -> Vec2 {
    if !config.spawn_points.is_empty() {
        return config.spawn_points[dice.pick(config.spawn_points.len())];
    }

    let Some(viewport) = site.viewport else {
        let theta = dice.range(0.0, std::f32::consts::TAU);
        return site.origin + polar_to_cartesian(FALLBACK_SPAWN_RING_RADIUS, theta);
    };

    let ring = viewport
        .bounds()
        .expand(config.offscreen_spawn_margin.max(MIN_OFFSCREEN_MARGIN));
    let mut candidate = edge_point(&ring, dice);

    let min_distance = config.min_spawn_distance_from_player;
    if let Some(player) = site.player {
        if min_distance > 0.0 {
            let mut retries = 0;
            while candidate.distance(player) < min_distance && retries < SPAWN_PLACEMENT_RETRIES {
                candidate = edge_point(&ring, dice);
                retries += 1;
            }
            if candidate.distance(player) < min_distance {
                log::warn!(
                    "No spawn point at least {min_distance} from the player after {retries} retries; using {candidate}"
                );
            }
        }
    }

    candidate
}

/// Uniform edge, then a uniform point along it
fn edge_point(ring: &Rect, dice: &mut dyn Dice) -> Vec2 {
    let Rect { min, max } = *ring;
    match dice.pick(4) {
        0 => Vec2::new(min.x, dice.range(min.y, max.y)),
        1 => Vec2::new(max.x, dice.range(min.y, max.y)),
        2 => Vec2::new(dice.range(min.x, max.x), min.y),
        _ => Vec2::new(dice.range(min.x, max.x), max.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::dice::SequenceDice;

    fn screen() -> Rect {
        Rect::new(Vec2::splat(-5.0), Vec2::splat(5.0))
    }

    #[test]
    fn test_fixed_points_skip_distance_check() {
        let config = WaveConfig {
            spawn_points: vec![Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(3.0, 0.0)],
            min_spawn_distance_from_player: 100.0,
            ..Default::default()
        };
        let view = screen();
        let site = SpawnSite {
            viewport: Some(&view),
            player: Some(Vec2::ZERO),
            origin: Vec2::ZERO,
        };
        let mut dice = SequenceDice::new([0.5]);
        assert_eq!(select_spawn_point(&config, &site, &mut dice), Vec2::new(2.0, 0.0));
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_offscreen_point_lies_on_expanded_ring() {
        let config = WaveConfig::default();
        let view = screen();
        let site = SpawnSite {
            viewport: Some(&view),
            player: None,
            origin: Vec2::ZERO,
        };
        // left edge, halfway up
        let mut dice = SequenceDice::new([0.0, 0.5]);
        assert_eq!(select_spawn_point(&config, &site, &mut dice), Vec2::new(-7.0, 0.0));
        // top edge, left end
        let mut dice = SequenceDice::new([0.9, 0.0]);
        assert_eq!(select_spawn_point(&config, &site, &mut dice), Vec2::new(-7.0, 7.0));
    }

    #[test]
    fn test_too_close_candidate_is_rerolled() {
        let config = WaveConfig::default();
        let view = screen();
        let site = SpawnSite {
            viewport: Some(&view),
            player: Some(Vec2::new(-7.0, 0.0)),
            origin: Vec2::ZERO,
        };
        // first candidate sits on the player; the retry lands on the right edge
        let mut dice = SequenceDice::new([0.0, 0.5, 0.3, 0.5]);
        assert_eq!(select_spawn_point(&config, &site, &mut dice), Vec2::new(7.0, 0.0));
    }

    #[test]
    fn test_retry_exhaustion_accepts_last_candidate() {
        let config = WaveConfig {
            min_spawn_distance_from_player: 1000.0,
            ..Default::default()
        };
        let view = screen();
        let site = SpawnSite {
            viewport: Some(&view),
            player: Some(Vec2::ZERO),
            origin: Vec2::ZERO,
        };
        let mut dice = SequenceDice::new(std::iter::repeat_n(0.5, 50));
        let point = select_spawn_point(&config, &site, &mut dice);
        // bottom edge midpoint
        assert_eq!(point, Vec2::new(0.0, -7.0));
        // one initial candidate plus twenty retries, two draws each
        assert_eq!(dice.remaining(), 50 - 42);
    }

    #[test]
    fn test_margin_has_a_floor() {
        let config = WaveConfig {
            offscreen_spawn_margin: 0.0,
            ..Default::default()
        };
        let view = screen();
        let site = SpawnSite {
            viewport: Some(&view),
            player: None,
            origin: Vec2::ZERO,
        };
        let mut dice = SequenceDice::new([0.0, 0.5]);
        let point = select_spawn_point(&config, &site, &mut dice);
        assert!((point.x - -5.1).abs() < 1e-5);
    }

    #[test]
    fn test_no_viewport_uses_ring_around_origin() {
        let config = WaveConfig::default();
        let site = SpawnSite {
            viewport: None,
            player: Some(Vec2::ZERO),
            origin: Vec2::new(1.0, 1.0),
        };
        let mut dice = SequenceDice::new([0.25]);
        let point = select_spawn_point(&config, &site, &mut dice);
        assert!((point - Vec2::new(1.0, 11.0)).length() < 1e-4);
    }

    #[test]
    fn test_rect_expand_and_contains() {
        let rect = Rect::from_center_size(Vec2::ZERO, Vec2::new(4.0, 2.0)).expand(1.0);
        assert_eq!(rect.min, Vec2::new(-3.0, -2.0));
        assert!(rect.contains(Vec2::new(3.0, 2.0)));
        assert!(!rect.contains(Vec2::new(3.1, 0.0)));
    }
}
