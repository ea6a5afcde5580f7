//! Encounter state
//!
//! Everything one running encounter owns: the director, the live population,
//! agents, projectiles, the player, scene obstacles and the event bus. The
//! host drives it through [`super::tick`] and the operations here.

use std::fmt;

use glam::Vec2;

use super::agent::{Agent, AgentId, DamageOutcome};
use super::collision::{Obstacle, SceneColliders};
use super::damage::{DamageEvent, DamageKind, DamageSource, HitScan, Projectile, ProjectileId, ProjectileStep, resolve_hitscan};
use super::dice::{Dice, seeded};
use super::director::SpawnDirector;
use super::events::{EventBus, SimEvent, SubscriptionId};
use super::player::{PlayerState, Target};
use super::population::PopulationTracker;
use super::scaling::scale_agent;
use super::spawn::{Rect, SpawnSite, Viewport, select_spawn_point};
use crate::tuning::{ConfigError, Tuning};

pub struct Encounter {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub tuning: Tuning,
    pub director: SpawnDirector,
    pub population: PopulationTracker,
    /// Live agents, corpses included until removal (sorted by id)
    pub agents: Vec<Agent>,
    /// In-flight projectiles (sorted by id)
    pub projectiles: Vec<Projectile>,
    /// `None` when no target can be resolved
    pub player: Option<PlayerState>,
    pub obstacles: Vec<Obstacle>,
    /// On-screen area used for off-screen spawning
    pub viewport: Option<Rect>,
    /// Centre of the fallback spawn ring
    pub director_position: Vec2,
    pub events: EventBus,
    dice: Box<dyn Dice>,
    next_id: u32,
}

impl Encounter {
    /// Create an encounter with seeded dice and a player at the origin
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut encounter = Self::with_dice(tuning, Box::new(seeded(seed)));
        encounter.seed = seed;
        encounter
    }

    /// Create an encounter drawing from `dice`
    pub fn with_dice(tuning: Tuning, dice: Box<dyn Dice>) -> Self {
        let player = PlayerState::new(Vec2::ZERO, &tuning.player);
        Self {
            seed: 0,
            time_ticks: 0,
            director: SpawnDirector::new(tuning.wave.clone()),
            tuning,
            population: PopulationTracker::new(),
            agents: Vec::new(),
            projectiles: Vec::new(),
            player: Some(player),
            obstacles: Vec::new(),
            viewport: None,
            director_position: Vec2::ZERO,
            events: EventBus::new(),
            dice,
            next_id: 1,
        }
    }

    /// Start the wave timeline
    pub fn start(&mut self) -> Result<(), ConfigError> {
        self.director.start()
    }

    /// Allocate a new entity id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn one agent for `wave`
    ///
    /// Returns `None` (and logs) when the agent template or wave
    /// configuration is unavailable.
    pub fn spawn_agent(&mut self, wave: u32) -> Option<AgentId> {
        let Some(template) = self.tuning.agent.as_ref() else {
            log::warn!("No agent template; skipping spawn for wave {wave}");
            return None;
        };
        let Some(config) = self.director.config() else {
            log::warn!("No wave configuration; skipping spawn for wave {wave}");
            return None;
        };

        let site = SpawnSite {
            viewport: self.viewport.as_ref().map(|v| v as &dyn Viewport),
            player: self.player.as_ref().map(|p| p.position),
            origin: self.director_position,
        };
        let position = select_spawn_point(config, &site, self.dice.as_mut());
        let spec = scale_agent(config, template, wave, self.dice.as_mut());

        let id = AgentId::new(self.next_id);
        self.next_id += 1;
        let agent = Agent::spawn(id, position, spec, template);

        self.population.increment(id);
        self.agents.push(agent);
        log::debug!(
            "Spawned agent {} at {position} (runner={}, radiated={}, tank={}, health={})",
            id.get(),
            spec.runner,
            spec.radiated,
            spec.tank,
            spec.max_health
        );
        self.events.publish(SimEvent::AgentSpawned {
            agent: id,
            spec,
            position,
        });
        Some(id)
    }

    /// Land one hit on an agent
    ///
    /// A kill unregisters the agent from the population and counts toward
    /// the player's kills. Hits on dead or unknown agents are ignored.
    pub fn apply_damage(&mut self, event: DamageEvent) -> DamageOutcome {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id() == event.target) else {
            return DamageOutcome::Ignored;
        };

        let outcome = agent.take_damage(event.amount, &mut self.events);
        if outcome == DamageOutcome::Ignored {
            return outcome;
        }
        self.events.publish(SimEvent::DamageDealt(event));

        if outcome == DamageOutcome::Killed {
            self.population.decrement(event.target);
            if let Some(player) = self.player.as_mut() {
                player.record_kill(&mut self.events);
            }
        }
        outcome
    }

    /// Direct damage from the player, outside any weapon
    pub fn damage_agent(&mut self, agent: AgentId, amount: i32) -> DamageOutcome {
        self.apply_damage(DamageEvent {
            source: DamageSource::Player,
            target: agent,
            amount,
            kind: DamageKind::HitScan,
        })
    }

    /// Remove an agent from the scene, dead or alive
    ///
    /// Pending timers are cancelled and the population is decremented if the
    /// agent was still counted. Returns false for unknown agents.
    pub fn despawn_agent(&mut self, id: AgentId) -> bool {
        let Some(index) = self.agents.iter().position(|a| a.id() == id) else {
            return false;
        };
        let mut agent = self.agents.remove(index);
        agent.cancel_timers();
        self.population.decrement(id);
        self.events.publish(SimEvent::AgentRemoved { agent: id });
        true
    }

    /// Run every agent's behavior step, then clear out expired corpses
    pub fn step_agents(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for agent in &mut self.agents {
            let target = self.player.as_mut().map(|p| p as &mut dyn Target);
            if agent.tick(dt, target, &mut self.events) {
                expired.push(agent.id());
            }
        }
        for id in expired {
            self.despawn_agent(id);
        }
    }

    /// Colliders for this instant
    pub fn scene_colliders(&self) -> SceneColliders {
        SceneColliders::from_scene(&self.agents, self.player.as_ref(), &self.obstacles)
    }

    fn muzzle(&self, aim: Vec2) -> Option<(Vec2, Vec2)> {
        let player = self.player.as_ref().filter(|p| !p.is_dead())?;
        let dir = aim.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }
        Some((player.position + dir * self.tuning.weapon.muzzle_offset, dir))
    }

    /// Fire one hit-scan resolution along `aim`
    ///
    /// Returns the traced points, or `None` when there is no living player or
    /// the aim is zero.
    pub fn fire_hitscan(&mut self, aim: Vec2) -> Option<Vec<Vec2>> {
        let (origin, dir) = self.muzzle(aim)?;
        let weapon = &self.tuning.weapon;
        let shot = HitScan {
            origin,
            dir,
            max_distance: weapon.hitscan_max_distance,
            damage: weapon.hitscan_damage,
        };

        let scene = self.scene_colliders();
        let mut landed = Vec::new();
        let points = resolve_hitscan(&shot, &scene, self.dice.as_mut(), &mut |event| landed.push(event));
        for event in landed {
            self.apply_damage(event);
        }

        self.events.publish(SimEvent::ShotTraced {
            points: points.clone(),
        });
        Some(points)
    }

    /// Launch a projectile along `aim`
    pub fn launch_projectile(&mut self, aim: Vec2) -> Option<ProjectileId> {
        let (muzzle, dir) = self.muzzle(aim)?;
        let id = ProjectileId::new(self.next_entity_id());
        let projectile = Projectile::launch(id, muzzle, dir, &self.tuning.weapon)?;

        self.events.publish(SimEvent::ProjectileLaunched {
            projectile: id,
            position: projectile.position,
            velocity: projectile.velocity,
        });
        self.projectiles.push(projectile);
        Some(id)
    }

    /// Move projectiles in id order, resolving impacts and expiry
    ///
    /// Each impact lands before the next projectile moves, so a kill drops
    /// the corpse out of the colliders seen by later projectiles.
    pub fn step_projectiles(&mut self, dt: f32) {
        let mut scene = self.scene_colliders();
        let mut index = 0;
        while index < self.projectiles.len() {
            let (impact, target) = match self.projectiles[index].step(dt, &scene) {
                ProjectileStep::Flying => {
                    index += 1;
                    continue;
                }
                ProjectileStep::Impact { point, agent } => (Some(point), agent),
                ProjectileStep::Expired => (None, None),
            };

            let projectile = self.projectiles.remove(index);
            if let Some(target) = target {
                if self.apply_damage(projectile.damage_event(target)) == DamageOutcome::Killed {
                    scene = self.scene_colliders();
                }
            }
            self.events.publish(SimEvent::ProjectileRemoved {
                projectile: projectile.id(),
                impact,
            });
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn alive_count(&self) -> u32 {
        self.population.alive_count()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&SimEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Take every event published since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Ensure entities are sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.agents.sort_by_key(|a| a.id());
        self.projectiles.sort_by_key(|p| p.id());
    }
}

impl fmt::Debug for Encounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encounter")
            .field("seed", &self.seed)
            .field("time_ticks", &self.time_ticks)
            .field("wave", &self.director.wave())
            .field("phase", &self.director.phase())
            .field("agents", &self.agents.len())
            .field("alive", &self.population.alive_count())
            .field("projectiles", &self.projectiles.len())
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}
