//! Wave director
//!
//! The wave timeline is a small state machine advanced once per tick. Each
//! phase is a point where the timeline waits: on a timer, on spawn capacity,
//! or on the field being cleared. Within one tick the director runs forward
//! until it reaches such a wait or hands out a spawn, so it asks for at most
//! one spawn per tick.
//!
//! Timers start counting on the tick after they are armed.

use serde::{Deserialize, Serialize};

use super::events::{EventBus, SimEvent};
use super::population::PopulationTracker;
use super::scaling::agents_for_wave;
use super::timer::Timer;
use crate::tuning::{ConfigError, WaveConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DirectorPhase {
    /// Constructed but not started
    Idle,
    AwaitingFirstWave { delay: Timer },
    /// Handing out spawns for the current wave
    Spawning {
        spawned: u32,
        total: u32,
        delay: Option<Timer>,
    },
    /// Every spawn is out; waiting for the population to reach zero
    WaitingForClear,
    InterWaveDelay { delay: Timer },
    /// Finite wave list exhausted
    Completed,
    /// Started without configuration
    Disabled,
}

/// The director wants one agent spawned for `wave`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRequest {
    pub wave: u32,
}

#[derive(Debug, Clone)]
pub struct SpawnDirector {
    config: Option<WaveConfig>,
    phase: DirectorPhase,
    wave: u32,
}

impl SpawnDirector {
    pub fn new(config: Option<WaveConfig>) -> Self {
        Self {
            config: config.map(WaveConfig::sanitized),
            phase: DirectorPhase::Idle,
            wave: 0,
        }
    }

    /// Arm the first-wave delay
    ///
    /// Without a configuration the director disables itself and reports
    /// [`ConfigError::Missing`]; the rest of the simulation is unaffected.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        let Some(config) = &self.config else {
            log::error!("Spawn director has no wave configuration; disabling");
            self.phase = DirectorPhase::Disabled;
            return Err(ConfigError::Missing);
        };

        if self.phase != DirectorPhase::Idle {
            log::warn!("Spawn director already started ({:?})", self.phase);
            return Ok(());
        }

        log::info!(
            "Spawn director started: first wave in {:.1}s",
            config.time_before_first_wave
        );
        self.phase = DirectorPhase::AwaitingFirstWave {
            delay: Timer::new(config.time_before_first_wave),
        };
        Ok(())
    }

    /// Advance the timeline by `dt`
    pub fn tick(&mut self, dt: f32, population: &PopulationTracker, events: &mut EventBus) -> Option<SpawnRequest> {
        let config = self.config.as_ref()?;
        let between_spawns = config.time_between_spawns;
        let between_waves = config.time_between_waves;
        let cap = config.max_alive_at_once;

        loop {
            match self.phase {
                DirectorPhase::Idle | DirectorPhase::Completed | DirectorPhase::Disabled => return None,

                DirectorPhase::AwaitingFirstWave { mut delay } | DirectorPhase::InterWaveDelay { mut delay } => {
                    if !delay.advance(dt) {
                        self.phase = match self.phase {
                            DirectorPhase::AwaitingFirstWave { .. } => DirectorPhase::AwaitingFirstWave { delay },
                            _ => DirectorPhase::InterWaveDelay { delay },
                        };
                        return None;
                    }
                    self.begin_next_wave(events);
                }

                DirectorPhase::Spawning {
                    spawned,
                    total,
                    delay,
                } => {
                    if let Some(mut delay) = delay {
                        if !delay.advance(dt) {
                            self.phase = DirectorPhase::Spawning {
                                spawned,
                                total,
                                delay: Some(delay),
                            };
                            return None;
                        }
                        self.phase = DirectorPhase::Spawning {
                            spawned,
                            total,
                            delay: None,
                        };
                    }

                    if spawned >= total {
                        self.phase = DirectorPhase::WaitingForClear;
                        continue;
                    }

                    if !population.has_capacity(cap) {
                        return None;
                    }

                    self.phase = DirectorPhase::Spawning {
                        spawned: spawned + 1,
                        total,
                        delay: Some(Timer::new(between_spawns)),
                    };
                    return Some(SpawnRequest { wave: self.wave });
                }

                DirectorPhase::WaitingForClear => {
                    if population.alive_count() > 0 {
                        return None;
                    }
                    log::info!("Wave {} cleared", self.wave);
                    self.phase = DirectorPhase::InterWaveDelay {
                        delay: Timer::new(between_waves),
                    };
                    return None;
                }
            }
        }
    }

    fn begin_next_wave(&mut self, events: &mut EventBus) {
        let Some(config) = &self.config else {
            self.phase = DirectorPhase::Disabled;
            return;
        };

        if config.wave_count > 0 && self.wave >= config.wave_count {
            self.phase = DirectorPhase::Completed;
            match config.next_level() {
                Some(next) => {
                    log::info!("All {} waves done; next level {next}", config.wave_count);
                    events.publish(SimEvent::LevelCompleted {
                        next_level: next.to_string(),
                    });
                }
                None => log::info!("All {} waves done", config.wave_count),
            }
            return;
        }

        self.wave = self.wave.saturating_add(1);
        let agents = agents_for_wave(config, self.wave);
        log::info!("Wave {} started with {agents} agents", self.wave);
        events.publish(SimEvent::WaveStarted {
            wave: self.wave,
            agents,
        });
        self.phase = DirectorPhase::Spawning {
            spawned: 0,
            total: agents,
            delay: None,
        };
    }

    /// Current wave, 1-based; 0 before the first wave
    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn phase(&self) -> DirectorPhase {
        self.phase
    }

    /// True while the current wave still has spawns to hand out
    pub fn is_spawning(&self) -> bool {
        matches!(self.phase, DirectorPhase::Spawning { .. })
    }

    pub fn config(&self) -> Option<&WaveConfig> {
        self.config.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::agent::AgentId;

    fn config() -> WaveConfig {
        WaveConfig {
            wave_count: 2,
            agents_per_wave: 3,
            agents_per_wave_increase: 0,
            max_alive_at_once: 2,
            time_before_first_wave: 1.0,
            time_between_spawns: 0.5,
            time_between_waves: 1.0,
            next_level: Some("Level2".to_string()),
            ..Default::default()
        }
    }

    struct Harness {
        director: SpawnDirector,
        population: PopulationTracker,
        events: EventBus,
        next_id: u32,
    }

    impl Harness {
        fn new(config: WaveConfig) -> Self {
            let mut director = SpawnDirector::new(Some(config));
            director.start().expect("config present");
            Self {
                director,
                population: PopulationTracker::new(),
                events: EventBus::new(),
                next_id: 1,
            }
        }

        /// Tick once, registering any requested spawn
        fn step(&mut self, dt: f32) -> Option<SpawnRequest> {
            let request = self.director.tick(dt, &self.population, &mut self.events);
            if request.is_some() {
                self.population.increment(AgentId::new(self.next_id));
                self.next_id += 1;
            }
            request
        }

        fn kill_all(&mut self) {
            for id in 1..self.next_id {
                self.population.decrement(AgentId::new(id));
            }
        }
    }

    #[test]
    fn test_missing_config_disables_director() {
        let mut director = SpawnDirector::new(None);
        let mut events = EventBus::new();

        assert!(matches!(director.start(), Err(ConfigError::Missing)));
        assert_eq!(director.phase(), DirectorPhase::Disabled);
        assert_eq!(director.tick(1.0, &PopulationTracker::new(), &mut events), None);
        assert!(events.pending().is_empty());
    }

    #[test]
    fn test_unstarted_director_is_idle() {
        let mut director = SpawnDirector::new(Some(config()));
        let mut events = EventBus::new();
        assert_eq!(director.tick(5.0, &PopulationTracker::new(), &mut events), None);
        assert_eq!(director.wave(), 0);
    }

    #[test]
    fn test_first_wave_waits_for_delay() {
        let mut h = Harness::new(config());

        assert_eq!(h.step(0.5), None);
        assert_eq!(h.director.wave(), 0);

        assert_eq!(h.step(0.5), Some(SpawnRequest { wave: 1 }));
        assert!(h.director.is_spawning());
        assert_eq!(
            h.events.pending(),
            &[SimEvent::WaveStarted { wave: 1, agents: 3 }]
        );
    }

    #[test]
    fn test_spawns_are_spaced_and_capped() {
        let mut h = Harness::new(config());
        h.step(1.0);

        // 0.5s between spawns
        assert_eq!(h.step(0.25), None);
        assert_eq!(h.step(0.25), Some(SpawnRequest { wave: 1 }));
        assert_eq!(h.population.alive_count(), 2);

        // delay is over but the cap holds the third spawn back
        for _ in 0..10 {
            assert_eq!(h.step(0.5), None);
        }

        h.population.decrement(AgentId::new(1));
        assert_eq!(h.step(0.5), Some(SpawnRequest { wave: 1 }));
        assert_eq!(h.population.alive_count(), 2);
    }

    #[test]
    fn test_spawn_spacing_at_sim_rate() {
        let mut h = Harness::new(WaveConfig {
            max_alive_at_once: 0,
            ..config()
        });
        let spawn_ticks: Vec<u32> = (1..=200).filter(|_| h.step(SIM_DT).is_some()).collect();

        // 1.0s before the first wave, then 0.5s apart
        assert_eq!(spawn_ticks, vec![60, 90, 120]);
    }

    #[test]
    fn test_next_wave_waits_for_clear_field() {
        let mut h = Harness::new(WaveConfig {
            max_alive_at_once: 0,
            ..config()
        });
        let spawned: usize = (0..10).filter_map(|_| h.step(1.0)).count();
        assert_eq!(spawned, 3);
        assert_eq!(h.director.phase(), DirectorPhase::WaitingForClear);

        for _ in 0..5 {
            assert_eq!(h.step(1.0), None);
        }
        assert_eq!(h.director.wave(), 1);

        h.kill_all();
        // clear noticed, then the inter-wave delay runs
        assert_eq!(h.step(1.0), None);
        assert_eq!(h.step(1.0), Some(SpawnRequest { wave: 2 }));
        assert_eq!(h.director.wave(), 2);
    }

    #[test]
    fn test_finite_waves_complete_with_next_level() {
        let mut h = Harness::new(WaveConfig {
            max_alive_at_once: 0,
            ..config()
        });

        for _ in 0..2 {
            for _ in 0..10 {
                h.step(1.0);
            }
            h.kill_all();
        }
        for _ in 0..5 {
            h.step(1.0);
        }

        assert_eq!(h.director.phase(), DirectorPhase::Completed);
        assert_eq!(h.director.wave(), 2);
        let completions: Vec<_> = h
            .events
            .drain()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::LevelCompleted { .. }))
            .collect();
        assert_eq!(
            completions,
            vec![SimEvent::LevelCompleted {
                next_level: "Level2".to_string()
            }]
        );
    }

    #[test]
    fn test_completion_without_next_level_is_silent() {
        let mut h = Harness::new(WaveConfig {
            wave_count: 1,
            agents_per_wave: 1,
            next_level: Some("   ".to_string()),
            ..config()
        });
        for _ in 0..5 {
            h.step(1.0);
        }
        h.kill_all();
        for _ in 0..5 {
            h.step(1.0);
        }

        assert_eq!(h.director.phase(), DirectorPhase::Completed);
        assert!(
            !h.events
                .pending()
                .iter()
                .any(|e| matches!(e, SimEvent::LevelCompleted { .. }))
        );
    }

    #[test]
    fn test_empty_waves_do_not_stall_a_tick() {
        let mut h = Harness::new(WaveConfig {
            wave_count: 0,
            agents_per_wave: 0,
            time_before_first_wave: 0.0,
            time_between_waves: 0.0,
            ..config()
        });
        for _ in 0..6 {
            assert_eq!(h.step(1.0), None);
        }
        assert!(h.director.wave() >= 3);
    }

    #[test]
    fn test_start_twice_keeps_progress() {
        let mut h = Harness::new(config());
        h.step(1.0);
        assert!(h.director.start().is_ok());
        assert_eq!(h.director.wave(), 1);
        assert!(h.director.is_spawning());
    }
}
