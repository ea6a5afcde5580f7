//! Live agent population
//!
//! The director gates spawns on this count. Registration is keyed by agent id
//! so a death followed by corpse removal, or a despawn of an agent that never
//! died, only ever decrements once.

use std::collections::HashSet;

use super::agent::AgentId;

#[derive(Debug, Clone, Default)]
pub struct PopulationTracker {
    alive: HashSet<AgentId>,
}

impl PopulationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly spawned agent; false if it was already counted
    pub fn increment(&mut self, agent: AgentId) -> bool {
        self.alive.insert(agent)
    }

    /// Unregister an agent; false (and no change) if it was not counted
    pub fn decrement(&mut self, agent: AgentId) -> bool {
        self.alive.remove(&agent)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive.len() as u32
    }

    pub fn is_counted(&self, agent: AgentId) -> bool {
        self.alive.contains(&agent)
    }

    /// Whether another agent fits under `cap` (0 = unlimited)
    pub fn has_capacity(&self, cap: u32) -> bool {
        cap == 0 || self.alive_count() < cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_is_idempotent() {
        let mut population = PopulationTracker::new();
        assert!(population.increment(AgentId::new(1)));
        assert!(population.increment(AgentId::new(2)));
        assert_eq!(population.alive_count(), 2);

        assert!(population.decrement(AgentId::new(1)));
        assert!(!population.decrement(AgentId::new(1)));
        assert_eq!(population.alive_count(), 1);
    }

    #[test]
    fn test_unknown_decrement_never_goes_negative() {
        let mut population = PopulationTracker::new();
        assert!(!population.decrement(AgentId::new(9)));
        assert_eq!(population.alive_count(), 0);
    }

    #[test]
    fn test_capacity() {
        let mut population = PopulationTracker::new();
        assert!(population.has_capacity(0));
        assert!(population.has_capacity(1));
        population.increment(AgentId::new(1));
        assert!(!population.has_capacity(1));
        assert!(population.has_capacity(2));
        assert!(population.has_capacity(0));
    }
}
