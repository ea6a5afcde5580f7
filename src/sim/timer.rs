//! Countdown timers for suspended work
//!
//! Waits that would block in a coroutine (wave delays, alert decay, attack
//! cooldowns, corpse removal) are stored as a [`Timer`] and advanced once per
//! tick. Dropping or clearing the `Option<Timer>` that holds one cancels it.
//!
//! The countdown is kept in f64 and fires within [`TIMER_EPSILON`] of zero,
//! so a duration that is a whole number of `SIM_DT` steps fires on exactly
//! that step despite `SIM_DT` not being representable.

use serde::{Deserialize, Serialize};

/// Slack allowed when deciding a countdown has reached zero (seconds)
pub const TIMER_EPSILON: f64 = 1e-4;

/// Seconds left until a suspended task resumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    remaining: f64,
}

impl Timer {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: f64::from(seconds),
        }
    }

    /// Advance by `dt`; returns true once the timer has run out
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= f64::from(dt);
        self.is_elapsed()
    }

    #[inline]
    pub fn is_elapsed(&self) -> bool {
        self.remaining <= TIMER_EPSILON
    }

    /// Seconds left, never negative
    #[cfg(test)]
    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0) as f32
    }
}

/// Advance an optional timer, clearing it when it fires
///
/// Returns true on the tick the timer elapses.
pub fn advance_slot(slot: &mut Option<Timer>, dt: f32) -> bool {
    let fired = slot.as_mut().is_some_and(|timer| timer.advance(dt));
    if fired {
        *slot = None;
    }
    fired
}
