//! # Mob Scheduler
//!
//! Cooperative timer for autonomous mobs. The scheduler does not run
//! anything by itself: each call to [`MobScheduler::advance`] is one tick and
//! returns the mobs due to act on it, in the order they were scheduled.

use crate::EntityId;

/// Timer of one scheduled mob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MobTimer {
    /// Ticks between two activations
    period: u64,
    /// Tick at which the mob acts next
    next_tick: u64,
}

/// Tick-based timers for every animated mob.
#[derive(Debug, Clone, Default)]
pub struct MobScheduler {
    timers: Vec<(EntityId, MobTimer)>,
    tick: u64,
}

impl MobScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the timer of a mob, acting every `period` ticks.
    ///
    /// A period of zero is treated as one.
    pub fn schedule(&mut self, entity_id: EntityId, period: u64) {
        let period = period.max(1);
        let timer = MobTimer {
            period,
            next_tick: self.tick + period,
        };
        match self.timers.iter_mut().find(|(id, _)| *id == entity_id) {
            Some((_, existing)) => *existing = timer,
            None => self.timers.push((entity_id, timer)),
        }
    }

    /// Stops the timer of a mob. Returns whether it was scheduled.
    pub fn cancel(&mut self, entity_id: EntityId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|(id, _)| *id != entity_id);
        self.timers.len() != before
    }

    pub fn is_scheduled(&self, entity_id: EntityId) -> bool {
        self.timers.iter().any(|(id, _)| *id == entity_id)
    }

    /// Number of mobs with a running timer.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Number of ticks elapsed so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Moves time forward by one tick and returns the mobs due on it.
    pub fn advance(&mut self) -> Vec<EntityId> {
        self.tick += 1;
        let tick = self.tick;

        let mut due = Vec::new();
        for (id, timer) in &mut self.timers {
            if timer.next_tick <= tick {
                timer.next_tick = tick + timer.period;
                due.push(*id);
            }
        }
        due
    }
}
