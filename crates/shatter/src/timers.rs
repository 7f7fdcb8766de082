//! Per-tick timer table.
//!
//! Deferred work ("return this effect in 0.5 s", "end the game in 2 s") is a
//! countdown entry advanced once per tick. Nothing sleeps.

use std::fmt;

/// Identifies one scheduled entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug)]
struct Entry<A> {
    id: TimerId,
    remaining: f32,
    action: A,
}

/// Countdown entries carrying an action each.
#[derive(Debug)]
pub struct TimerTable<A> {
    entries: Vec<Entry<A>>,
    next_id: u64,
}

impl<A> TimerTable<A> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedules `action` to fire after `delay` seconds of advanced time.
    ///
    /// A non-positive delay fires on the next [`TimerTable::advance`].
    pub fn schedule(&mut self, delay: f32, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            remaining: delay,
            action,
        });
        id
    }

    /// Removes an entry before it fires, handing its action back.
    pub fn cancel(&mut self, id: TimerId) -> Option<A> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index).action)
    }

    /// Counts every entry down by `dt` and returns the actions that came due,
    /// earliest deadline first (ties in scheduling order).
    pub fn advance(&mut self, dt: f32) -> Vec<A> {
        for entry in &mut self.entries {
            entry.remaining -= dt;
        }

        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|entry| entry.remaining <= 0.0);
        self.entries = pending;

        due.sort_by(|a, b| a.remaining.total_cmp(&b.remaining).then(a.id.cmp(&b.id)));
        due.into_iter().map(|entry| entry.action).collect()
    }

    /// Removes every entry, handing the actions back unfired.
    pub fn clear(&mut self) -> Vec<A> {
        self.entries.drain(..).map(|entry| entry.action).collect()
    }

    /// Seconds left on an entry.
    #[must_use]
    pub fn remaining(&self, id: TimerId) -> Option<f32> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.remaining)
    }

    /// Pending entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> Default for TimerTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_when_due() {
        let mut timers = TimerTable::new();
        timers.schedule(0.25, "fade");

        assert!(timers.advance(0.125).is_empty());
        assert_eq!(timers.remaining(TimerId(0)), Some(0.125));
        assert_eq!(timers.advance(0.125), vec!["fade"]);
        assert!(timers.advance(1.0).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_due_order_is_deadline_then_schedule() {
        let mut timers = TimerTable::new();
        timers.schedule(0.5, 'c');
        timers.schedule(0.25, 'a');
        timers.schedule(0.25, 'b');
        timers.schedule(2.0, 'z');

        assert_eq!(timers.advance(1.0), vec!['a', 'b', 'c']);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel_and_clear() {
        let mut timers = TimerTable::new();
        let first = timers.schedule(1.0, 1);
        timers.schedule(1.0, 2);

        assert_eq!(timers.cancel(first), Some(1));
        assert_eq!(timers.cancel(first), None);
        assert_eq!(timers.clear(), vec![2]);
        assert!(timers.advance(5.0).is_empty());
    }

    #[test]
    fn test_zero_delay_fires_next_advance() {
        let mut timers = TimerTable::new();
        timers.schedule(0.0, ());
        assert_eq!(timers.advance(0.0).len(), 1);
    }
}
