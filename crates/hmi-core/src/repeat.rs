//! Key-repeat scheduling.
//!
//! # How repeat timing works (for beginners)
//!
//! When the operator holds a repeatable key, the panel keeps sending that key
//! at a fixed interval until it is released.  Instead of owning real timers,
//! [`RepeatScheduler`] only stores *deadlines*: "key A fires next at time T".
//! The caller (an async event loop, or a test) asks [`RepeatScheduler::next_deadline`]
//! when to wake up, then calls [`RepeatScheduler::due`] with the current time
//! to collect the keys whose deadline has passed.
//!
//! Because the current time is always passed in, tests can drive the
//! scheduler with a fake clock and check exact tick counts without sleeping.
//!
//! Invariants:
//!
//! - A key has at most one active timer.  Starting a key that already
//!   repeats restarts its timer from `now`.
//! - After [`RepeatScheduler::stop`] returns, the key is never reported by
//!   [`RepeatScheduler::due`] again until it is restarted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::keymap::KeyCode;

/// Shortest interval accepted; zero would fire on every poll.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
struct RepeatTimer {
    interval: Duration,
    next_fire: Instant,
}

/// Deadline map of keys that are auto-repeating.
#[derive(Debug, Clone, Default)]
pub struct RepeatScheduler {
    timers: HashMap<KeyCode, RepeatTimer>,
}

impl RepeatScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts repeating `key` every `interval`, first tick one interval after
    /// `now`.  Returns `true` if an existing timer for the key was replaced.
    pub fn start(&mut self, key: KeyCode, interval: Duration, now: Instant) -> bool {
        let interval = interval.max(MIN_INTERVAL);
        let timer = RepeatTimer {
            interval,
            next_fire: now + interval,
        };
        self.timers.insert(key, timer).is_some()
    }

    /// Stops repeating `key`.  Returns `false` if it was not repeating.
    pub fn stop(&mut self, key: KeyCode) -> bool {
        self.timers.remove(&key).is_some()
    }

    /// Stops every timer.  Returns how many were active.
    pub fn stop_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    pub fn is_repeating(&self, key: KeyCode) -> bool {
        self.timers.contains_key(&key)
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Earliest pending deadline, or `None` when nothing repeats.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|t| t.next_fire).min()
    }

    /// Returns the keys whose deadline is at or before `now`, earliest first,
    /// and schedules their next tick.
    ///
    /// Each key is reported at most once per call.  If the caller fell more
    /// than one interval behind, the missed ticks are skipped rather than
    /// replayed in a burst.
    pub fn due(&mut self, now: Instant) -> Vec<KeyCode> {
        let mut fired: Vec<(Instant, KeyCode)> = Vec::new();
        for (key, timer) in self.timers.iter_mut() {
            if timer.next_fire > now {
                continue;
            }
            fired.push((timer.next_fire, *key));
            timer.next_fire += timer.interval;
            if timer.next_fire <= now {
                timer.next_fire = now + timer.interval;
            }
        }
        fired.sort_by_key(|(deadline, key)| (*deadline, key.hid_usage()));
        fired.into_iter().map(|(_, key)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(500);

    #[test]
    fn test_nothing_is_due_before_first_interval() {
        // Arrange
        let t0 = Instant::now();
        let mut sched = RepeatScheduler::new();
        sched.start(KeyCode::KeyA, INTERVAL, t0);

        // Act
        let due = sched.due(t0 + Duration::from_millis(499));

        // Assert
        assert!(due.is_empty());
        assert_eq!(sched.next_deadline(), Some(t0 + INTERVAL));
    }

    #[test]
    fn test_key_fires_once_per_interval() {
        // Arrange
        let t0 = Instant::now();
        let mut sched = RepeatScheduler::new();
        sched.start(KeyCode::KeyA, INTERVAL, t0);

        // Act
        let mut ticks = 0;
        for step in 1..=20 {
            ticks += sched.due(t0 + Duration::from_millis(100 * step)).len();
        }

        // Assert: 2000 ms / 500 ms
        assert_eq!(ticks, 4);
    }

    #[test]
    fn test_restart_replaces_existing_timer() {
        // Arrange
        let t0 = Instant::now();
        let mut sched = RepeatScheduler::new();
        sched.start(KeyCode::KeyA, INTERVAL, t0);

        // Act
        let replaced = sched.start(KeyCode::KeyA, INTERVAL, t0 + Duration::from_millis(400));

        // Assert
        assert!(replaced);
        assert_eq!(sched.active_count(), 1);
        assert!(sched.due(t0 + INTERVAL).is_empty());
        assert_eq!(sched.due(t0 + Duration::from_millis(900)), vec![KeyCode::KeyA]);
    }

    #[test]
    fn test_stop_between_ticks_leaves_no_timer() {
        // Arrange
        let t0 = Instant::now();
        let mut sched = RepeatScheduler::new();
        sched.start(KeyCode::Backspace, INTERVAL, t0);
        assert_eq!(sched.due(t0 + INTERVAL).len(), 1);

        // Act
        let stopped = sched.stop(KeyCode::Backspace);

        // Assert
        assert!(stopped);
        assert!(!sched.is_repeating(KeyCode::Backspace));
        assert_eq!(sched.next_deadline(), None);
        assert!(sched.due(t0 + INTERVAL * 10).is_empty());
    }

    #[test]
    fn test_missed_ticks_are_skipped() {
        let t0 = Instant::now();
        let mut sched = RepeatScheduler::new();
        sched.start(KeyCode::KeyB, INTERVAL, t0);

        let late = t0 + Duration::from_millis(1700);

        assert_eq!(sched.due(late), vec![KeyCode::KeyB]);
        assert_eq!(sched.next_deadline(), Some(late + INTERVAL));
    }

    #[test]
    fn test_due_orders_keys_by_deadline() {
        let t0 = Instant::now();
        let mut sched = RepeatScheduler::new();
        sched.start(KeyCode::KeyZ, INTERVAL, t0);
        sched.start(KeyCode::KeyA, INTERVAL, t0 + Duration::from_millis(50));

        let due = sched.due(t0 + Duration::from_millis(600));

        assert_eq!(due, vec![KeyCode::KeyZ, KeyCode::KeyA]);
    }

    #[test]
    fn test_stop_all_clears_every_timer() {
        let t0 = Instant::now();
        let mut sched = RepeatScheduler::new();
        sched.start(KeyCode::KeyA, INTERVAL, t0);
        sched.start(KeyCode::ArrowLeft, INTERVAL, t0);

        assert_eq!(sched.stop_all(), 2);
        assert_eq!(sched.active_count(), 0);
        assert!(!sched.stop(KeyCode::KeyA));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let t0 = Instant::now();
        let mut sched = RepeatScheduler::new();

        sched.start(KeyCode::KeyA, Duration::ZERO, t0);

        assert!(sched.due(t0).is_empty());
        assert_eq!(sched.next_deadline(), Some(t0 + MIN_INTERVAL));
    }
}
