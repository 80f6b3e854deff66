//! Cooldown tracker - per command and channel throttling

use std::collections::HashMap;
use std::time::Instant;

use crate::domain::entities::{CooldownPolicy, Level};

/// Last accepted invocation of each (command, channel). Lives in memory only.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    last_used: HashMap<(String, String), Instant>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, command_id: &str, channel: &str, level: Level, policy: &CooldownPolicy) -> bool {
        self.check_at(command_id, channel, level, policy, Instant::now())
    }

    /// True if nothing was marked yet, or the window for `level` has elapsed by `now`.
    pub fn check_at(
        &self,
        command_id: &str,
        channel: &str,
        level: Level,
        policy: &CooldownPolicy,
        now: Instant,
    ) -> bool {
        let window = policy.duration_for(level);
        if window.is_zero() {
            return true;
        }
        match self.last_used.get(&(command_id.to_string(), channel.to_string())) {
            Some(last) => now.saturating_duration_since(*last) >= window,
            None => true,
        }
    }

    /// Records a successful invocation. Call only once the handler has succeeded.
    pub fn mark(&mut self, command_id: &str, channel: &str) {
        self.mark_at(command_id, channel, Instant::now());
    }

    pub fn mark_at(&mut self, command_id: &str, channel: &str, now: Instant) {
        self.last_used
            .insert((command_id.to_string(), channel.to_string()), now);
    }

    pub fn len(&self) -> usize {
        self.last_used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_used.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn unmarked_command_passes() {
        let tracker = CooldownTracker::new();
        assert!(tracker.check("quote", "chan", Level::Everyone, &CooldownPolicy::default()));
        assert!(tracker.is_empty());
    }

    #[test]
    fn accepted_iff_elapsed_reaches_window() {
        let mut tracker = CooldownTracker::new();
        let policy = CooldownPolicy::from_secs(5, 30);
        let t0 = Instant::now();
        tracker.mark_at("quote", "chan", t0);

        let almost = t0 + Duration::from_secs(30) - Duration::from_millis(1);
        assert!(!tracker.check_at("quote", "chan", Level::Everyone, &policy, almost));
        assert!(tracker.check_at("quote", "chan", Level::Everyone, &policy, t0 + Duration::from_secs(30)));

        assert!(!tracker.check_at("quote", "chan", Level::Moderator, &policy, t0 + Duration::from_secs(4)));
        assert!(tracker.check_at("quote", "chan", Level::Broadcaster, &policy, t0 + Duration::from_secs(5)));
    }

    #[test]
    fn zero_window_always_passes() {
        let mut tracker = CooldownTracker::new();
        let policy = CooldownPolicy::from_secs(0, 30);
        let t0 = Instant::now();
        tracker.mark_at("d", "chan", t0);
        assert!(tracker.check_at("d", "chan", Level::Moderator, &policy, t0));
        assert!(!tracker.check_at("d", "chan", Level::Subscriber, &policy, t0));
        assert!(tracker.check_at("d", "chan", Level::Everyone, &CooldownPolicy::none(), t0));
    }

    #[test]
    fn windows_are_scoped_per_channel_and_command() {
        let mut tracker = CooldownTracker::new();
        let policy = CooldownPolicy::default();
        let t0 = Instant::now();
        tracker.mark_at("quote", "chan", t0);
        assert!(tracker.check_at("quote", "other", Level::Everyone, &policy, t0));
        assert!(tracker.check_at("quotes", "chan", Level::Everyone, &policy, t0));
        assert!(!tracker.check_at("quote", "chan", Level::Everyone, &policy, t0));
    }
}
