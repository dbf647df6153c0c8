//! Focus statistics
//!
//! Summarises the work done by one timer instance:
//! - Completed focus sessions
//! - Total focused time (skipped or reset sessions do not count)

use serde::Serialize;
use studyhub_core::format::hours_minutes;

/// Aggregated focus statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FocusStats {
    /// Focus sessions that ran down to zero
    pub sessions_completed: u32,
    /// Total focus time in whole minutes
    pub focused_minutes: u32,
}

impl FocusStats {
    /// Build statistics from a session count and total focused seconds
    pub fn new(sessions_completed: u32, focused_seconds: u64) -> Self {
        let focused_minutes = u32::try_from(focused_seconds / 60).unwrap_or(u32::MAX);
        Self {
            sessions_completed,
            focused_minutes,
        }
    }

    /// Get total hours and minutes as a tuple
    pub fn total_time(&self) -> (u32, u32) {
        hours_minutes(self.focused_minutes)
    }

    /// Average focus session length in minutes
    pub fn average_minutes(&self) -> u32 {
        if self.sessions_completed == 0 {
            0
        } else {
            self.focused_minutes / self.sessions_completed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimerConfig;
    use crate::engine::PomodoroEngine;

    #[test]
    fn test_empty_stats() {
        let stats = FocusStats::default();
        assert_eq!(stats.sessions_completed, 0);
        assert_eq!(stats.focused_minutes, 0);
        assert_eq!(stats.average_minutes(), 0);
    }

    #[test]
    fn test_total_time() {
        let stats = FocusStats::new(3, 135 * 60);
        assert_eq!(stats.total_time(), (2, 15));
        assert_eq!(stats.average_minutes(), 45);
    }

    #[test]
    fn test_stats_follow_config_changes() {
        let mut engine = PomodoroEngine::new(TimerConfig::new(2, 1));
        engine.start();
        engine.advance(120);

        engine.apply_config(TimerConfig::new(3, 1));
        engine.start();
        engine.advance(180);

        // skipped sessions are not counted
        engine.skip();
        engine.skip();
        engine.start();
        engine.advance(60);
        engine.skip();

        let stats = engine.stats();
        assert_eq!(stats.sessions_completed, 2);
        assert_eq!(stats.focused_minutes, 5);
    }
}
