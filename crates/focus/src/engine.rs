//! Pomodoro timer engine
//!
//! A pure in-memory state machine with four states:
//!
//! ```text
//!   IdleFocus --start--> RunningFocus --tick to 0--> RunningBreak
//!       ^                                                 |
//!       +--------------------tick to 0 (stops)------------+
//! ```
//!
//! plus `pause`, `reset`, `skip` and `apply_config`. The engine never looks
//! at a clock. The host calls [`PomodoroEngine::tick`] once per elapsed
//! second while the engine reports it is running, and uses the returned
//! [`TimerEvent`]s to arm or disarm its tick source and to notify the user.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::TimerConfig;
use crate::session::SessionKind;
use crate::stats::FocusStats;

/// Observation emitted by an engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum TimerEvent {
    /// A session of this kind ran down to zero
    SessionCompleted(SessionKind),
    /// The running flag flipped; hosts arm (`true`) or disarm (`false`)
    /// their tick source
    RunningChanged(bool),
}

/// The four states of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    IdleFocus,
    RunningFocus,
    IdleBreak,
    RunningBreak,
}

impl Phase {
    fn of(kind: SessionKind, running: bool) -> Self {
        match (kind, running) {
            (SessionKind::Focus, false) => Phase::IdleFocus,
            (SessionKind::Focus, true) => Phase::RunningFocus,
            (SessionKind::Break, false) => Phase::IdleBreak,
            (SessionKind::Break, true) => Phase::RunningBreak,
        }
    }
}

/// Mutable countdown state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub session_kind: SessionKind,
    pub sessions_completed: u32,
}

/// Read-only view of the engine for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub session_kind: SessionKind,
    pub sessions_completed: u32,
    /// Fraction of the current session already elapsed, in [0, 1]
    pub elapsed_fraction: f64,
    /// Full length of the current session in seconds
    pub total_seconds: u32,
}

impl Snapshot {
    pub fn phase(&self) -> Phase {
        Phase::of(self.session_kind, self.is_running)
    }
}

/// Fraction of a session elapsed, clamped to [0, 1] and 0 for empty sessions
pub fn elapsed_fraction(total_seconds: u32, remaining_seconds: u32) -> f64 {
    if total_seconds == 0 {
        return 0.0;
    }
    let elapsed = f64::from(total_seconds) - f64::from(remaining_seconds);
    (elapsed / f64::from(total_seconds)).clamp(0.0, 1.0)
}

/// Pomodoro timer state machine
#[derive(Debug, Clone)]
pub struct PomodoroEngine {
    config: TimerConfig,
    state: TimerState,
    /// Seconds of naturally completed focus sessions
    focused_seconds: u64,
}

impl Default for PomodoroEngine {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

impl PomodoroEngine {
    /// Create an idle engine at the start of a focus session
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            state: TimerState {
                remaining_seconds: config.seconds_for(SessionKind::Focus),
                is_running: false,
                session_kind: SessionKind::Focus,
                sessions_completed: 0,
            },
            focused_seconds: 0,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        Phase::of(self.state.session_kind, self.state.is_running)
    }

    pub fn snapshot(&self) -> Snapshot {
        let total_seconds = self.total_seconds();
        Snapshot {
            remaining_seconds: self.state.remaining_seconds,
            is_running: self.state.is_running,
            session_kind: self.state.session_kind,
            sessions_completed: self.state.sessions_completed,
            elapsed_fraction: elapsed_fraction(total_seconds, self.state.remaining_seconds),
            total_seconds,
        }
    }

    pub fn stats(&self) -> FocusStats {
        FocusStats::new(self.state.sessions_completed, self.focused_seconds)
    }

    /// Resume the countdown. No-op while already running.
    pub fn start(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.set_running(true, &mut events);
        events
    }

    /// Stop the countdown, keeping the remaining time. No-op while idle.
    pub fn pause(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.set_running(false, &mut events);
        events
    }

    /// Go back to an idle, full-length focus session.
    ///
    /// Any in-progress focus or break time is discarded. The completed
    /// session count is kept.
    pub fn reset(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.set_running(false, &mut events);
        self.enter(SessionKind::Focus);
        debug!(remaining = self.state.remaining_seconds, "timer reset");
        events
    }

    /// Jump to the other session kind without completion credit.
    ///
    /// The timer is left paused at the full length of the new session.
    pub fn skip(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        self.set_running(false, &mut events);
        let next = self.state.session_kind.other();
        self.enter(next);
        debug!(kind = next.as_str(), "session skipped");
        events
    }

    /// Replace the configuration and reset the timer.
    ///
    /// Always discards the in-progress session, including a running break.
    pub fn apply_config(&mut self, config: TimerConfig) -> Vec<TimerEvent> {
        debug!(
            focus_minutes = config.focus_minutes(),
            break_minutes = config.break_minutes(),
            "applying timer config"
        );
        self.config = config;
        self.reset()
    }

    /// Advance the countdown by one second.
    ///
    /// Ignored while idle. The tick that brings the countdown to zero
    /// completes the session in the same call:
    /// - focus completion counts the session and rolls straight into a
    ///   running break
    /// - break completion loads a fresh focus session and stops the timer
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if !self.state.is_running {
            return events;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            self.complete(&mut events);
        }
        events
    }

    /// Apply several ticks at once, for hosts that detect missed ticks.
    ///
    /// Stops early once the engine is no longer running, so a break that
    /// completes mid-batch does not eat into the next focus session.
    pub fn advance(&mut self, ticks: u32) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            if !self.state.is_running {
                break;
            }
            events.extend(self.tick());
        }
        events
    }

    fn total_seconds(&self) -> u32 {
        self.config.seconds_for(self.state.session_kind)
    }

    fn enter(&mut self, kind: SessionKind) {
        self.state.session_kind = kind;
        self.state.remaining_seconds = self.config.seconds_for(kind);
    }

    fn set_running(&mut self, running: bool, events: &mut Vec<TimerEvent>) {
        if self.state.is_running == running {
            return;
        }
        self.state.is_running = running;
        debug!(
            running,
            kind = self.state.session_kind.as_str(),
            remaining = self.state.remaining_seconds,
            "timer running state changed"
        );
        events.push(TimerEvent::RunningChanged(running));
    }

    fn complete(&mut self, events: &mut Vec<TimerEvent>) {
        let finished = self.state.session_kind;
        match finished {
            SessionKind::Focus => {
                self.state.sessions_completed += 1;
                self.focused_seconds += u64::from(self.config.seconds_for(SessionKind::Focus));
                self.enter(SessionKind::Break);
            }
            SessionKind::Break => {
                self.enter(SessionKind::Focus);
            }
        }

        info!(
            kind = finished.as_str(),
            sessions_completed = self.state.sessions_completed,
            "session completed"
        );
        events.push(TimerEvent::SessionCompleted(finished));

        if finished == SessionKind::Break {
            self.set_running(false, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(engine: &mut PomodoroEngine, n: u32) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(engine.tick());
        }
        events
    }

    fn completions(events: &[TimerEvent]) -> Vec<SessionKind> {
        events
            .iter()
            .filter_map(|e| match e {
                TimerEvent::SessionCompleted(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let engine = PomodoroEngine::default();
        let snap = engine.snapshot();
        assert_eq!(snap.remaining_seconds, 1500);
        assert!(!snap.is_running);
        assert_eq!(snap.session_kind, SessionKind::Focus);
        assert_eq!(snap.sessions_completed, 0);
        assert_eq!(snap.elapsed_fraction, 0.0);
        assert_eq!(engine.phase(), Phase::IdleFocus);
    }

    #[test]
    fn test_start_and_pause_emit_running_changes() {
        let mut engine = PomodoroEngine::default();
        assert_eq!(engine.start(), vec![TimerEvent::RunningChanged(true)]);
        assert!(engine.start().is_empty());
        assert_eq!(engine.phase(), Phase::RunningFocus);

        assert_eq!(engine.pause(), vec![TimerEvent::RunningChanged(false)]);
        assert!(engine.pause().is_empty());
        assert_eq!(engine.phase(), Phase::IdleFocus);
    }

    #[test]
    fn test_start_then_pause_keeps_remaining() {
        let mut engine = PomodoroEngine::default();
        engine.start();
        ticks(&mut engine, 42);
        let before = engine.snapshot().remaining_seconds;

        engine.pause();
        engine.start();
        engine.pause();
        assert_eq!(engine.snapshot().remaining_seconds, before);
        assert_eq!(before, 1500 - 42);
    }

    #[test]
    fn test_pause_twice_same_as_once() {
        let mut once = PomodoroEngine::default();
        once.start();
        ticks(&mut once, 10);
        let mut twice = once.clone();

        once.pause();
        twice.pause();
        twice.pause();
        assert_eq!(once.state(), twice.state());
    }

    #[test]
    fn test_tick_ignored_while_idle() {
        let mut engine = PomodoroEngine::default();
        assert!(ticks(&mut engine, 100).is_empty());
        assert_eq!(engine.snapshot().remaining_seconds, 1500);
    }

    #[test]
    fn test_remaining_non_increasing_until_completion() {
        let mut engine = PomodoroEngine::new(TimerConfig::new(1, 1));
        engine.start();
        let mut last = engine.snapshot().remaining_seconds;
        for _ in 0..59 {
            engine.tick();
            let now = engine.snapshot().remaining_seconds;
            assert!(now <= last);
            last = now;
        }
        assert_eq!(last, 1);

        let events = engine.tick();
        assert_eq!(events, vec![TimerEvent::SessionCompleted(SessionKind::Focus)]);
        assert_eq!(engine.snapshot().remaining_seconds, 60);
    }

    #[test]
    fn test_full_cycle() {
        let mut engine = PomodoroEngine::new(TimerConfig::new(25, 5));
        engine.start();

        let events = ticks(&mut engine, 1500);
        assert_eq!(completions(&events), vec![SessionKind::Focus]);
        assert!(!events.contains(&TimerEvent::RunningChanged(false)));
        let snap = engine.snapshot();
        assert_eq!(snap.session_kind, SessionKind::Break);
        assert_eq!(snap.remaining_seconds, 300);
        assert_eq!(snap.sessions_completed, 1);
        assert!(snap.is_running);

        let events = ticks(&mut engine, 300);
        assert_eq!(
            events,
            vec![
                TimerEvent::SessionCompleted(SessionKind::Break),
                TimerEvent::RunningChanged(false),
            ]
        );
        let snap = engine.snapshot();
        assert_eq!(snap.session_kind, SessionKind::Focus);
        assert_eq!(snap.remaining_seconds, 1500);
        assert!(!snap.is_running);
        assert_eq!(snap.sessions_completed, 1);
        assert_eq!(engine.stats().focused_minutes, 25);
    }

    #[test]
    fn test_skip_gives_no_credit() {
        let mut engine = PomodoroEngine::new(TimerConfig::new(25, 5));
        engine.start();
        ticks(&mut engine, 1499);

        let events = engine.skip();
        assert_eq!(events, vec![TimerEvent::RunningChanged(false)]);
        let snap = engine.snapshot();
        assert_eq!(snap.session_kind, SessionKind::Break);
        assert_eq!(snap.remaining_seconds, 300);
        assert!(!snap.is_running);
        assert_eq!(snap.sessions_completed, 0);

        // skipping an idle break goes back to focus without events
        assert!(engine.skip().is_empty());
        assert_eq!(engine.phase(), Phase::IdleFocus);
        assert_eq!(engine.snapshot().remaining_seconds, 1500);
    }

    #[test]
    fn test_reset_returns_to_idle_focus() {
        for (focus, brk) in [(1, 1), (25, 5), (60, 30), (17, 4)] {
            let mut engine = PomodoroEngine::new(TimerConfig::new(focus, brk));
            engine.start();
            ticks(&mut engine, (focus as u32) * 60 + 7);
            assert_eq!(engine.snapshot().session_kind, SessionKind::Break);

            engine.reset();
            let snap = engine.snapshot();
            assert_eq!(snap.remaining_seconds, focus as u32 * 60);
            assert_eq!(snap.session_kind, SessionKind::Focus);
            assert!(!snap.is_running);
            assert_eq!(snap.sessions_completed, 1);
        }
    }

    #[test]
    fn test_apply_config_clamps_and_resets() {
        let mut engine = PomodoroEngine::default();
        engine.start();
        ticks(&mut engine, 1510);
        assert_eq!(engine.phase(), Phase::RunningBreak);

        let events = engine.apply_config(TimerConfig::new(100, 0));
        assert_eq!(events, vec![TimerEvent::RunningChanged(false)]);
        assert_eq!(engine.config().focus_minutes(), 60);
        assert_eq!(engine.config().break_minutes(), 1);
        let snap = engine.snapshot();
        assert_eq!(snap.phase(), Phase::IdleFocus);
        assert_eq!(snap.remaining_seconds, 3600);
        assert_eq!(snap.sessions_completed, 1);
    }

    #[test]
    fn test_elapsed_fraction() {
        assert_eq!(elapsed_fraction(0, 0), 0.0);
        assert_eq!(elapsed_fraction(100, 100), 0.0);
        assert_eq!(elapsed_fraction(100, 25), 0.75);
        assert_eq!(elapsed_fraction(100, 0), 1.0);
        assert_eq!(elapsed_fraction(100, 500), 0.0);

        let mut engine = PomodoroEngine::new(TimerConfig::new(1, 1));
        engine.start();
        ticks(&mut engine, 30);
        assert_eq!(engine.snapshot().elapsed_fraction, 0.5);
    }

    #[test]
    fn test_advance_stops_when_break_ends() {
        let mut engine = PomodoroEngine::new(TimerConfig::new(1, 1));
        engine.start();
        let events = engine.advance(500);
        assert_eq!(completions(&events), vec![SessionKind::Focus, SessionKind::Break]);
        let snap = engine.snapshot();
        assert_eq!(snap.phase(), Phase::IdleFocus);
        assert_eq!(snap.remaining_seconds, 60);

        engine.start();
        engine.advance(10);
        assert_eq!(engine.snapshot().remaining_seconds, 50);
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&TimerEvent::SessionCompleted(SessionKind::Break)).unwrap();
        assert_eq!(json, r#"{"event":"session_completed","value":"break"}"#);
    }
}
