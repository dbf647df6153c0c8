//! focus - Pomodoro timer for study sessions
//!
//! "One session at a time."
//!
//! The timer alternates focus and break sessions:
//! - A finished focus session is counted and rolls straight into a break
//! - A finished break loads the next focus session and waits for the user
//! - Skipping moves to the other session without credit
//! - Changing the settings always restarts from a fresh focus session
//!
//! [`PomodoroEngine`] is the pure state machine. [`TimerDriver`] hosts it on
//! tokio and feeds it one tick per second while it is running.

pub mod config;
pub mod driver;
pub mod engine;
pub mod session;
pub mod stats;

pub use config::{ConfigError, ConfigFile, SettingsDraft, TimerConfig};
pub use driver::{TimerDriver, TimerHandle};
pub use engine::{Phase, PomodoroEngine, Snapshot, TimerEvent, TimerState};
pub use session::{Preset, SessionKind};
pub use stats::FocusStats;
