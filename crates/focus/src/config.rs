//! Timer configuration
//!
//! Focus and break lengths are bounded: focus in [1, 60] minutes, break in
//! [1, 30] minutes. Invalid input never fails an operation. Out-of-range
//! values clamp to the nearest bound and non-numeric input falls back to the
//! minimum, with a warning logged for the recovered [`ConfigError`].
//!
//! The optional config file lives at ~/.config/studyhub/focus.json and only
//! seeds the initial configuration. Runtime changes are never written back.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::session::{Preset, SessionKind};

pub const FOCUS_MINUTES_MIN: u32 = 1;
pub const FOCUS_MINUTES_MAX: u32 = 60;
pub const BREAK_MINUTES_MIN: u32 = 1;
pub const BREAK_MINUTES_MAX: u32 = 30;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Step used by the focus +/- controls
pub const FOCUS_STEP: u32 = 5;
/// Step used by the break +/- controls
pub const BREAK_STEP: u32 = 1;

/// A configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FocusMinutes,
    BreakMinutes,
}

impl Field {
    /// Inclusive bounds for this field
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Field::FocusMinutes => (FOCUS_MINUTES_MIN, FOCUS_MINUTES_MAX),
            Field::BreakMinutes => (BREAK_MINUTES_MIN, BREAK_MINUTES_MAX),
        }
    }

    /// Check a value against the bounds
    pub fn check(&self, value: i64) -> Result<u32, ConfigError> {
        let (min, max) = self.bounds();
        if value < i64::from(min) || value > i64::from(max) {
            return Err(ConfigError::OutOfRange {
                field: *self,
                value,
                min,
                max,
            });
        }
        Ok(value as u32)
    }

    /// Clamp a value to the nearest bound
    pub fn clamp(&self, value: i64) -> u32 {
        let (min, max) = self.bounds();
        value.clamp(i64::from(min), i64::from(max)) as u32
    }

    /// Parse user input as whole minutes.
    ///
    /// Fractional input is truncated toward zero. Input that is not a finite
    /// number is rejected.
    pub fn parse(&self, input: &str) -> Result<i64, ConfigError> {
        let trimmed = input.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(value);
        }
        match trimmed.parse::<f64>() {
            // `as` saturates, so huge values still clamp to the right bound
            Ok(value) if value.is_finite() => Ok(value.trunc() as i64),
            _ => Err(ConfigError::NotANumber {
                field: *self,
                input: input.to_string(),
            }),
        }
    }

    /// Resolve a raw value, recovering any error by clamping
    fn resolve(&self, value: i64) -> u32 {
        match self.check(value) {
            Ok(minutes) => minutes,
            Err(e) => {
                let clamped = self.clamp(value);
                warn!(error = %e, clamped, "clamped timer setting");
                clamped
            }
        }
    }

    /// Resolve user input, falling back to the minimum for non-numeric text
    fn resolve_input(&self, input: &str) -> u32 {
        match self.parse(input) {
            Ok(value) => self.resolve(value),
            Err(e) => {
                let (min, _) = self.bounds();
                warn!(error = %e, fallback = min, "ignored timer setting");
                min
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::FocusMinutes => write!(f, "focus minutes"),
            Field::BreakMinutes => write!(f, "break minutes"),
        }
    }
}

/// Invalid timer configuration.
///
/// Never surfaced as a failure by the engine; every constructor except
/// [`TimerConfig::try_new`] recovers from it by clamping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: Field,
        value: i64,
        min: u32,
        max: u32,
    },

    #[error("{field} is not a number: {input:?}")]
    NotANumber { field: Field, input: String },
}

/// Validated focus and break lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerConfig {
    focus_minutes: u32,
    break_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl TimerConfig {
    /// Create a config, clamping out-of-range values
    pub fn new(focus_minutes: i64, break_minutes: i64) -> Self {
        Self {
            focus_minutes: Field::FocusMinutes.resolve(focus_minutes),
            break_minutes: Field::BreakMinutes.resolve(break_minutes),
        }
    }

    /// Create a config, rejecting out-of-range values
    pub fn try_new(focus_minutes: i64, break_minutes: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            focus_minutes: Field::FocusMinutes.check(focus_minutes)?,
            break_minutes: Field::BreakMinutes.check(break_minutes)?,
        })
    }

    /// Create a config from raw text input (non-numeric input becomes 1)
    pub fn parse(focus_minutes: &str, break_minutes: &str) -> Self {
        Self {
            focus_minutes: Field::FocusMinutes.resolve_input(focus_minutes),
            break_minutes: Field::BreakMinutes.resolve_input(break_minutes),
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self {
            focus_minutes: preset.focus_minutes(),
            break_minutes: preset.break_minutes(),
        }
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    /// Full length in seconds of a session of the given kind
    pub fn seconds_for(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Focus => self.focus_minutes * 60,
            SessionKind::Break => self.break_minutes * 60,
        }
    }
}

/// Editable copy of the settings, as shown in a settings panel.
///
/// Edits stay local to the draft until it is handed to
/// [`PomodoroEngine::apply_config`](crate::engine::PomodoroEngine::apply_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsDraft {
    focus_minutes: u32,
    break_minutes: u32,
}

impl SettingsDraft {
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            focus_minutes: config.focus_minutes,
            break_minutes: config.break_minutes,
        }
    }

    pub fn increase_focus(&mut self) {
        self.focus_minutes = (self.focus_minutes + FOCUS_STEP).min(FOCUS_MINUTES_MAX);
    }

    pub fn decrease_focus(&mut self) {
        self.focus_minutes = self
            .focus_minutes
            .saturating_sub(FOCUS_STEP)
            .max(FOCUS_MINUTES_MIN);
    }

    pub fn increase_break(&mut self) {
        self.break_minutes = (self.break_minutes + BREAK_STEP).min(BREAK_MINUTES_MAX);
    }

    pub fn decrease_break(&mut self) {
        self.break_minutes = self
            .break_minutes
            .saturating_sub(BREAK_STEP)
            .max(BREAK_MINUTES_MIN);
    }

    /// Set focus minutes from typed input
    pub fn set_focus_input(&mut self, input: &str) {
        self.focus_minutes = Field::FocusMinutes.resolve_input(input);
    }

    /// Set break minutes from typed input
    pub fn set_break_input(&mut self, input: &str) {
        self.break_minutes = Field::BreakMinutes.resolve_input(input);
    }

    pub fn use_preset(&mut self, preset: Preset) {
        self.focus_minutes = preset.focus_minutes();
        self.break_minutes = preset.break_minutes();
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn to_config(&self) -> TimerConfig {
        TimerConfig {
            focus_minutes: self.focus_minutes,
            break_minutes: self.break_minutes,
        }
    }
}

/// On-disk config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Focus session length in minutes
    #[serde(default)]
    pub focus_minutes: Option<i64>,

    /// Break session length in minutes
    #[serde(default)]
    pub break_minutes: Option<i64>,

    /// Preset applied before the explicit lengths above
    #[serde(default)]
    pub preset: Option<Preset>,
}

impl ConfigFile {
    /// Load the config file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve into a validated timer config.
    ///
    /// Lengths written in the file always win over the preset.
    pub fn timer_config(&self) -> TimerConfig {
        let base = self.preset.map(TimerConfig::from_preset).unwrap_or_default();
        TimerConfig::new(
            self.focus_minutes
                .unwrap_or_else(|| i64::from(base.focus_minutes)),
            self.break_minutes
                .unwrap_or_else(|| i64::from(base.break_minutes)),
        )
    }
}
