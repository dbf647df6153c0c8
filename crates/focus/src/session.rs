//! Session kinds and timer presets
//!
//! A focus timer alternates between two kinds of session: focus (work) and
//! break (rest). Presets bundle a focus length with a matching break length.

use serde::{Deserialize, Serialize};

/// Kind of countdown the timer is running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Work interval
    #[default]
    Focus,
    /// Rest interval following a focus session
    Break,
}

impl SessionKind {
    /// The kind that follows this one
    pub fn other(&self) -> Self {
        match self {
            SessionKind::Focus => SessionKind::Break,
            SessionKind::Break => SessionKind::Focus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::Break => "break",
        }
    }

    /// Human readable label for status displays
    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::Focus => "Focus Time",
            SessionKind::Break => "Break Time",
        }
    }
}

/// Built-in timer presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Classic: 25 min focus, 5 min break
    Classic,
    /// Long: 50 min focus, 10 min break
    Long,
    /// Short: 15 min focus, 3 min break
    Short,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Classic, Preset::Long, Preset::Short];

    /// Focus duration in minutes for this preset
    pub fn focus_minutes(&self) -> u32 {
        match self {
            Preset::Classic => 25,
            Preset::Long => 50,
            Preset::Short => 15,
        }
    }

    /// Break duration in minutes for this preset
    pub fn break_minutes(&self) -> u32 {
        match self {
            Preset::Classic => 5,
            Preset::Long => 10,
            Preset::Short => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Long => "long",
            Preset::Short => "short",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Some(Preset::Classic),
            "long" => Some(Preset::Long),
            "short" => Some(Preset::Short),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Classic => "The standard Pomodoro rhythm",
            Preset::Long => "Longer stretches for deep study",
            Preset::Short => "Quick sprints for small tasks",
        }
    }
}
