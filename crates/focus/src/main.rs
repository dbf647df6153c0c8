//! focus - Pomodoro timer for study sessions
//!
//! Usage:
//!   focus run                   Run an interactive 25/5 timer
//!   focus run --preset long     Run with the 50/10 preset
//!   focus run --focus 40 --break 8
//!   focus presets               List the built-in presets
//!   focus config                Show the effective configuration

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::Path;
use studyhub_core::format::{clock, progress_bar};
use studyhub_core::Paths;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use focus::config::{ConfigFile, SettingsDraft, TimerConfig};
use focus::driver::{TimerDriver, TimerHandle};
use focus::engine::{PomodoroEngine, Snapshot, TimerEvent};
use focus::session::{Preset, SessionKind};

/// Focus - Pomodoro timer for study sessions
#[derive(Parser)]
#[command(name = "focus")]
#[command(about = "Pomodoro timer for study sessions")]
#[command(version)]
#[command(after_help = r#"PRESETS:
    classic    25 min focus, 5 min break (default)
    long       50 min focus, 10 min break
    short      15 min focus, 3 min break

CONFIG:
    Defaults are read from ~/.config/studyhub/focus.json:
        {"focus_minutes": 25, "break_minutes": 5}
    Focus is limited to 1-60 minutes and break to 1-30 minutes.
    Out-of-range values are clamped.

EXAMPLES:
    focus run                   # Classic pomodoro
    focus run --preset short    # 15/3 sprints
    focus run --focus 45        # Custom focus length
    RUST_LOG=focus=debug focus run
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive timer
    #[command(alias = "r")]
    Run {
        /// Focus length in minutes (1-60)
        #[arg(long = "focus", value_name = "MINS", allow_negative_numbers = true)]
        focus_minutes: Option<i64>,

        /// Break length in minutes (1-30)
        #[arg(long = "break", value_name = "MINS", allow_negative_numbers = true)]
        break_minutes: Option<i64>,

        /// Start from a preset (classic, long, short)
        #[arg(long, value_parser = parse_preset)]
        preset: Option<Preset>,
    },

    /// List the built-in presets
    Presets,

    /// Show the effective configuration
    Config,
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    Preset::from_str(s).ok_or_else(|| format!("unknown preset '{}' (classic, long, short)", s))
}

// ANSI color codes
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[0;33m";
const CYAN: &str = "\x1b[0;36m";
const MAGENTA: &str = "\x1b[0;35m";
const BOLD: &str = "\x1b[1m";
const NC: &str = "\x1b[0m";

/// Check if stdout is a TTY and colors should be used
fn use_colors() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

/// Conditionally apply color
fn color(code: &str, text: &str) -> String {
    if use_colors() {
        format!("{}{}{}", code, text, NC)
    } else {
        text.to_string()
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the status line
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let config_path = paths.config_file("focus");

    match cli.command {
        Some(Commands::Run {
            focus_minutes,
            break_minutes,
            preset,
        }) => {
            let config = resolve_config(&config_path, focus_minutes, break_minutes, preset)?;
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(cmd_run(config));
            // a stdin read may still be parked on a blocking thread
            rt.shutdown_background();
            result
        }
        Some(Commands::Presets) => cmd_presets(),
        Some(Commands::Config) | None => cmd_config(&config_path),
    }
}

/// Combine the config file with command line overrides
fn resolve_config(
    path: &Path,
    focus_minutes: Option<i64>,
    break_minutes: Option<i64>,
    preset: Option<Preset>,
) -> Result<TimerConfig> {
    let base = match preset {
        Some(preset) => TimerConfig::from_preset(preset),
        None => ConfigFile::load(path)?.timer_config(),
    };

    Ok(TimerConfig::new(
        focus_minutes.unwrap_or_else(|| i64::from(base.focus_minutes())),
        break_minutes.unwrap_or_else(|| i64::from(base.break_minutes())),
    ))
}

/// A line typed by the user during `focus run`
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Start,
    Pause,
    Reset,
    Skip,
    /// Apply focus and break lengths as typed
    Configure(String, String),
    Preset(Preset),
    FocusUp,
    FocusDown,
    BreakUp,
    BreakDown,
    /// Apply the edited settings
    Apply,
    Settings,
    Stats,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Input::Empty;
    };

    match command.to_lowercase().as_str() {
        "s" | "start" => Input::Start,
        "p" | "pause" => Input::Pause,
        "r" | "reset" => Input::Reset,
        "k" | "skip" => Input::Skip,
        "c" | "config" => {
            let focus = words.next().unwrap_or_default().to_string();
            let brk = words.next().unwrap_or_default().to_string();
            Input::Configure(focus, brk)
        }
        "preset" => match words.next().and_then(Preset::from_str) {
            Some(preset) => Input::Preset(preset),
            None => Input::Unknown(line.trim().to_string()),
        },
        "f+" => Input::FocusUp,
        "f-" => Input::FocusDown,
        "b+" => Input::BreakUp,
        "b-" => Input::BreakDown,
        "a" | "apply" => Input::Apply,
        "settings" => Input::Settings,
        "stats" => Input::Stats,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line.trim().to_string()),
    }
}

fn print_help() {
    println!();
    println!("  {}         start / resume", color(CYAN, "s"));
    println!("  {}         pause", color(CYAN, "p"));
    println!("  {}         reset to a fresh focus session", color(CYAN, "r"));
    println!("  {}         skip to the next session", color(CYAN, "k"));
    println!("  {}   apply focus/break minutes", color(CYAN, "c F B"));
    println!("  {} apply a preset", color(CYAN, "preset N"));
    println!("  {} adjust focus by 5 / break by 1", color(CYAN, "f+ f- b+ b-"));
    println!("  {}         apply adjusted settings", color(CYAN, "a"));
    println!("  {}  show adjusted settings", color(CYAN, "settings"));
    println!("  {}     show statistics", color(CYAN, "stats"));
    println!("  {}         quit", color(CYAN, "q"));
    println!();
}

/// Run an interactive timer until the user quits or stdin closes
async fn cmd_run(config: TimerConfig) -> Result<()> {
    let (handle, task) = TimerDriver::spawn(PomodoroEngine::new(config));
    let mut events = handle.subscribe();
    let mut snapshots = handle.watch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut draft = SettingsDraft::new(&config);

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "FOCUS MODE"));
    println!();
    println!("  {}  {} minutes", color(CYAN, "Focus:"), config.focus_minutes());
    println!("  {}  {} minutes", color(CYAN, "Break:"), config.break_minutes());
    println!();
    println!("Type 's' to start, 'h' for help, 'q' to quit");
    render(&snapshots.borrow_and_update());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    Input::Quit => break,
                    input => handle_input(&handle, &mut draft, input).await?,
                }
            }
            event = events.recv() => match event {
                Ok(TimerEvent::SessionCompleted(kind)) => announce(kind),
                Ok(TimerEvent::RunningChanged(_)) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed timer events"),
                Err(RecvError::Closed) => break,
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = *snapshots.borrow_and_update();
                render(&snap);
            }
        }
    }

    let stats = handle.stats().await?;
    handle.shutdown().await;
    task.await.context("Timer driver panicked")?;

    let (hours, mins) = stats.total_time();
    println!();
    println!();
    println!("{}", color(BOLD, "Session summary"));
    println!("  {}  {}", color(CYAN, "Sessions completed:"), stats.sessions_completed);
    println!("  {}     {}h {}m", color(CYAN, "Minutes focused:"), hours, mins);

    Ok(())
}

async fn handle_input(handle: &TimerHandle, draft: &mut SettingsDraft, input: Input) -> Result<()> {
    match input {
        Input::Start => {
            let snap = handle.start().await?;
            let end_time: DateTime<Local> =
                Local::now() + chrono::Duration::seconds(i64::from(snap.remaining_seconds));
            println!();
            println!(
                "{} {} running, ends at {}",
                color(GREEN, "[ok]"),
                snap.session_kind.label(),
                end_time.format("%H:%M")
            );
        }
        Input::Pause => {
            handle.pause().await?;
        }
        Input::Reset => {
            handle.reset().await?;
        }
        Input::Skip => {
            handle.skip().await?;
        }
        Input::Configure(focus, brk) => {
            draft.set_focus_input(&focus);
            draft.set_break_input(&brk);
            apply(handle, draft).await?;
        }
        Input::Preset(preset) => {
            draft.use_preset(preset);
            apply(handle, draft).await?;
        }
        Input::FocusUp => {
            draft.increase_focus();
            print_draft(draft);
        }
        Input::FocusDown => {
            draft.decrease_focus();
            print_draft(draft);
        }
        Input::BreakUp => {
            draft.increase_break();
            print_draft(draft);
        }
        Input::BreakDown => {
            draft.decrease_break();
            print_draft(draft);
        }
        Input::Apply => {
            apply(handle, draft).await?;
        }
        Input::Settings => print_draft(draft),
        Input::Stats => {
            let stats = handle.stats().await?;
            println!();
            println!(
                "{} {} sessions, {} minutes focused",
                color(CYAN, "[stats]"),
                stats.sessions_completed,
                stats.focused_minutes
            );
        }
        Input::Help => print_help(),
        Input::Unknown(text) => {
            println!();
            println!("{} Unknown command: {} (h for help)", color(YELLOW, "[?]"), text);
        }
        Input::Empty | Input::Quit => {}
    }
    Ok(())
}

async fn apply(handle: &TimerHandle, draft: &SettingsDraft) -> Result<()> {
    let config = draft.to_config();
    handle.apply_config(config).await?;
    println!();
    println!(
        "{} Timer reset to {}/{} minutes",
        color(GREEN, "[ok]"),
        config.focus_minutes(),
        config.break_minutes()
    );
    Ok(())
}

fn print_draft(draft: &SettingsDraft) {
    println!();
    println!(
        "{} focus {} min, break {} min ('a' to apply)",
        color(CYAN, "[settings]"),
        draft.focus_minutes(),
        draft.break_minutes()
    );
}

fn announce(kind: SessionKind) {
    let message = match kind {
        SessionKind::Focus => "Focus session completed! Time for a break!",
        SessionKind::Break => "Break is over! Ready for another focus session?",
    };
    println!();
    println!("{}", color(&format!("{}{}", BOLD, GREEN), message));
}

fn status_line(snap: &Snapshot) -> String {
    let state = if snap.is_running { "running" } else { "paused" };
    format!(
        "{} {} [{}] {} | sessions: {}",
        snap.session_kind.label(),
        clock(snap.remaining_seconds),
        progress_bar(snap.elapsed_fraction, 20),
        state,
        snap.sessions_completed
    )
}

/// Redraw the status line in place on a terminal
fn render(snap: &Snapshot) {
    let line = status_line(snap);
    if use_colors() {
        let code = match snap.session_kind {
            SessionKind::Focus => MAGENTA,
            SessionKind::Break => GREEN,
        };
        print!("\r\x1b[2K{}", color(code, &line));
        let _ = std::io::stdout().flush();
    } else {
        println!("{}", line);
    }
}

/// List presets
fn cmd_presets() -> Result<()> {
    println!("{}Presets{}", BOLD, NC);
    println!();
    for preset in Preset::ALL {
        println!(
            "  {:<8} {:>2}/{:<2}  {}",
            color(CYAN, preset.as_str()),
            preset.focus_minutes(),
            preset.break_minutes(),
            preset.description()
        );
    }
    Ok(())
}

/// Show the effective configuration
fn cmd_config(path: &Path) -> Result<()> {
    let file = ConfigFile::load(path)?;
    let config = file.timer_config();

    println!("{}Focus Configuration{}", BOLD, NC);
    println!();
    println!("  {}   {}", color(CYAN, "Config file:"), path.display());
    if !path.exists() {
        println!("                (not found, using defaults)");
    }
    if let Some(preset) = file.preset {
        println!("  {}        {}", color(CYAN, "Preset:"), preset.as_str());
    }
    println!("  {}         {} minutes", color(CYAN, "Focus:"), config.focus_minutes());
    println!("  {}         {} minutes", color(CYAN, "Break:"), config.break_minutes());

    Ok(())
}
