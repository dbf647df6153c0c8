//! Async host for a [`PomodoroEngine`]
//!
//! The driver task owns the engine, so every command and tick is applied one
//! at a time without locking. Hosts talk to it through a cloneable
//! [`TimerHandle`]:
//! - commands go over an mpsc channel and are acknowledged with the
//!   resulting snapshot
//! - the latest [`Snapshot`] is published on a watch channel
//! - [`TimerEvent`]s are published on a broadcast channel
//!
//! The 1 Hz interval only exists while the engine is running. It is created
//! when the engine reports `RunningChanged(true)` and dropped on
//! `RunningChanged(false)`.

use anyhow::{anyhow, Result};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, trace};

use crate::config::TimerConfig;
use crate::engine::{PomodoroEngine, Snapshot, TimerEvent};
use crate::stats::FocusStats;

/// Time represented by one engine tick
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

#[derive(Debug)]
enum Op {
    Start,
    Pause,
    Reset,
    Skip,
    ApplyConfig(TimerConfig),
}

#[derive(Debug)]
enum Command {
    Engine {
        op: Op,
        reply: oneshot::Sender<Snapshot>,
    },
    Stats(oneshot::Sender<FocusStats>),
    Shutdown,
}

/// Cloneable handle to a running timer driver
#[derive(Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    events: broadcast::Sender<TimerEvent>,
}

impl TimerHandle {
    pub async fn start(&self) -> Result<Snapshot> {
        self.send(Op::Start).await
    }

    pub async fn pause(&self) -> Result<Snapshot> {
        self.send(Op::Pause).await
    }

    pub async fn reset(&self) -> Result<Snapshot> {
        self.send(Op::Reset).await
    }

    pub async fn skip(&self) -> Result<Snapshot> {
        self.send(Op::Skip).await
    }

    pub async fn apply_config(&self, config: TimerConfig) -> Result<Snapshot> {
        self.send(Op::ApplyConfig(config)).await
    }

    pub async fn stats(&self) -> Result<FocusStats> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Stats(reply))
            .await
            .map_err(|_| anyhow!("Timer driver has stopped"))?;
        rx.await.map_err(|_| anyhow!("Timer driver dropped the request"))
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        *self.snapshots.borrow()
    }

    /// Receiver that wakes on every snapshot change
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Receiver for completion and running-state events
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    /// Stop the driver task. Later commands fail.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn send(&self, op: Op) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Engine { op, reply })
            .await
            .map_err(|_| anyhow!("Timer driver has stopped"))?;
        rx.await.map_err(|_| anyhow!("Timer driver dropped the request"))
    }
}

/// Task that owns an engine and feeds it ticks
pub struct TimerDriver {
    engine: PomodoroEngine,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<Snapshot>,
    events: broadcast::Sender<TimerEvent>,
    ticker: Option<Interval>,
}

impl TimerDriver {
    /// Spawn a driver for `engine` on the current tokio runtime.
    ///
    /// The task ends on [`TimerHandle::shutdown`] or once every handle has
    /// been dropped.
    pub fn spawn(engine: PomodoroEngine) -> (TimerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let ticker = engine.snapshot().is_running.then(new_ticker);
        let driver = TimerDriver {
            engine,
            commands: command_rx,
            snapshots: snapshot_tx,
            events: event_tx.clone(),
            ticker,
        };

        let handle = TimerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_tx,
        };

        (handle, tokio::spawn(driver.run()))
    }

    async fn run(mut self) {
        debug!("timer driver started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = next_tick(&mut self.ticker) => {
                    trace!("tick");
                    let events = self.engine.tick();
                    self.publish(events);
                }
            }
        }
        debug!("timer driver stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Engine { op, reply } => {
                let events = match op {
                    Op::Start => self.engine.start(),
                    Op::Pause => self.engine.pause(),
                    Op::Reset => self.engine.reset(),
                    Op::Skip => self.engine.skip(),
                    Op::ApplyConfig(config) => self.engine.apply_config(config),
                };
                self.publish(events);
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Stats(reply) => {
                let _ = reply.send(self.engine.stats());
            }
            Command::Shutdown => {}
        }
    }

    /// Re-arm the ticker as needed, then fan out events and the snapshot
    fn publish(&mut self, events: Vec<TimerEvent>) {
        for event in events {
            if let TimerEvent::RunningChanged(running) = event {
                self.ticker = running.then(new_ticker);
            }
            // no subscribers is fine, the engine has already transitioned
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(self.engine.snapshot());
    }
}

/// First tick lands one full period after arming
fn new_ticker() -> Interval {
    let mut ticker = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKind;

    #[tokio::test(start_paused = true)]
    async fn test_commands_return_snapshots() {
        let (handle, _task) = TimerDriver::spawn(PomodoroEngine::default());

        let snap = handle.start().await.unwrap();
        assert!(snap.is_running);
        assert_eq!(snap.remaining_seconds, 1500);

        let snap = handle.skip().await.unwrap();
        assert_eq!(snap.session_kind, SessionKind::Break);
        assert!(!snap.is_running);
        assert_eq!(handle.snapshot(), snap);

        let snap = handle.apply_config(TimerConfig::new(100, 0)).await.unwrap();
        assert_eq!(snap.remaining_seconds, 3600);
        assert_eq!(snap.session_kind, SessionKind::Focus);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_only_while_running() {
        let (handle, _task) = TimerDriver::spawn(PomodoroEngine::default());

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.snapshot().remaining_seconds, 1500);

        handle.start().await.unwrap();
        time::sleep(Duration::from_millis(10_500)).await;
        let snap = handle.pause().await.unwrap();
        assert_eq!(snap.remaining_seconds, 1490);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(handle.snapshot().remaining_seconds, 1490);

        handle.start().await.unwrap();
        time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(handle.snapshot().remaining_seconds, 1485);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cycle_events() {
        let (handle, _task) = TimerDriver::spawn(PomodoroEngine::new(TimerConfig::new(1, 1)));
        let mut events = handle.subscribe();

        handle.start().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), TimerEvent::RunningChanged(true));
        assert_eq!(
            events.recv().await.unwrap(),
            TimerEvent::SessionCompleted(SessionKind::Focus)
        );
        assert_eq!(handle.snapshot().session_kind, SessionKind::Break);
        assert!(handle.snapshot().is_running);

        assert_eq!(
            events.recv().await.unwrap(),
            TimerEvent::SessionCompleted(SessionKind::Break)
        );
        assert_eq!(events.recv().await.unwrap(), TimerEvent::RunningChanged(false));

        let snap = handle.snapshot();
        assert_eq!(snap.session_kind, SessionKind::Focus);
        assert_eq!(snap.remaining_seconds, 60);
        assert!(!snap.is_running);

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.sessions_completed, 1);
        assert_eq!(stats.focused_minutes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_sees_every_tick() {
        let (handle, _task) = TimerDriver::spawn(PomodoroEngine::default());
        let mut snapshots = handle.watch();

        handle.start().await.unwrap();
        snapshots.borrow_and_update();
        for expected in [1499, 1498, 1497] {
            snapshots.changed().await.unwrap();
            assert_eq!(snapshots.borrow_and_update().remaining_seconds, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_driver() {
        let (handle, task) = TimerDriver::spawn(PomodoroEngine::default());
        handle.shutdown().await;
        task.await.unwrap();
        assert!(handle.start().await.is_err());
    }
}
