//! Background purge of expired cache entries.
//!
//! Reads already hide expired snapshots, so the sweeper only reclaims space.
//! It runs on a fixed interval and can be poked to sweep immediately.
//!
//! # Usage
//!
//! ```ignore
//! let sweeper = CacheSweeper::with_config(store.clone(), SweeperConfig::default());
//! let commands = sweeper.command_sender();
//! let handle = sweeper.start();
//! commands.send(SweeperCommand::Stop).await?;
//! handle.await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

use super::SnapshotStore;

/// Configuration for the cache sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to purge (default: 1 hour)
    pub sweep_interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

/// Commands that can be sent to the sweeper.
#[derive(Debug)]
pub enum SweeperCommand {
    /// Purge right away instead of waiting for the next tick
    SweepNow,
    /// Stop the sweeper
    Stop,
}

/// Events emitted by the sweeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweeperEvent {
    /// A purge completed
    Swept { removed: u64 },
    /// Sweeper stopped
    Stopped,
}

/// Periodically deletes expired snapshots from a [`SnapshotStore`].
pub struct CacheSweeper {
    store: Arc<dyn SnapshotStore>,
    config: SweeperConfig,
    command_tx: mpsc::Sender<SweeperCommand>,
    command_rx: mpsc::Receiver<SweeperCommand>,
    event_tx: Option<mpsc::Sender<SweeperEvent>>,
}

impl CacheSweeper {
    #[cfg(test)]
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_config(store, SweeperConfig::default())
    }

    pub fn with_config(store: Arc<dyn SnapshotStore>, config: SweeperConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(8);
        Self {
            store,
            config,
            command_tx,
            command_rx,
            event_tx: None,
        }
    }

    /// Get a sender for commands.
    pub fn command_sender(&self) -> mpsc::Sender<SweeperCommand> {
        self.command_tx.clone()
    }

    /// Set the event sender for receiving updates.
    pub fn set_event_sender(&mut self, tx: mpsc::Sender<SweeperEvent>) {
        self.event_tx = Some(tx);
    }

    /// Start the sweeper background task.
    ///
    /// The task also stops once every command sender has been dropped.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let Self {
            store,
            config,
            command_tx,
            command_rx,
            event_tx,
        } = self;
        drop(command_tx);

        let worker = Worker {
            store,
            config,
            event_tx,
        };
        tokio::spawn(async move { worker.run(command_rx).await })
    }

    /// Run a single purge without starting the loop.
    #[cfg(test)]
    pub async fn sweep_once(&self) -> u64 {
        sweep(self.store.as_ref()).await
    }
}

struct Worker {
    store: Arc<dyn SnapshotStore>,
    config: SweeperConfig,
    event_tx: Option<mpsc::Sender<SweeperEvent>>,
}

impl Worker {
    async fn run(&self, mut command_rx: mpsc::Receiver<SweeperCommand>) {
        let mut timer = interval(self.config.sweep_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            target: "sweeper",
            interval_secs = self.config.sweep_interval.as_secs(),
            "Cache sweeper started"
        );

        loop {
            tokio::select! {
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(SweeperCommand::SweepNow) => {
                            let removed = sweep(self.store.as_ref()).await;
                            self.emit(SweeperEvent::Swept { removed }).await;
                        }
                        Some(SweeperCommand::Stop) | None => {
                            self.emit(SweeperEvent::Stopped).await;
                            tracing::info!(target: "sweeper", "Stopped");
                            break;
                        }
                    }
                }

                _ = timer.tick() => {
                    let removed = sweep(self.store.as_ref()).await;
                    self.emit(SweeperEvent::Swept { removed }).await;
                }
            }
        }
    }

    async fn emit(&self, event: SweeperEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}

/// Purge once, logging failures instead of returning them.
async fn sweep(store: &dyn SnapshotStore) -> u64 {
    match store.purge_expired(Utc::now()).await {
        Ok(removed) => {
            if removed > 0 {
                tracing::info!(target: "sweeper", removed, "Purged expired cache entries");
            } else {
                tracing::debug!(target: "sweeper", "Nothing to purge");
            }
            removed
        }
        Err(e) => {
            tracing::warn!(target: "sweeper", "Purge failed: {}", e);
            0
        }
    }
}
