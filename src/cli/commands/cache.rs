//! Cache maintenance commands.

use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use super::open_store;
use crate::cache::{CacheSweeper, SnapshotStore, SweeperCommand, SweeperEvent};
use crate::config::Config;

/// Delete expired cache entries now
pub fn cmd_purge(rt: &Runtime, settings: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = open_store(settings).await?;
        let removed = store.purge_expired(Utc::now()).await?;
        println!("Removed {} expired entr{}", removed, if removed == 1 { "y" } else { "ies" });
        Ok::<_, anyhow::Error>(())
    })
}

/// Show cache statistics
pub fn cmd_stats(rt: &Runtime, settings: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = open_store(settings).await?;
        let live = store.count().await?;
        let expired = store.count_expired(Utc::now()).await?;

        println!("Metadata Cache");
        println!("==============");
        println!("Database:        {}", settings.cache.database.display());
        println!("Live entries:    {}", live);
        println!("Awaiting purge:  {}", expired);
        println!("TTL:             {}", describe_secs(settings.cache.ttl_secs));
        Ok::<_, anyhow::Error>(())
    })
}

/// Run the sweeper in the foreground until Ctrl-C
pub fn cmd_sweep(rt: &Runtime, settings: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = open_store(settings).await?;
        let mut sweeper = CacheSweeper::with_config(Arc::new(store), settings.sweeper_config());

        let (event_tx, mut event_rx) = mpsc::channel(16);
        sweeper.set_event_sender(event_tx);
        let commands = sweeper.command_sender();
        let handle = sweeper.start();

        println!(
            "Sweeping every {} (Ctrl-C to stop)",
            describe_secs(settings.cache.sweep_interval_secs)
        );

        let mut total = 0u64;
        loop {
            tokio::select! {
                event = event_rx.recv() => match event {
                    Some(SweeperEvent::Swept { removed }) => {
                        total += removed;
                        if removed > 0 {
                            println!("Removed {} expired entries", removed);
                        }
                    }
                    Some(SweeperEvent::Stopped) | None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    let _ = commands.send(SweeperCommand::Stop).await;
                }
            }
        }

        handle.await?;
        println!("Sweeper stopped after removing {} entries", total);
        Ok::<_, anyhow::Error>(())
    })
}

/// Seconds in the largest whole unit that fits.
fn describe_secs(secs: u64) -> String {
    const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];
    UNITS
        .iter()
        .find(|(size, _)| secs >= *size && secs % size == 0)
        .map(|(size, unit)| format!("{}{}", secs / size, unit))
        .unwrap_or_else(|| format!("{}s", secs))
}
