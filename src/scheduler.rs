//! Periodic refresh driver: one task per subsystem, fixed interval, no
//! overlapping cycles within a subsystem.

use async_trait::async_trait;
use std::time::Duration;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, warn};

/// One independently refreshed aggregate: global stats, tracked-account
/// stats, rich list, or the transfer stream.
#[async_trait]
pub trait Subsystem: Send {
    fn name(&self) -> &'static str;

    /// Runs one refresh cycle: fetch, fold into aggregates, publish.
    async fn refresh(&mut self) -> anyhow::Result<()>;

    /// Called after a failed cycle; the previous aggregate state stays
    /// visible with its stale flag raised.
    fn mark_stale(&mut self);
}

/// Spawns the refresh loop for one subsystem.
///
/// Cycles run inline on the loop, so a subsystem never has more than one
/// outstanding fetch; a tick that fires while a cycle is still running is
/// skipped, not queued. The loop exits when the shutdown flag is raised or
/// its sender is dropped.
pub fn spawn_poller(
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut subsystem: Box<dyn Subsystem>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("{} poller stopped", subsystem.name());
                        return;
                    }
                }
                _ = ticker.tick() => {
                    if *shutdown.borrow() {
                        return;
                    }
                    match subsystem.refresh().await {
                        Ok(()) => debug!("{} refresh complete", subsystem.name()),
                        Err(e) => {
                            warn!("{} refresh failed, keeping stale data: {e:#}", subsystem.name());
                            subsystem.mark_stale();
                        }
                    }
                }
            }
        }
    })
}
