//! Atomic snapshot handoff between the pollers and external consumers.
//!
//! Each subsystem owns a [`SnapshotCell`] and publishes a complete value per
//! successful refresh; consumers hold [`watch::Receiver`]s and can never
//! observe a partially updated structure.

use serde_derive::Serialize;
use tokio::sync::watch;

/// The latest complete view of one subsystem. `version` increments on every
/// successful refresh; `stale` is raised when the most recent cycle failed
/// while `data` retains the last good value.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<T> {
    pub data: T,
    pub version: u64,
    pub stale: bool,
}

pub struct SnapshotCell<T> {
    sender: watch::Sender<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(Snapshot {
            data: initial,
            version: 0,
            stale: false,
        });
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.sender.subscribe()
    }

    pub fn publish(&self, data: T) {
        self.sender.send_modify(|snapshot| {
            snapshot.data = data;
            snapshot.version += 1;
            snapshot.stale = false;
        });
    }

    /// Flags the snapshot as stale after a failed refresh; the previous data
    /// stays visible.
    pub fn mark_stale(&self) {
        self.sender.send_modify(|snapshot| {
            snapshot.stale = true;
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn initial_snapshot_is_version_zero() {
        let cell = SnapshotCell::new(0u32);
        let rx = cell.subscribe();
        let snap = rx.borrow();
        assert_eq!(snap.version, 0);
        assert!(!snap.stale);
    }

    #[test]
    fn publish_bumps_version_and_clears_stale() {
        let cell = SnapshotCell::new(0u32);
        let rx = cell.subscribe();

        cell.publish(7);
        cell.mark_stale();
        cell.publish(9);

        let snap = rx.borrow().clone();
        assert_eq!(snap.data, 9);
        assert_eq!(snap.version, 2);
        assert!(!snap.stale);
    }

    #[test]
    fn stale_flag_retains_previous_data() {
        let cell = SnapshotCell::new(vec!["a".to_string()]);
        let rx = cell.subscribe();

        cell.publish(vec!["b".to_string()]);
        cell.mark_stale();

        let snap = rx.borrow().clone();
        assert_eq!(snap.data, vec!["b".to_string()]);
        assert_eq!(snap.version, 1);
        assert!(snap.stale);
    }
}
