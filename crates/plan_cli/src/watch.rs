//! Recompute the plan whenever the inventory file settles after a change.

use anyhow::Result;
use plan_core::Debouncer;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

/// `None` while the file is missing.
pub fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let meta = std::fs::metadata(path).ok()?;
    Some(Fingerprint {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}

pub struct InventoryWatch {
    path: PathBuf,
    last: Option<Fingerprint>,
    debouncer: Debouncer,
}

impl InventoryWatch {
    pub fn new(path: PathBuf, debouncer: Debouncer) -> Self {
        let last = fingerprint(&path);
        Self {
            path,
            last,
            debouncer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Feeds one observation. Returns true when a recompute is due.
    pub fn observe(&mut self, current: Option<Fingerprint>, now: Instant) -> bool {
        if current != self.last {
            self.last = current;
            self.debouncer.schedule(now);
        }
        self.debouncer.poll(now)
    }

    pub fn check(&mut self, now: Instant) -> bool {
        let current = fingerprint(&self.path);
        self.observe(current, now)
    }
}

/// Polls on a `tokio` interval and calls `recompute` once per settled change.
/// Stops after `max_runs` recomputes when given.
pub async fn run<F>(
    mut watch: InventoryWatch,
    poll: Duration,
    max_runs: Option<u64>,
    mut recompute: F,
) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    let mut interval = tokio::time::interval(poll);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    tracing::info!(path = %watch.path().display(), poll_ms = poll.as_millis(), "watching inventory");

    let mut runs = 0;
    while max_runs.is_none_or(|max| runs < max) {
        interval.tick().await;
        if !watch.check(Instant::now()) {
            continue;
        }
        runs += 1;
        if let Err(err) = recompute(watch.path()) {
            // A half-written file parses badly; the next write retriggers.
            tracing::warn!(error = %err, "recompute failed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(len: u64) -> Option<Fingerprint> {
        Some(Fingerprint {
            modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(len)),
            len,
        })
    }

    fn watch() -> InventoryWatch {
        InventoryWatch {
            path: PathBuf::from("inventory.json"),
            last: stamp(1),
            debouncer: Debouncer::from_millis(300),
        }
    }

    #[test]
    fn unchanged_file_never_fires() {
        let mut watch = watch();
        let start = Instant::now();
        for step in 0..10 {
            assert!(!watch.observe(stamp(1), start + Duration::from_millis(step * 100)));
        }
    }

    #[test]
    fn change_fires_once_after_quiet_period() {
        let mut watch = watch();
        let start = Instant::now();
        assert!(!watch.observe(stamp(2), start));
        assert!(!watch.observe(stamp(2), start + Duration::from_millis(200)));
        assert!(watch.observe(stamp(2), start + Duration::from_millis(300)));
        assert!(!watch.observe(stamp(2), start + Duration::from_millis(900)));
    }

    #[test]
    fn burst_of_writes_coalesces() {
        let mut watch = watch();
        let start = Instant::now();
        assert!(!watch.observe(stamp(2), start));
        assert!(!watch.observe(stamp(3), start + Duration::from_millis(250)));
        // deadline moved to 550 ms
        assert!(!watch.observe(stamp(3), start + Duration::from_millis(400)));
        assert!(watch.observe(stamp(3), start + Duration::from_millis(550)));
    }

    #[test]
    fn deleted_file_counts_as_change() {
        let mut watch = watch();
        let start = Instant::now();
        assert!(!watch.observe(None, start));
        assert!(watch.observe(None, start + Duration::from_millis(300)));
    }

    #[tokio::test]
    async fn run_stops_after_max_runs() {
        let mut watch = watch();
        watch.path = PathBuf::from("definitely/not/here.json");
        watch.debouncer = Debouncer::from_millis(0);
        let mut calls = 0;
        run(watch, Duration::from_millis(1), Some(1), |_| {
            calls += 1;
            Ok(())
        })
        .await
        .unwrap();
        assert_eq!(calls, 1);
    }
}
