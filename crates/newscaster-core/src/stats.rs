//! Running counters for the current activation.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Local};

/// Counters and timestamps of one controller activation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// When the controller last transitioned to running.
    pub start_time: Option<DateTime<Local>>,
    /// Posts delivered to the channel.
    pub posts_sent: u64,
    /// Source, entry and cycle-level failures.
    pub errors: u64,
    /// Images produced by the renderer.
    pub images_generated: u64,
    /// Accepted LLM rewrites.
    pub yagpt_used: u64,
    /// Failed or rejected LLM rewrites.
    pub yagpt_errors: u64,
    /// Start of the most recent cycle.
    pub last_check: Option<DateTime<Local>>,
    /// Time of the most recent post.
    pub last_post: Option<DateTime<Local>>,
}

impl RunStats {
    /// Time elapsed since `start_time`, if the controller was ever started.
    pub fn uptime(&self, now: DateTime<Local>) -> Option<Duration> {
        self.start_time.map(|start| now - start)
    }

    /// Average posting rate since `start_time`.
    pub fn posts_per_hour(&self, now: DateTime<Local>) -> f64 {
        let Some(uptime) = self.uptime(now) else {
            return 0.0;
        };
        let hours = uptime.num_milliseconds() as f64 / 3_600_000.0;
        if hours > 0.0 {
            self.posts_sent as f64 / hours
        } else {
            0.0
        }
    }
}

/// Shared, lock-protected [`RunStats`].
///
/// Writes come from the worker; the operator bot reads snapshots, which may
/// be slightly stale.
#[derive(Debug, Default)]
pub struct StatsStore {
    inner: RwLock<RunStats>,
}

impl StatsStore {
    /// Creates zeroed stats.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RunStats> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RunStats> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Zeroes every counter and records a new start time.
    pub fn reset(&self, start_time: DateTime<Local>) {
        *self.write() = RunStats {
            start_time: Some(start_time),
            ..RunStats::default()
        };
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> RunStats {
        self.read().clone()
    }

    pub fn mark_check(&self) {
        self.write().last_check = Some(Local::now());
    }

    pub fn record_post(&self) {
        let mut stats = self.write();
        stats.posts_sent += 1;
        stats.last_post = Some(Local::now());
    }

    pub fn record_error(&self) {
        self.write().errors += 1;
    }

    pub fn record_image(&self) {
        self.write().images_generated += 1;
    }

    pub fn record_enhancement(&self) {
        self.write().yagpt_used += 1;
    }

    pub fn record_enhancement_error(&self) {
        self.write().yagpt_errors += 1;
    }
}
