//! Local mirror of the backend job status
//!
//! The backend pushes a full snapshot on every change. The client keeps only
//! the latest one: each snapshot replaces the previous wholesale, with no
//! ordering reconciliation. Renderers subscribe to a `watch` channel.

use tokio::sync::watch;

use crate::types::stats::{ElapsedTime, JobStatus};

/// Coarse health derived from the raw status text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusIndicator {
    /// Running or complete
    Nominal,
    /// Paused
    Attention,
    /// Stopped, failed or anything unrecognized
    Halted,
}

impl StatusIndicator {
    /// Classify status text by substring, first match wins
    ///
    /// The backend decorates its status text freely, so only the marker
    /// words matter: `RUNNING`, then `PAUSED`, then `COMPLETE`.
    ///
    /// ```rust
    /// use jobsync_client::progress::StatusIndicator;
    ///
    /// assert_eq!(StatusIndicator::classify("▶ RUNNING"), StatusIndicator::Nominal);
    /// assert_eq!(StatusIndicator::classify("PAUSED"), StatusIndicator::Attention);
    /// assert_eq!(StatusIndicator::classify("stopped"), StatusIndicator::Halted);
    /// ```
    #[must_use]
    pub fn classify(status: &str) -> Self {
        if status.contains("RUNNING") {
            Self::Nominal
        } else if status.contains("PAUSED") {
            Self::Attention
        } else if status.contains("COMPLETE") {
            Self::Nominal
        } else {
            Self::Halted
        }
    }
}

/// Render-ready projection of the latest snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    /// Raw status text
    pub status: String,
    /// Derived indicator
    pub indicator: StatusIndicator,
    /// Lines in the uploaded primary list
    pub total_lines: u64,
    /// Lines processed
    pub checked: u64,
    /// Lines rejected
    pub invalid: u64,
    /// Positive results
    pub hits: u64,
    /// Secondary results
    pub custom: u64,
    /// Processing errors
    pub errors: u64,
    /// Retries
    pub retries: u64,
    /// Throughput per minute
    pub cpm: u64,
    /// Backend-formatted elapsed time
    pub elapsed: ElapsedTime,
    /// Domain-specific subtotals, sorted by name
    pub buckets: Vec<(String, u64)>,
}

impl From<&JobStatus> for ProgressView {
    fn from(stats: &JobStatus) -> Self {
        Self {
            status: stats.status.clone(),
            indicator: StatusIndicator::classify(&stats.status),
            total_lines: stats.total_lines,
            checked: stats.checked,
            invalid: stats.invalid,
            hits: stats.hits,
            custom: stats.custom,
            errors: stats.errors,
            retries: stats.retries,
            cpm: stats.cpm,
            elapsed: stats.elapsed_time.clone(),
            buckets: stats
                .buckets()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

/// Keeps the latest [`JobStatus`] and publishes its view
#[derive(Debug)]
pub struct ProgressSynchronizer {
    current: JobStatus,
    tx: watch::Sender<ProgressView>,
}

impl ProgressSynchronizer {
    /// Start from the zero snapshot
    #[must_use]
    pub fn new() -> Self {
        let current = JobStatus::default();
        let (tx, _) = watch::channel(ProgressView::from(&current));
        Self { current, tx }
    }

    /// Replace the mirror with `stats`
    pub fn apply(&mut self, stats: JobStatus) {
        log::debug!(
            "Progress {} ({}/{} checked, {} hits)",
            stats.status,
            stats.checked,
            stats.total_lines,
            stats.hits
        );
        self.current = stats;
        self.publish();
    }

    /// Restore the mirror from a reconnect snapshot
    pub fn hydrate(&mut self, stats: JobStatus) {
        self.apply(stats);
    }

    /// Back to the zero snapshot
    ///
    /// Known result buckets stay listed with a count of zero.
    pub fn reset(&mut self) {
        self.current = self.current.zeroed_like();
        self.publish();
    }

    /// Overwrite only the line total, as an upload confirmation does
    pub fn set_total_lines(&mut self, total_lines: u64) {
        self.current.total_lines = total_lines;
        self.publish();
    }

    /// Latest snapshot
    #[must_use]
    pub const fn current(&self) -> &JobStatus {
        &self.current
    }

    /// Indicator for the latest snapshot
    #[must_use]
    pub fn indicator(&self) -> StatusIndicator {
        StatusIndicator::classify(&self.current.status)
    }

    /// Render-ready view of the latest snapshot
    #[must_use]
    pub fn view(&self) -> ProgressView {
        ProgressView::from(&self.current)
    }

    /// Watch every view published from now on
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressView> {
        self.tx.subscribe()
    }

    fn publish(&self) {
        self.tx.send_replace(self.view());
    }
}

impl Default for ProgressSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
