//! Job status snapshot types
//!
//! A [`JobStatus`] is the backend's view of the running job as carried by
//! `stats_update` events and by `previous_state.stats` on reconnect. The
//! client only ever holds the most recent copy.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Status text of the zero snapshot
pub const STOPPED_STATUS: &str = "STOPPED";

/// Elapsed time as rendered by the backend (`H:MM:SS`, optionally
/// prefixed with `N day(s), `)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElapsedTime(String);

impl ElapsedTime {
    /// Wrap a backend-rendered elapsed string
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Raw text as received
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a duration, `None` if the text is not in `H:MM:SS` form
    #[must_use]
    pub fn to_duration(&self) -> Option<Duration> {
        let text = self.0.trim();
        let (days, clock) = match text.split_once(',') {
            Some((day_part, rest)) => {
                let days: u64 = day_part.split_whitespace().next()?.parse().ok()?;
                (days, rest.trim())
            }
            None => (0, text),
        };

        let mut parts = clock.split(':');
        let hours: u64 = parts.next()?.trim().parse().ok()?;
        let minutes: u64 = parts.next()?.trim().parse().ok()?;
        let seconds: u64 = parts.next()?.trim().parse().ok()?;
        if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
            return None;
        }

        Some(Duration::from_secs(
            days * 86_400 + hours * 3_600 + minutes * 60 + seconds,
        ))
    }
}

impl Default for ElapsedTime {
    fn default() -> Self {
        Self("0:00:00".to_string())
    }
}

fn stopped_status() -> String {
    STOPPED_STATUS.to_string()
}

/// Snapshot of backend job state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Raw status text, may be decorated (e.g. `"🔄 RUNNING"`)
    #[serde(default = "stopped_status")]
    pub status: String,
    /// Lines in the primary list
    #[serde(default)]
    pub total_lines: u64,
    /// Records processed so far
    #[serde(default)]
    pub checked: u64,
    /// Records rejected
    #[serde(default)]
    pub invalid: u64,
    /// Records accepted
    #[serde(default)]
    pub hits: u64,
    /// Records accepted with caveats
    #[serde(default)]
    pub custom: u64,
    /// Processing errors
    #[serde(default)]
    pub errors: u64,
    /// Retries performed
    #[serde(default)]
    pub retries: u64,
    /// Rate in records per minute
    #[serde(default)]
    pub cpm: u64,
    /// Time since run start
    #[serde(default)]
    pub elapsed_time: ElapsedTime,
    /// Domain-specific result buckets and any other fields the backend adds
    #[serde(flatten)]
    pub subtotals: BTreeMap<String, serde_json::Value>,
}

impl JobStatus {
    /// Numeric result buckets, skipping non-numeric extras
    pub fn buckets(&self) -> impl Iterator<Item = (&str, u64)> {
        self.subtotals
            .iter()
            .filter_map(|(name, value)| value.as_u64().map(|count| (name.as_str(), count)))
    }

    /// Zero snapshot that still lists every numeric bucket seen so far
    #[must_use]
    pub fn zeroed_like(&self) -> Self {
        let subtotals = self
            .buckets()
            .map(|(name, _)| (name.to_string(), serde_json::Value::from(0u64)))
            .collect();
        Self {
            subtotals,
            ..Self::default()
        }
    }

    /// True when every counter, bucket and the rate are zero
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        [
            self.total_lines,
            self.checked,
            self.invalid,
            self.hits,
            self.custom,
            self.errors,
            self.retries,
            self.cpm,
        ]
        .iter()
        .all(|counter| *counter == 0)
            && self.buckets().all(|(_, count)| count == 0)
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self {
            status: stopped_status(),
            total_lines: 0,
            checked: 0,
            invalid: 0,
            hits: 0,
            custom: 0,
            errors: 0,
            retries: 0,
            cpm: 0,
            elapsed_time: ElapsedTime::default(),
            subtotals: BTreeMap::new(),
        }
    }
}
