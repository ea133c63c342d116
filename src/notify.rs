//! Transient user-facing notifications
//!
//! Every component reports outcomes here. A message is fully visible for
//! the display window, then exiting for the exit window, then retired. The
//! schedule of one message never depends on any other message.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::types::options::ClientOptions;

const SUBSCRIBER_CAPACITY: usize = 64;

/// Visual weight of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Neutral progress information
    Info,
    /// Operation succeeded
    Success,
    /// Operation failed or was refused
    Error,
}

/// Where a message is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Inside the display window
    Visible,
    /// Inside the exit window
    Exiting,
    /// Past both windows
    Retired,
}

/// One queued notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    /// Text shown to the user
    pub text: String,
    /// Visual weight
    pub severity: Severity,
    /// When the message was raised
    pub created_at: Instant,
}

impl PendingMessage {
    /// Lifecycle phase at `now`
    #[must_use]
    pub fn phase(&self, now: Instant, display: Duration, exit: Duration) -> Phase {
        let age = now.saturating_duration_since(self.created_at);
        if age < display {
            Phase::Visible
        } else if age < display + exit {
            Phase::Exiting
        } else {
            Phase::Retired
        }
    }
}

/// Queue of transient notifications with broadcast fan-out
///
/// Retirement is driven by the clock alone: readers never see a message past
/// its exit window, and expired entries are dropped on the next push.
/// [`Self::retire_expired`] only reclaims memory early.
#[derive(Debug)]
pub struct NotificationCenter {
    queue: VecDeque<PendingMessage>,
    display_window: Duration,
    exit_window: Duration,
    tx: broadcast::Sender<PendingMessage>,
}

impl NotificationCenter {
    /// Create a center with explicit windows
    #[must_use]
    pub fn new(display_window: Duration, exit_window: Duration) -> Self {
        let (tx, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self {
            queue: VecDeque::new(),
            display_window,
            exit_window,
            tx,
        }
    }

    /// Create a center using the windows from client options
    #[must_use]
    pub fn from_options(options: &ClientOptions) -> Self {
        Self::new(options.display_window, options.exit_window)
    }

    /// Receive every notification raised after this call
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PendingMessage> {
        self.tx.subscribe()
    }

    /// Raise an info notification
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text);
    }

    /// Raise a success notification
    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Severity::Success, text);
    }

    /// Raise an error notification
    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Severity::Error, text);
    }

    /// Raise a notification with the given severity
    pub fn push(&mut self, severity: Severity, text: impl Into<String>) {
        let message = PendingMessage {
            text: text.into(),
            severity,
            created_at: Instant::now(),
        };
        log::debug!("Notification ({severity:?}): {}", message.text);

        // No subscribers is fine
        let _ = self.tx.send(message.clone());
        self.retire_expired(message.created_at);
        self.queue.push_back(message);
    }

    fn is_live(&self, message: &PendingMessage, now: Instant) -> bool {
        message.phase(now, self.display_window, self.exit_window) != Phase::Retired
    }

    /// Messages not yet retired at `now`, oldest first, with their phase
    pub fn visible(&self, now: Instant) -> impl Iterator<Item = (&PendingMessage, Phase)> {
        self.queue.iter().filter_map(move |message| {
            match message.phase(now, self.display_window, self.exit_window) {
                Phase::Retired => None,
                phase => Some((message, phase)),
            }
        })
    }

    /// Drop retired messages. Returns how many were dropped.
    pub fn retire_expired(&mut self, now: Instant) -> usize {
        let before = self.queue.len();
        let (display, exit) = (self.display_window, self.exit_window);
        self.queue
            .retain(|message| message.phase(now, display, exit) != Phase::Retired);
        before - self.queue.len()
    }

    /// Most recently raised message that has not retired
    #[must_use]
    pub fn latest(&self) -> Option<&PendingMessage> {
        let now = Instant::now();
        self.queue.back().filter(|message| self.is_live(message, now))
    }

    /// Messages that have not retired, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &PendingMessage> {
        let now = Instant::now();
        self.queue
            .iter()
            .filter(move |message| self.is_live(message, now))
    }

    /// Number of messages that have not retired
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True when every message has retired
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::from_options(&ClientOptions::default())
    }
}
