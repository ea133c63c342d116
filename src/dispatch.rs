//! Job control commands and results delivery
//!
//! Every control command passes the session gate first: no command leaves
//! the client without an active session id and a connected channel. Refusals
//! surface as error notifications and as the returned [`ClientError`].

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::{ClientError, Result};
use crate::protocol::{OutboundCommand, ResultsPayload};
use crate::session::SessionContext;
use crate::types::identifiers::SessionId;
use crate::types::options::{ClientOptions, THREADS_RANGE};

/// Name used when the backend sends an unusable filename
pub const FALLBACK_RESULTS_NAME: &str = "hits.txt";

/// Results file handed over by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsDelivery {
    /// File content and suggested name
    pub payload: ResultsPayload,
    /// True for an unsolicited push, false for an explicit request
    pub pushed: bool,
}

impl ResultsDelivery {
    /// Unsolicited results-ready push
    #[must_use]
    pub const fn pushed(payload: ResultsPayload) -> Self {
        Self {
            payload,
            pushed: true,
        }
    }

    /// Response to an explicit results request
    #[must_use]
    pub const fn requested(payload: ResultsPayload) -> Self {
        Self {
            payload,
            pushed: false,
        }
    }

    /// Notification shown once the file is saved
    #[must_use]
    pub const fn success_message(&self) -> &'static str {
        if self.pushed {
            "Hits file is ready for download!"
        } else {
            "Hits downloaded successfully!"
        }
    }
}

/// Destination for delivered results
pub trait ResultsSink: Send + Sync {
    /// Persist `content` under `filename`, returning where it landed
    ///
    /// # Errors
    /// Returns error if the content cannot be written
    fn save(&self, filename: &str, content: &str)
    -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Writes results into a download directory
#[derive(Debug, Clone)]
pub struct FsResultsSink {
    dir: PathBuf,
}

impl FsResultsSink {
    /// Sink writing into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Sink writing into the configured download directory
    #[must_use]
    pub fn from_options(options: &ClientOptions) -> Self {
        Self::new(options.download_dir.clone())
    }

    /// Download directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Final path component of `filename`, or the fallback name
fn sanitize_filename(filename: &str) -> String {
    Path::new(filename.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_RESULTS_NAME.to_string())
}

impl ResultsSink for FsResultsSink {
    async fn save(&self, filename: &str, content: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(sanitize_filename(filename));
        tokio::fs::write(&path, content).await?;
        log::info!("Saved results to {}", path.display());
        Ok(path)
    }
}

/// Parse thread-count input the way a browser's `parseInt` does
///
/// Leading whitespace is skipped, an optional sign is accepted and parsing
/// stops at the first non-digit, so `"12abc"` reads as 12. Returns `None`
/// when no digits lead the input.
#[must_use]
pub fn parse_threads(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }

    // Absurdly long numbers are out of range anyway
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Builds gated control commands and delivers results
#[derive(Debug, Clone)]
pub struct CommandDispatcher<S> {
    sink: S,
}

impl<S: ResultsSink> CommandDispatcher<S> {
    /// Dispatcher saving results through `sink`
    #[must_use]
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Results sink
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Session gate shared by every command
    ///
    /// # Errors
    /// Returns [`ClientError::NoSession`] or [`ClientError::NotConnected`],
    /// after raising the matching error notification
    pub fn gate(ctx: &mut SessionContext) -> Result<SessionId> {
        let gated = ctx.require_session().cloned();
        match gated {
            Ok(id) => Ok(id),
            Err(e) => {
                log::debug!("Command refused: {e}");
                ctx.notifications_mut().error(e.to_string());
                Err(e)
            }
        }
    }

    /// Start the job with the thread count typed by the user
    ///
    /// # Errors
    /// Returns the gate error, or [`ClientError::InvalidThreadCount`] when the
    /// input is not a number in 1..=100
    pub fn start(&self, ctx: &mut SessionContext, threads_input: &str) -> Result<OutboundCommand> {
        let session_id = Self::gate(ctx)?;

        let threads = parse_threads(threads_input)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| THREADS_RANGE.contains(n));
        let Some(threads) = threads else {
            let e = ClientError::invalid_thread_count(threads_input);
            ctx.notifications_mut().error(e.to_string());
            return Err(e);
        };

        ctx.set_threads(threads);
        Ok(OutboundCommand::StartChecker {
            session_id,
            threads,
        })
    }

    /// Stop the job
    ///
    /// # Errors
    /// Returns the gate error
    pub fn stop(&self, ctx: &mut SessionContext) -> Result<OutboundCommand> {
        let session_id = Self::gate(ctx)?;
        Ok(OutboundCommand::StopChecker { session_id })
    }

    /// Pause the job
    ///
    /// # Errors
    /// Returns the gate error
    pub fn pause(&self, ctx: &mut SessionContext) -> Result<OutboundCommand> {
        let session_id = Self::gate(ctx)?;
        Ok(OutboundCommand::PauseChecker { session_id })
    }

    /// Resume a paused job
    ///
    /// # Errors
    /// Returns the gate error
    pub fn resume(&self, ctx: &mut SessionContext) -> Result<OutboundCommand> {
        let session_id = Self::gate(ctx)?;
        Ok(OutboundCommand::ContinueChecker { session_id })
    }

    /// Ask the backend for the current results
    ///
    /// # Errors
    /// Returns the gate error
    pub fn request_results(&self, ctx: &mut SessionContext) -> Result<OutboundCommand> {
        let session_id = Self::gate(ctx)?;
        Ok(OutboundCommand::DownloadHits { session_id })
    }

    /// Save delivered results and tell the user
    ///
    /// # Errors
    /// Returns error if the sink fails; an error notification is raised too
    pub async fn deliver_results(
        &self,
        ctx: &mut SessionContext,
        delivery: ResultsDelivery,
    ) -> Result<PathBuf> {
        let ResultsPayload { content, filename } = &delivery.payload;
        match self.sink.save(filename, content).await {
            Ok(path) => {
                ctx.notifications_mut().success(delivery.success_message());
                Ok(path)
            }
            Err(e) => {
                log::error!("Failed to save results '{filename}': {e}");
                ctx.notifications_mut()
                    .error(format!("Failed to save hits file: {e}"));
                Err(e)
            }
        }
    }
}
