//! Transport selection for bulk input
//!
//! Pasted text under a per-category ceiling rides the event channel inline.
//! Files always go through the bulk-upload transport, whatever their size.
//! Over-ceiling pastes are refused locally and never touch the network.

use std::path::PathBuf;

use crate::error::{ClientError, Result};
use crate::protocol::OutboundCommand;
use crate::session::SessionContext;
use crate::transport::BulkUploadRequest;
use crate::types::uploads::UploadCategory;

/// Most lines a pasted primary list may have
pub const PASTE_LINE_LIMIT_COMBO: usize = 10_000;

/// Most lines a pasted auxiliary list may have
pub const PASTE_LINE_LIMIT_PROXY: usize = 5_000;

/// Where an upload payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Text typed or pasted into the input
    Pasted(String),
    /// File picked from disk
    File(PathBuf),
}

/// Transport chosen for a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Send over the persistent channel
    Inline(OutboundCommand),
    /// Send over the bulk-upload transport
    Bulk(BulkUploadRequest),
}

/// Number of `'\n'`-separated segments in `text`
///
/// An empty string counts as one segment and a trailing newline adds one.
#[must_use]
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Chooses the transport for each upload
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportSelector;

impl TransportSelector {
    /// Inline ceiling for `category`
    #[must_use]
    pub const fn paste_limit(category: UploadCategory) -> usize {
        match category {
            UploadCategory::Combo => PASTE_LINE_LIMIT_COMBO,
            UploadCategory::Proxy => PASTE_LINE_LIMIT_PROXY,
        }
    }

    /// Count `text` and refuse it when it exceeds the ceiling
    ///
    /// # Errors
    /// Returns [`ClientError::PasteTooLarge`] over the ceiling
    pub fn check_paste(category: UploadCategory, text: &str) -> Result<usize> {
        let lines = line_count(text);
        let limit = Self::paste_limit(category);
        if lines > limit {
            return Err(ClientError::paste_too_large(category, lines, limit));
        }
        Ok(lines)
    }

    /// Route one upload
    ///
    /// The session gate runs first, then the ceiling check for pasted text.
    ///
    /// # Errors
    /// Returns [`ClientError::NoSession`] or [`ClientError::NotConnected`]
    /// when the gate fails, [`ClientError::EmptyInput`] for blank text and
    /// [`ClientError::PasteTooLarge`] over the ceiling
    pub fn route(
        ctx: &SessionContext,
        category: UploadCategory,
        source: UploadSource,
    ) -> Result<Route> {
        let session_id = ctx.require_session()?.clone();
        let proxy_kind = ctx.proxy_kind();

        match source {
            UploadSource::File(path) => Ok(Route::Bulk(BulkUploadRequest {
                session_id,
                category,
                proxy_kind: (category == UploadCategory::Proxy).then_some(proxy_kind),
                path,
            })),
            UploadSource::Pasted(text) => {
                let content = text.trim();
                if content.is_empty() {
                    return Err(ClientError::empty_input(category));
                }
                let lines = Self::check_paste(category, content)?;
                log::debug!("Routing {lines} pasted {category} lines inline");
                Ok(Route::Inline(OutboundCommand::inline_upload(
                    category,
                    session_id,
                    content.to_string(),
                    proxy_kind,
                )))
            }
        }
    }
}

// ============================================================================
// Input buffers
// ============================================================================

/// What an input currently holds
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputContent {
    /// Nothing
    #[default]
    Empty,
    /// Text the user pasted and has not submitted
    Draft(String),
    /// Placeholder for a dataset the backend already has
    Uploaded {
        /// Accepted lines, when known
        line_count: Option<u64>,
    },
}

/// Local text input for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBuffer {
    category: UploadCategory,
    content: InputContent,
}

impl InputBuffer {
    /// Empty input for `category`
    #[must_use]
    pub const fn new(category: UploadCategory) -> Self {
        Self {
            category,
            content: InputContent::Empty,
        }
    }

    /// Category this input feeds
    #[must_use]
    pub const fn category(&self) -> UploadCategory {
        self.category
    }

    /// Current content
    #[must_use]
    pub const fn content(&self) -> &InputContent {
        &self.content
    }

    /// Pasted text awaiting submit, if any
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        match &self.content {
            InputContent::Draft(text) => Some(text),
            _ => None,
        }
    }

    /// Insert a pasted chunk at the end of the draft
    ///
    /// Only the chunk itself is held to the ceiling here; the combined draft
    /// is checked again on submit. An over-ceiling chunk is not applied and
    /// clears the input. Pasting over an uploaded placeholder starts a new
    /// draft.
    ///
    /// # Errors
    /// Returns [`ClientError::PasteTooLarge`] when the chunk is over the ceiling
    pub fn paste(&mut self, chunk: &str) -> Result<()> {
        if let Err(e) = TransportSelector::check_paste(self.category, chunk) {
            self.clear();
            return Err(e);
        }
        let text = match std::mem::replace(&mut self.content, InputContent::Empty) {
            InputContent::Draft(mut draft) => {
                draft.push_str(chunk);
                draft
            }
            InputContent::Empty | InputContent::Uploaded { .. } => chunk.to_string(),
        };
        self.set_text(text);
        Ok(())
    }

    /// Replace the draft with typed text
    ///
    /// Typed text is not held to the ceiling until submit.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.content = if text.trim().is_empty() {
            InputContent::Empty
        } else {
            InputContent::Draft(text)
        };
    }

    /// Forget whatever the input holds
    pub fn clear(&mut self) {
        self.content = InputContent::Empty;
    }

    /// Show the uploaded placeholder
    pub fn mark_uploaded(&mut self, line_count: Option<u64>) {
        self.content = InputContent::Uploaded { line_count };
    }

    /// Text to render in the input
    #[must_use]
    pub fn display(&self) -> String {
        match &self.content {
            InputContent::Empty => String::new(),
            InputContent::Draft(text) => text.clone(),
            InputContent::Uploaded {
                line_count: Some(n),
            } => format!(
                "{} file uploaded ({n} lines). Ready to check.",
                self.category.label()
            ),
            InputContent::Uploaded { line_count: None } => {
                format!("{} file uploaded. Ready to check.", self.category.label())
            }
        }
    }
}
