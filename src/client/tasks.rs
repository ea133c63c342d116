//! Background tasks for `SessionClient`
//!
//! Bulk uploads run off the event path so a large file never holds up job
//! control. Each task reports exactly one [`UploadOutcome`].

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::transport::{BulkUploadRequest, BulkUploader, Transport, UploadAck};
use crate::types::uploads::UploadCategory;

/// Completion of one bulk upload
#[derive(Debug)]
pub(crate) struct UploadOutcome {
    pub(crate) category: UploadCategory,
    pub(crate) result: Result<UploadAck>,
}

impl<T, U, S> super::SessionClient<T, U, S>
where
    T: Transport,
    U: BulkUploader,
{
    /// Upload task - ships one file and reports back on the event path
    pub(super) fn spawn_bulk_upload(
        uploader: Arc<U>,
        request: BulkUploadRequest,
        outcome_tx: mpsc::UnboundedSender<UploadOutcome>,
    ) {
        tokio::spawn(async move {
            let category = request.category;
            let result = uploader.upload(request).await;
            if let Err(e) = &result {
                log::debug!("{category} upload task failed: {e}");
            }
            if outcome_tx.send(UploadOutcome { category, result }).is_err() {
                log::debug!("{category} upload finished after the client was dropped");
            }
        });
    }
}
