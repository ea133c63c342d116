//! Type definitions for the job session client
//!
//! This module contains the data model shared by every component,
//! organized into logical submodules:
//!
//! - [`identifiers`] - Type-safe ID wrappers (`SessionId`)
//! - [`stats`] - Backend job status snapshots (`JobStatus`, `ElapsedTime`)
//! - [`uploads`] - Bulk dataset categories and artifacts
//! - [`options`] - Client configuration options

pub mod identifiers;
pub mod options;
pub mod stats;
pub mod uploads;

// Re-export commonly used types
pub use identifiers::SessionId;
pub use options::{ClientOptions, ClientOptionsBuilder};
pub use stats::{ElapsedTime, JobStatus};
pub use uploads::{ProxyKind, UploadArtifact, UploadCategory, UploadState};
