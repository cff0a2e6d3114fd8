use thiserror::Error;

use crate::api::ApiError;
use crate::job::PollError;
use crate::resolve::ResolveError;
use crate::storage::StorageError;

/// Pipeline-level failures, caught at the orchestrator boundary and surfaced
/// to the user as a single human-readable message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Generate was requested before any upload completed.
    #[error("please upload an image first")]
    NothingUploaded,

    /// Download was requested before a result exists.
    #[error("no result to download yet")]
    NoResult,

    /// Another flow holds the single in-flight slot.
    #[error("another operation is already in progress")]
    Busy,

    #[error("{0}")]
    Upload(#[from] StorageError),

    #[error("job submission failed: {0}")]
    Submission(#[from] ApiError),

    #[error("{0}")]
    Poll(#[from] PollError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),
}
