//! Ingestion: staging, validation, and submission of a single document.
//!
//! Split the way the rest of the crate is: `controller` is the pure state
//! machine, `ticker` the injectable time source for perceived progress, and
//! `service` the async driver that wires both to the API gateway.

pub mod controller;
pub mod service;
pub mod ticker;

pub use controller::{
    FileOffer, IngestPhase, IngestSnapshot, IngestionController, PreviewRef, RejectReason,
    StagedFile, UploadRequest,
};
pub use service::IngestionService;
pub use ticker::{ManualScheduler, ProgressScheduler, TickerGuard, TokioScheduler};

use thiserror::Error;

/// Errors surfaced by ingestion operations.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The drop/select event was refused; prior valid staging is untouched.
    #[error(transparent)]
    Rejected(#[from] RejectReason),

    #[error("nothing is staged for submission")]
    NotStaged,

    #[error("a submission is already in flight")]
    AlreadySubmitting,

    #[error("internal lock error")]
    LockPoisoned,
}
