//! Knowledge ingestion
//!
//! Stages files for upload, filters them against the knowledge-base rules
//! and drives a single submission at a time through [`IngestionCoordinator`].

pub mod batch;
pub mod coordinator;
pub mod error;
pub mod validator;

pub use batch::PendingBatch;
pub use coordinator::{
    Failure, IngestionCoordinator, IngestionState, SelectionSource, SubmitOutcome,
};
pub use error::ValidationError;
pub use validator::{
    accept, allowed_extensions_display, check, format_size, is_allowed_extension, Acceptance,
    ALLOWED_EXTENSIONS, MAX_FILES, MAX_FILE_SIZE_BYTES,
};
