//! Client-side validation failures

use thiserror::Error;

use crate::validator::{allowed_extensions_display, MAX_FILES, MAX_FILE_SIZE_BYTES};

/// Rejected before anything reaches the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Select at least one file")]
    EmptyBatch,

    #[error("Configure the AgentOS endpoint")]
    NoEndpoint,

    #[error("Maximum of {} files per batch", MAX_FILES)]
    TooManyFiles,

    #[error("{name}: file type not allowed. Use: {}", allowed_extensions_display())]
    DisallowedExtension { name: String },

    #[error("{name}: larger than {} MB", MAX_FILE_SIZE_BYTES / (1024 * 1024))]
    TooLarge { name: String, size: u64 },
}
