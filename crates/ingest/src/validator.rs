//! Upload validator
//!
//! One filter for every way files enter a batch. Invalid files are removed
//! before the count clamp, so they never take a slot.

use agentos_client::UploadCandidate;
use tracing::debug;

use crate::error::ValidationError;

/// Extensions the knowledge base can ingest
pub const ALLOWED_EXTENSIONS: [&str; 5] = [".pdf", ".docx", ".md", ".txt", ".csv"];

/// Files per batch
pub const MAX_FILES: usize = 5;

/// Per-file cap, matching the service
pub const MAX_FILE_SIZE_BYTES: u64 = 15 * 1024 * 1024;

/// Case-insensitive, with or without the leading dot
pub fn is_allowed_extension(extension: &str) -> bool {
    let ext = extension.trim().to_lowercase();
    if ext.is_empty() {
        return false;
    }
    let ext = if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    };
    ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

pub fn allowed_extensions_display() -> String {
    ALLOWED_EXTENSIONS.join(", ")
}

/// Check a single candidate
pub fn check(candidate: &UploadCandidate) -> Result<(), ValidationError> {
    if !is_allowed_extension(candidate.extension()) {
        return Err(ValidationError::DisallowedExtension {
            name: candidate.name().to_string(),
        });
    }
    if candidate.size() > MAX_FILE_SIZE_BYTES {
        return Err(ValidationError::TooLarge {
            name: candidate.name().to_string(),
            size: candidate.size(),
        });
    }
    Ok(())
}

/// Result of offering candidates to a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acceptance {
    /// Valid candidates that fit, in input order
    pub accepted: Vec<UploadCandidate>,
    /// More valid candidates arrived than there was room for
    pub truncated: bool,
    pub rejected: Vec<ValidationError>,
}

/// Filter `candidates` and clamp them to the room left after `already_queued`
pub fn accept(candidates: Vec<UploadCandidate>, already_queued: usize) -> Acceptance {
    let room = MAX_FILES.saturating_sub(already_queued);
    let offered = candidates.len();

    let mut valid = Vec::with_capacity(offered);
    let mut rejected = Vec::new();
    for candidate in candidates {
        match check(&candidate) {
            Ok(()) => valid.push(candidate),
            Err(e) => rejected.push(e),
        }
    }

    // A full batch reports truncation for any offer, valid or not.
    let truncated = if room == 0 {
        offered > 0
    } else {
        valid.len() > room
    };
    valid.truncate(room);

    debug!(
        "◆ accepted {} file(s), rejected {}, truncated: {}",
        valid.len(),
        rejected.len(),
        truncated
    );

    Acceptance {
        accepted: valid,
        truncated,
        rejected,
    }
}

/// `512 B`, `1.5 KB`, `2.0 MB`
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
