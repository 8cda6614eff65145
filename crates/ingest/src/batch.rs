//! Pending upload batch

use agentos_client::UploadCandidate;

use crate::validator::{accept, format_size, Acceptance, MAX_FILES};

/// Files staged for one submission, in insertion order
///
/// Every mutation goes through [`accept`], so the batch never holds more
/// than [`MAX_FILES`] entries.
#[derive(Debug, Clone, Default)]
pub struct PendingBatch {
    files: Vec<UploadCandidate>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer candidates; accepted ones are appended
    pub fn add(&mut self, candidates: Vec<UploadCandidate>) -> Acceptance {
        let acceptance = accept(candidates, self.files.len());
        self.files.extend(acceptance.accepted.iter().cloned());
        debug_assert!(self.files.len() <= MAX_FILES);
        acceptance
    }

    pub fn remove(&mut self, index: usize) -> Option<UploadCandidate> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[UploadCandidate] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn remaining(&self) -> usize {
        MAX_FILES.saturating_sub(self.files.len())
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(UploadCandidate::size).sum()
    }

    /// `name (size)` per file, for listings
    pub fn describe(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|f| format!("{} ({})", f.name(), format_size(f.size())))
            .collect()
    }
}
