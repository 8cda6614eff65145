//! Ingestion coordinator
//!
//! Drives one upload attempt at a time:
//! `Idle -> Validating -> Submitting -> {Succeeded, PartiallySucceeded, Failed} -> Idle`.
//! Terminal states are reported through [`SubmitOutcome`]; the coordinator
//! itself always settles back to [`IngestionState::Idle`].

use agentos_bus::Notifier;
use agentos_client::{
    BatchOutcome, ClientError, KnowledgeApi, PerFileIngestionResult, RemoteEndpoint,
    UploadCandidate,
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::batch::PendingBatch;
use crate::error::ValidationError;
use crate::validator::{check, Acceptance};

/// Shown when the upload raised without a usable message
pub const GENERIC_UPLOAD_FAILURE: &str = "Failed to upload files";

/// Shown when the service accepted the request but ingested nothing
pub const NOTHING_INGESTED: &str = "No files were ingested.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionState {
    Idle,
    Validating,
    Submitting,
}

/// How files reached the batch. Both paths are filtered identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Picker,
    Drop,
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionSource::Picker => f.write_str("picker"),
            SelectionSource::Drop => f.write_str("drop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Nothing ingested, the service reported why per file
    Rejected(Vec<PerFileIngestionResult>),
    /// Nothing ingested and no per-file reasons
    NothingIngested,
    /// The upload itself raised
    Transport(String),
}

/// Result of one [`IngestionCoordinator::submit`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another attempt is in flight; nothing was sent
    Busy,
    /// Stopped before the network
    Invalid(ValidationError),
    Succeeded {
        ingested: u32,
    },
    PartiallySucceeded {
        ingested: u32,
        failed: Vec<PerFileIngestionResult>,
    },
    Failed(Failure),
}

impl SubmitOutcome {
    /// Whether the batch was cleared by this attempt
    pub fn cleared_batch(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::Succeeded { .. } | SubmitOutcome::PartiallySucceeded { .. }
        )
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// Releases the busy flag even if the attempt future is dropped mid-flight.
struct AttemptGuard<'a> {
    busy: &'a AtomicBool,
    state: &'a Mutex<IngestionState>,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        *lock(self.state) = IngestionState::Idle;
        self.busy.store(false, Ordering::Release);
    }
}

fn failure_message(error: &ClientError) -> String {
    let message = match error {
        ClientError::Http { detail, .. } => detail.trim().to_string(),
        other => other.to_string(),
    };
    if message.is_empty() {
        GENERIC_UPLOAD_FAILURE.to_string()
    } else {
        message
    }
}

/// Owns one upload surface's pending batch and busy flag
pub struct IngestionCoordinator {
    api: Arc<dyn KnowledgeApi>,
    notifier: Arc<dyn Notifier>,
    batch: Mutex<PendingBatch>,
    state: Mutex<IngestionState>,
    busy: AtomicBool,
    open: AtomicBool,
}

impl IngestionCoordinator {
    pub fn new(api: Arc<dyn KnowledgeApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            batch: Mutex::new(PendingBatch::new()),
            state: Mutex::new(IngestionState::Idle),
            busy: AtomicBool::new(false),
            open: AtomicBool::new(true),
        }
    }

    pub fn state(&self) -> IngestionState {
        *lock(&self.state)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Whether the upload workflow is still open (closed after any success)
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    pub fn pending(&self) -> Vec<UploadCandidate> {
        lock(&self.batch).files().to_vec()
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.batch).len()
    }

    pub fn describe_pending(&self) -> Vec<String> {
        lock(&self.batch).describe()
    }

    pub fn add_selected(&self, files: Vec<UploadCandidate>) -> Acceptance {
        self.add(files, SelectionSource::Picker)
    }

    pub fn add_dropped(&self, files: Vec<UploadCandidate>) -> Acceptance {
        self.add(files, SelectionSource::Drop)
    }

    /// Stage files, notifying once per rejected file and once on truncation
    pub fn add(&self, files: Vec<UploadCandidate>, source: SelectionSource) -> Acceptance {
        let offered = files.len();
        let acceptance = lock(&self.batch).add(files);

        for rejection in &acceptance.rejected {
            self.notifier.error(&rejection.to_string());
        }
        if acceptance.truncated {
            self.notifier.error(&ValidationError::TooManyFiles.to_string());
        }

        debug!(
            "◆ {} offered {} file(s), {} queued",
            source,
            offered,
            acceptance.accepted.len()
        );
        acceptance
    }

    pub fn remove(&self, index: usize) -> Option<UploadCandidate> {
        lock(&self.batch).remove(index)
    }

    pub fn clear(&self) {
        lock(&self.batch).clear();
    }

    fn set_state(&self, state: IngestionState) {
        *lock(&self.state) = state;
    }

    /// Submit the pending batch to `endpoint`
    ///
    /// A call made while another is still in flight returns
    /// [`SubmitOutcome::Busy`] without touching the network.
    pub async fn submit(&self, endpoint: Option<&RemoteEndpoint>) -> SubmitOutcome {
        if self.busy.swap(true, Ordering::AcqRel) {
            debug!("◆ upload already in flight, ignoring submit");
            return SubmitOutcome::Busy;
        }
        let _guard = AttemptGuard {
            busy: &self.busy,
            state: &self.state,
        };

        self.set_state(IngestionState::Validating);
        let (endpoint, files) = match self.validate(endpoint) {
            Ok(ready) => ready,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return SubmitOutcome::Invalid(e);
            }
        };

        self.set_state(IngestionState::Submitting);
        info!("◆ submitting {} file(s) to {}", files.len(), endpoint.base_url());

        match self.api.upload_knowledge(endpoint, &files).await {
            Ok(outcome) => self.settle(outcome),
            Err(e) => {
                warn!("◆ upload failed: {}", e);
                let message = failure_message(&e);
                self.notifier.error(&message);
                SubmitOutcome::Failed(Failure::Transport(message))
            }
        }
    }

    fn validate<'e>(
        &self,
        endpoint: Option<&'e RemoteEndpoint>,
    ) -> Result<(&'e RemoteEndpoint, Vec<UploadCandidate>), ValidationError> {
        let files = self.pending();
        if files.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        let endpoint = endpoint
            .filter(|e| !e.base_url().trim().is_empty())
            .ok_or(ValidationError::NoEndpoint)?;

        // Staging already filtered; checked again in case a file changed since.
        for file in &files {
            check(file)?;
        }
        Ok((endpoint, files))
    }

    fn settle(&self, outcome: BatchOutcome) -> SubmitOutcome {
        let BatchOutcome { ingested, errors } = outcome;

        if ingested > 0 {
            self.notifier.success(&format!(
                "{} file(s) sent to the knowledge base.",
                ingested
            ));
            for failed in &errors {
                self.notifier.error(&failed.describe());
            }
            self.clear();
            self.close();
            info!("◆ ingested {}, {} failed", ingested, errors.len());

            if errors.is_empty() {
                SubmitOutcome::Succeeded { ingested }
            } else {
                SubmitOutcome::PartiallySucceeded {
                    ingested,
                    failed: errors,
                }
            }
        } else if !errors.is_empty() {
            for failed in &errors {
                self.notifier.error(&failed.describe());
            }
            SubmitOutcome::Failed(Failure::Rejected(errors))
        } else {
            self.notifier.error(NOTHING_INGESTED);
            SubmitOutcome::Failed(Failure::NothingIngested)
        }
    }
}
