//! Knowledge upload types
//!
//! Upload candidates carry name/size/extension metadata plus a byte source
//! that is only read when the batch is submitted.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Message used when the service reports a failed file without saying why
pub const DEFAULT_FILE_ERROR: &str = "ingestion failed";

/// Lowercase extension including the leading dot, or empty when the name has none
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{}", ext.to_lowercase()),
        _ => String::new(),
    }
}

/// Where a candidate's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file offered for ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    name: String,
    size: u64,
    extension: String,
    source: FileSource,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, size: u64, source: FileSource) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self {
            name,
            size,
            extension,
            source,
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self::new(name, size, FileSource::Memory(bytes))
    }

    /// Stat a file on disk. Bytes are read later, at submission.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        Ok(Self::new(
            name,
            metadata.len(),
            FileSource::Path(path.to_path_buf()),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    pub async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Per-file status reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionStatus {
    #[serde(alias = "ok")]
    Ingested,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerFileIngestionResult {
    #[serde(default)]
    pub filename: String,
    pub status: IngestionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PerFileIngestionResult {
    pub fn error(filename: impl Into<String>, message: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            status: IngestionStatus::Error,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == IngestionStatus::Error
    }

    /// `filename: message`, with a generic message when the service gave none
    pub fn describe(&self) -> String {
        let message = self
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_FILE_ERROR);
        format!("{}: {}", self.filename, message)
    }
}

/// Raw body of `POST /knowledge/upload`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub ingested: u32,
    #[serde(default)]
    pub documents: Vec<PerFileIngestionResult>,
}

/// Aggregated result of one upload
///
/// `ingested + errors.len()` is not required to match the submitted count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub ingested: u32,
    pub errors: Vec<PerFileIngestionResult>,
}

impl BatchOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl From<UploadResponse> for BatchOutcome {
    fn from(response: UploadResponse) -> Self {
        Self {
            ingested: response.ingested,
            errors: response
                .documents
                .into_iter()
                .filter(PerFileIngestionResult::is_error)
                .collect(),
        }
    }
}
