//! Resource client errors

use thiserror::Error;

/// Classified failure of a resource operation
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network failure before a status code was obtained
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Non-success status
    #[error("{operation} failed ({status}): {detail}")]
    Http {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    /// Upload candidate bytes could not be read
    #[error("failed to read {name}: {source}")]
    File {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn http(operation: &'static str, status: u16, detail: impl Into<String>) -> Self {
        ClientError::Http {
            operation,
            status,
            detail: detail.into(),
        }
    }

    /// Status code carried by the failure, if one was obtained
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
