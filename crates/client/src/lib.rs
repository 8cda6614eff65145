//! AgentOS resource access layer
//!
//! Authenticated request builders for agents, teams, sessions and knowledge
//! uploads, with per-operation error tolerance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub mod client;
pub mod error;
pub mod knowledge;
pub mod request;
pub mod routes;

pub use client::ResourceClient;
pub use error::{ClientError, Result};
pub use knowledge::{
    extension_of, BatchOutcome, FileSource, IngestionStatus, PerFileIngestionResult,
    UploadCandidate, UploadResponse, DEFAULT_FILE_ERROR,
};
pub use request::{BodyKind, ResourceRequest};
pub use routes::{build_target, Query, Route};

/// Service base address plus optional bearer credential
///
/// Callers build one per operation from their current settings; nothing in
/// this crate holds on to it between calls.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    base_url: String,
    token: Option<String>,
}

impl RemoteEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach a credential. Blank tokens are treated as absent.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        self.token = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Session owner type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Agent,
    Team,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Agent => "agent",
            ComponentKind::Team => "team",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "agent" => Ok(ComponentKind::Agent),
            "team" => Ok(ComponentKind::Team),
            other => Err(format!("unknown component type '{}' (agent|team)", other)),
        }
    }
}

fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// Agent record, passed through as the service sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentDescriptor(pub Value);

impl AgentDescriptor {
    pub fn id(&self) -> Option<&str> {
        str_field(&self.0, "id").or_else(|| str_field(&self.0, "agent_id"))
    }

    pub fn name(&self) -> Option<&str> {
        str_field(&self.0, "name")
    }
}

/// Team record, passed through as the service sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamDescriptor(pub Value);

impl TeamDescriptor {
    pub fn id(&self) -> Option<&str> {
        str_field(&self.0, "id").or_else(|| str_field(&self.0, "team_id"))
    }

    pub fn name(&self) -> Option<&str> {
        str_field(&self.0, "name")
    }
}

/// Session record, passed through as the service sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRecord(pub Value);

impl SessionRecord {
    pub fn id(&self) -> Option<&str> {
        str_field(&self.0, "session_id").or_else(|| str_field(&self.0, "id"))
    }

    pub fn name(&self) -> Option<&str> {
        str_field(&self.0, "session_name")
    }
}

/// Body of `GET /sessions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionList {
    #[serde(default)]
    pub data: Vec<SessionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl SessionList {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// Outcome of a read that degrades to empty instead of failing
#[derive(Debug)]
pub enum TolerantRead<T> {
    Loaded(T),
    /// 404: nothing exists yet
    NotFound,
    /// Raised internally, swallowed for the caller
    Failed(ClientError),
}

impl<T: Default> TolerantRead<T> {
    pub fn into_value(self) -> T {
        match self {
            TolerantRead::Loaded(value) => value,
            TolerantRead::NotFound | TolerantRead::Failed(_) => T::default(),
        }
    }
}

impl<T> TolerantRead<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, TolerantRead::Loaded(_))
    }
}

/// Knowledge upload seam used by the ingestion coordinator
#[async_trait]
pub trait KnowledgeApi: Send + Sync {
    async fn upload_knowledge(
        &self,
        endpoint: &RemoteEndpoint,
        files: &[UploadCandidate],
    ) -> Result<BatchOutcome>;
}
