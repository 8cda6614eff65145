//! Resource client
//!
//! Read paths that feed a list degrade to empty; operations on one identified
//! resource surface their failures.

use agentos_bus::Notifier;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::*;

/// Multipart field name for knowledge files
const UPLOAD_FIELD: &str = "files";

/// Client for the AgentOS HTTP surface
pub struct ResourceClient {
    http: Client,
    notifier: Arc<dyn Notifier>,
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

fn mime_for(extension: &str) -> &'static str {
    match extension {
        ".pdf" => "application/pdf",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".md" => "text/markdown",
        ".txt" => "text/plain",
        ".csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Pull a human-readable reason out of an error body
fn error_detail(body: &str, status: StatusCode) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("detail") {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status_text(status)
    } else {
        body.to_string()
    }
}

impl ResourceClient {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_http_client(Client::new(), notifier)
    }

    pub fn with_http_client(http: Client, notifier: Arc<dyn Notifier>) -> Self {
        Self { http, notifier }
    }

    async fn send(&self, request: ResourceRequest) -> Result<Response> {
        self.dispatch(request, None).await
    }

    async fn dispatch(&self, request: ResourceRequest, form: Option<Form>) -> Result<Response> {
        debug!("◆ {} {}", request.method(), request.url());
        let mut builder = request.into_builder(&self.http);
        if let Some(form) = form {
            builder = builder.multipart(form);
        }
        let response = builder.send().await?;
        trace!("◆ RESPONSE {}", response.status());
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        endpoint: &RemoteEndpoint,
        route: Route<'_>,
        operation: &'static str,
    ) -> Result<Vec<T>> {
        let response = self
            .send(ResourceRequest::get(endpoint, route, &Query::new()))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::http(
                operation,
                status.as_u16(),
                status_text(status),
            ));
        }

        Self::decode(response).await
    }

    async fn tolerant_list<T: DeserializeOwned>(
        &self,
        endpoint: &RemoteEndpoint,
        route: Route<'_>,
        operation: &'static str,
        label: &str,
    ) -> Vec<T> {
        match self.fetch_list(endpoint, route, operation).await {
            Ok(items) => items,
            Err(ClientError::Http { status, detail, .. }) => {
                warn!("◆ {} returned {}, showing empty list", operation, status);
                self.notifier
                    .error(&format!("Failed to fetch {}: {}", label, detail));
                Vec::new()
            }
            Err(e) => {
                warn!("◆ {} failed: {}, showing empty list", operation, e);
                self.notifier.error(&format!("Error fetching {}", label));
                Vec::new()
            }
        }
    }

    /// `GET /agents`. Never fails; problems are notified and yield an empty list.
    pub async fn list_agents(&self, endpoint: &RemoteEndpoint) -> Vec<AgentDescriptor> {
        self.tolerant_list(endpoint, Route::Agents, "list agents", "agents")
            .await
    }

    /// `GET /teams`. Same policy as [`list_agents`](Self::list_agents).
    pub async fn list_teams(&self, endpoint: &RemoteEndpoint) -> Vec<TeamDescriptor> {
        self.tolerant_list(endpoint, Route::Teams, "list teams", "teams")
            .await
    }

    /// `GET /status`. The status code is the payload.
    pub async fn get_status(&self, endpoint: &RemoteEndpoint) -> Result<u16> {
        let response = self
            .send(ResourceRequest::get(endpoint, Route::Status, &Query::new()))
            .await?;
        Ok(response.status().as_u16())
    }

    // Ok(None) is the 404 "no sessions yet" branch.
    async fn request_sessions(
        &self,
        endpoint: &RemoteEndpoint,
        kind: ComponentKind,
        component_id: &str,
        db_id: &str,
    ) -> Result<Option<SessionList>> {
        let query = Query::new()
            .required("type", kind.as_str())
            .required("component_id", component_id)
            .required("db_id", db_id);
        let response = self
            .send(ResourceRequest::get(endpoint, Route::Sessions, &query))
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::http(
                "list sessions",
                status.as_u16(),
                format!("Failed to fetch sessions: {}", status_text(status)),
            ));
        }

        Ok(Some(Self::decode(response).await?))
    }

    /// `GET /sessions`, classified without collapsing the failure branches
    pub async fn fetch_sessions(
        &self,
        endpoint: &RemoteEndpoint,
        kind: ComponentKind,
        component_id: &str,
        db_id: &str,
    ) -> TolerantRead<SessionList> {
        match self
            .request_sessions(endpoint, kind, component_id, db_id)
            .await
        {
            Ok(Some(list)) => TolerantRead::Loaded(list),
            Ok(None) => TolerantRead::NotFound,
            Err(e) => TolerantRead::Failed(e),
        }
    }

    /// `GET /sessions`. 404 and every other failure come back as an empty list.
    pub async fn list_sessions(
        &self,
        endpoint: &RemoteEndpoint,
        kind: ComponentKind,
        component_id: &str,
        db_id: &str,
    ) -> SessionList {
        let read = self
            .fetch_sessions(endpoint, kind, component_id, db_id)
            .await;
        match &read {
            TolerantRead::NotFound => {
                debug!("◆ no sessions yet for {} {}", kind, component_id)
            }
            TolerantRead::Failed(e) => {
                warn!("◆ session list for {} {} degraded: {}", kind, component_id, e)
            }
            TolerantRead::Loaded(_) => {}
        }
        read.into_value()
    }

    /// `GET /sessions/{id}`. Any failure propagates.
    pub async fn get_session(
        &self,
        endpoint: &RemoteEndpoint,
        kind: ComponentKind,
        session_id: &str,
        db_id: Option<&str>,
    ) -> Result<SessionRecord> {
        let query = Query::new()
            .required("type", kind.as_str())
            .optional("db_id", db_id);
        let response = self
            .send(ResourceRequest::get(
                endpoint,
                Route::Session(session_id),
                &query,
            ))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::http(
                "get session",
                status.as_u16(),
                format!("Failed to fetch session: {}", status_text(status)),
            ));
        }

        Self::decode(response).await
    }

    /// `DELETE /sessions/{id}`. Non-success statuses are returned for the caller to inspect.
    pub async fn delete_session(
        &self,
        endpoint: &RemoteEndpoint,
        db_id: Option<&str>,
        session_id: &str,
    ) -> Result<Response> {
        let query = Query::new().optional("db_id", db_id);
        let response = self
            .send(ResourceRequest::delete(
                endpoint,
                Route::Session(session_id),
                &query,
            ))
            .await?;

        if !response.status().is_success() {
            debug!(
                "◆ delete session {} returned {}",
                session_id,
                response.status()
            );
        }
        Ok(response)
    }

    /// `DELETE /teams/{team_id}/sessions/{session_id}`. Any failure propagates.
    pub async fn delete_team_session(
        &self,
        endpoint: &RemoteEndpoint,
        team_id: &str,
        session_id: &str,
    ) -> Result<()> {
        let route = Route::TeamSession {
            team_id,
            session_id,
        };
        let response = self
            .send(ResourceRequest::delete(endpoint, route, &Query::new()))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::http(
                "delete team session",
                status.as_u16(),
                format!("Failed to delete team session: {}", status_text(status)),
            ));
        }
        Ok(())
    }

    async fn build_form(files: &[UploadCandidate]) -> Result<Form> {
        let mut form = Form::new();
        for file in files {
            let bytes = file
                .read_bytes()
                .await
                .map_err(|source| ClientError::File {
                    name: file.name().to_string(),
                    source,
                })?;
            let part = Part::bytes(bytes)
                .file_name(file.name().to_string())
                .mime_str(mime_for(file.extension()))?;
            form = form.part(UPLOAD_FIELD, part);
        }
        Ok(form)
    }

    /// `POST /knowledge/upload`, one multipart part per file
    pub async fn upload_knowledge(
        &self,
        endpoint: &RemoteEndpoint,
        files: &[UploadCandidate],
    ) -> Result<BatchOutcome> {
        let form = Self::build_form(files).await?;
        let request = ResourceRequest::new(
            Method::POST,
            endpoint,
            Route::KnowledgeUpload,
            &Query::new(),
            BodyKind::Multipart,
        );
        debug!("◆ uploading {} file(s)", files.len());
        let response = self.dispatch(request, Some(form)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("◆ could not read upload error body: {}", e);
                    String::new()
                }
            };
            return Err(ClientError::http(
                "upload knowledge",
                status.as_u16(),
                error_detail(&body, status),
            ));
        }

        let body: UploadResponse = Self::decode(response).await?;
        Ok(BatchOutcome::from(body))
    }
}

#[async_trait]
impl KnowledgeApi for ResourceClient {
    async fn upload_knowledge(
        &self,
        endpoint: &RemoteEndpoint,
        files: &[UploadCandidate],
    ) -> Result<BatchOutcome> {
        ResourceClient::upload_knowledge(self, endpoint, files).await
    }
}
