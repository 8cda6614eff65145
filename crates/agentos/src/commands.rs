//! AgentOS command implementations
//!
//! Every command reloads the config and builds a fresh [`RemoteEndpoint`], so
//! a changed URL or token takes effect on the next call.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use agentos_bus::{
    LogNotifier, Notification, NotificationBus, NotificationDispatcher, NotificationKind, Notifier,
};
use agentos_client::{ComponentKind, RemoteEndpoint, ResourceClient, UploadCandidate};
use agentos_config::{self, mask_token, Config};
use agentos_ingest::{IngestionCoordinator, SubmitOutcome};

/// Prints notifications raised while a command runs
///
/// Anything still queued is printed when the console is dropped, so
/// notifications raised before an early `?` return are not lost.
struct Console {
    bus: Arc<NotificationBus>,
    dispatcher: NotificationDispatcher,
}

impl Console {
    fn new() -> Self {
        let (bus, receiver) = NotificationBus::channel();
        Self {
            bus: Arc::new(bus),
            dispatcher: NotificationDispatcher::new(receiver),
        }
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        self.bus.clone()
    }

    fn flush(&mut self) {
        for notification in self.dispatcher.drain() {
            print_notification(&notification);
        }
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.flush();
    }
}

fn print_notification(notification: &Notification) {
    match notification.kind {
        NotificationKind::Success => println!("✓ {}", notification.message),
        NotificationKind::Info => println!("◆ {}", notification.message),
        NotificationKind::Error => eprintln!("✗ {}", notification.message),
    }
}

/// Endpoint from config, `None` when no URL is set
fn endpoint_from(config: &Config) -> Option<RemoteEndpoint> {
    let url = config.endpoint_url()?;
    let endpoint = match config.auth_token() {
        Some(token) => RemoteEndpoint::new(url).with_token(token),
        None => RemoteEndpoint::new(url),
    };
    Some(endpoint)
}

async fn require_endpoint() -> Result<RemoteEndpoint> {
    let config = Config::load().await.context("Failed to load config")?;
    endpoint_from(&config)
        .context("No AgentOS endpoint configured. Run: agentos endpoint <url>")
}

fn display_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback)
}

/// Initialize config
pub async fn init_command() -> Result<()> {
    println!("◆ Initializing AgentOS client...");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = agentos_config::init()
        .await
        .context("Failed to initialize config")?;

    println!("Config:   {}", agentos_config::config_path().display());
    println!("Endpoint: {}", display_or(config.endpoint_url(), "[Not set]"));
    println!("\nNext steps:");
    println!("  1. Point at your service: agentos endpoint http://localhost:7777");
    println!("  2. Store a security key:  agentos login");
    Ok(())
}

/// Set the endpoint URL
pub async fn endpoint_command(url: String) -> Result<()> {
    let url = url.trim();
    if !url.is_empty() {
        reqwest::Url::parse(url).with_context(|| format!("Invalid endpoint URL: {}", url))?;
    }

    let mut config = Config::load().await.context("Failed to load config")?;
    config.set_endpoint_url(url);
    config.save().await.context("Failed to save config")?;

    match config.endpoint_url() {
        Some(url) => println!("✓ Endpoint set to {}", url),
        None => println!("✓ Endpoint cleared"),
    }
    Ok(())
}

/// Store the bearer token
pub async fn login_command(token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => rpassword::prompt_password("AgentOS security key: ")
            .context("Failed to read security key")?,
    };
    if token.trim().is_empty() {
        anyhow::bail!("Security key cannot be empty");
    }

    let mut config = Config::load().await.context("Failed to load config")?;
    config.set_auth_token(&token);
    config.save().await.context("Failed to save config")?;

    info!("◆ security key stored");
    println!("✓ Security key saved: {}", mask_token(Some(config.endpoint.auth_token.as_str())));
    Ok(())
}

/// Drop the stored token
pub async fn logout_command() -> Result<()> {
    let mut config = Config::load().await.context("Failed to load config")?;
    config.clear_auth_token();
    config.save().await.context("Failed to save config")?;

    println!("✓ Security key removed");
    if config.has_auth_token() {
        println!(
            "  {} is still set in the environment",
            agentos_config::TOKEN_ENV_VAR
        );
    }
    Ok(())
}

/// Show config and probe the service
pub async fn status_command() -> Result<()> {
    let config_path = agentos_config::config_path();
    let config = Config::load().await.context("Failed to load config")?;

    println!("◆ AgentOS Client Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Config:   {} {}",
        config_path.display(),
        if config_path.exists() {
            "[OK]"
        } else {
            "[Missing]"
        }
    );
    println!("Endpoint: {}", display_or(config.endpoint_url(), "[Not set]"));
    println!("Token:    {}", mask_token(config.auth_token().as_deref()));

    let endpoint = match endpoint_from(&config) {
        Some(endpoint) => endpoint,
        None => return Ok(()),
    };

    let client = ResourceClient::new(Arc::new(LogNotifier));
    match client.get_status(&endpoint).await {
        Ok(code) if (200..300).contains(&code) => println!("Service:  [Online]"),
        Ok(code) => println!("Service:  [Status {}]", code),
        Err(e) if e.is_transport() => {
            debug!("◆ status probe failed: {}", e);
            println!("Service:  [Unreachable]");
        }
        Err(e) => println!("Service:  [Error: {}]", e),
    }
    Ok(())
}

/// List agents
pub async fn agents_command() -> Result<()> {
    let endpoint = require_endpoint().await?;
    let mut console = Console::new();
    let client = ResourceClient::new(console.notifier());

    let agents = client.list_agents(&endpoint).await;
    console.flush();

    if agents.is_empty() {
        println!("No agents");
    } else {
        println!("Agents:");
        for agent in &agents {
            println!(
                "  {} - {}",
                display_or(agent.id(), "?"),
                display_or(agent.name(), "(unnamed)")
            );
        }
    }
    Ok(())
}

/// List teams
pub async fn teams_command() -> Result<()> {
    let endpoint = require_endpoint().await?;
    let mut console = Console::new();
    let client = ResourceClient::new(console.notifier());

    let teams = client.list_teams(&endpoint).await;
    console.flush();

    if teams.is_empty() {
        println!("No teams");
    } else {
        println!("Teams:");
        for team in &teams {
            println!(
                "  {} - {}",
                display_or(team.id(), "?"),
                display_or(team.name(), "(unnamed)")
            );
        }
    }
    Ok(())
}

/// List sessions for one agent or team
pub async fn sessions_list_command(
    kind: ComponentKind,
    component_id: String,
    db_id: String,
) -> Result<()> {
    let endpoint = require_endpoint().await?;
    let console = Console::new();
    let client = ResourceClient::new(console.notifier());

    let sessions = client
        .list_sessions(&endpoint, kind, &component_id, &db_id)
        .await;

    if sessions.is_empty() {
        println!("No sessions for {} {}", kind, component_id);
    } else {
        println!("Sessions for {} {}:", kind, component_id);
        for session in &sessions.data {
            println!(
                "  {} - {}",
                display_or(session.id(), "?"),
                display_or(session.name(), "(untitled)")
            );
        }
    }
    Ok(())
}

/// Print one session as JSON
pub async fn session_show_command(
    kind: ComponentKind,
    session_id: String,
    db_id: Option<String>,
) -> Result<()> {
    let endpoint = require_endpoint().await?;
    let console = Console::new();
    let client = ResourceClient::new(console.notifier());

    let session = client
        .get_session(&endpoint, kind, &session_id, db_id.as_deref())
        .await
        .with_context(|| format!("Failed to load session {}", session_id))?;

    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

/// Delete a session
pub async fn session_delete_command(session_id: String, db_id: Option<String>) -> Result<()> {
    let endpoint = require_endpoint().await?;
    let console = Console::new();
    let client = ResourceClient::new(console.notifier());

    let response = client
        .delete_session(&endpoint, db_id.as_deref(), &session_id)
        .await
        .with_context(|| format!("Failed to delete session {}", session_id))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Failed to delete session {}: {}", session_id, status);
    }
    println!("✓ Session {} deleted", session_id);
    Ok(())
}

/// Delete a team session
pub async fn session_delete_team_command(team_id: String, session_id: String) -> Result<()> {
    let endpoint = require_endpoint().await?;
    let console = Console::new();
    let client = ResourceClient::new(console.notifier());

    client
        .delete_team_session(&endpoint, &team_id, &session_id)
        .await
        .with_context(|| format!("Failed to delete session {} of team {}", session_id, team_id))?;

    println!("✓ Session {} of team {} deleted", session_id, team_id);
    Ok(())
}

/// Validate and upload files to the knowledge base
pub async fn knowledge_upload_command(paths: Vec<PathBuf>) -> Result<()> {
    let config = Config::load().await.context("Failed to load config")?;
    let mut console = Console::new();
    let client = Arc::new(ResourceClient::new(console.notifier()));
    let coordinator = IngestionCoordinator::new(client, console.notifier());

    let mut candidates = Vec::with_capacity(paths.len());
    for path in &paths {
        let candidate = UploadCandidate::from_path(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        candidates.push(candidate);
    }

    coordinator.add_selected(candidates);
    console.flush();

    let queued = coordinator.describe_pending();
    if !queued.is_empty() {
        println!("◆ Uploading {} file(s)", queued.len());
        for line in &queued {
            println!("  {}", line);
        }
    }

    let outcome = coordinator.submit(endpoint_from(&config).as_ref()).await;
    console.flush();

    match outcome {
        SubmitOutcome::Succeeded { .. } | SubmitOutcome::PartiallySucceeded { .. } => Ok(()),
        SubmitOutcome::Invalid(e) => Err(e.into()),
        SubmitOutcome::Busy => anyhow::bail!("Another upload is in progress"),
        SubmitOutcome::Failed(_) => anyhow::bail!("Upload failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_config() {
        let mut config = Config::default();
        config.set_auth_token("abc");
        let endpoint = endpoint_from(&config).unwrap();
        assert_eq!(endpoint.base_url(), "http://localhost:7777");
        assert_eq!(endpoint.token(), Some("abc"));

        config.set_endpoint_url("");
        assert!(endpoint_from(&config).is_none());
    }

    #[test]
    fn test_display_or() {
        assert_eq!(display_or(Some("x"), "-"), "x");
        assert_eq!(display_or(Some(""), "-"), "-");
        assert_eq!(display_or(None, "-"), "-");
    }
}
