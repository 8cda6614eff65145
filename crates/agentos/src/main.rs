//! AgentOS - command-line client for an AgentOS service

use agentos_client::ComponentKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    agents_command, endpoint_command, init_command, knowledge_upload_command, login_command,
    logout_command, session_delete_command, session_delete_team_command, session_show_command,
    sessions_list_command, status_command, teams_command,
};

/// AgentOS - talk to an AgentOS service from your terminal
#[derive(Parser)]
#[command(name = "agentos")]
#[command(about = "◆ Command-line client for AgentOS")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config
    Init,
    /// Set the AgentOS endpoint URL
    Endpoint {
        /// Base URL, e.g. http://localhost:7777
        url: String,
    },
    /// Store the security key used as bearer token
    Login {
        /// Token value (prompted for when omitted)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Forget the stored security key
    Logout,
    /// Show endpoint and connection status
    Status,
    /// List agents
    Agents,
    /// List teams
    Teams,
    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Manage the knowledge base
    Knowledge {
        #[command(subcommand)]
        command: KnowledgeCommands,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List sessions of an agent or team
    List {
        /// Agent or team id
        component_id: String,
        /// Component type (agent or team)
        #[arg(short = 't', long = "type", default_value = "agent")]
        kind: ComponentKind,
        /// Database id
        #[arg(short, long, default_value = "")]
        db_id: String,
    },
    /// Show one session
    Show {
        session_id: String,
        /// Component type (agent or team)
        #[arg(short = 't', long = "type", default_value = "agent")]
        kind: ComponentKind,
        /// Database id
        #[arg(short, long)]
        db_id: Option<String>,
    },
    /// Delete a session
    Delete {
        session_id: String,
        /// Database id
        #[arg(short, long)]
        db_id: Option<String>,
    },
    /// Delete a team session
    DeleteTeam { team_id: String, session_id: String },
}

#[derive(Subcommand)]
enum KnowledgeCommands {
    /// Upload files (.pdf, .docx, .md, .txt, .csv; at most 5)
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (label, result) = match cli.command {
        Commands::Init => ("Init", init_command().await),
        Commands::Endpoint { url } => ("Endpoint", endpoint_command(url).await),
        Commands::Login { token } => ("Login", login_command(token).await),
        Commands::Logout => ("Logout", logout_command().await),
        Commands::Status => ("Status", status_command().await),
        Commands::Agents => ("Agents", agents_command().await),
        Commands::Teams => ("Teams", teams_command().await),
        Commands::Sessions { command } => match command {
            SessionCommands::List {
                component_id,
                kind,
                db_id,
            } => (
                "Sessions list",
                sessions_list_command(kind, component_id, db_id).await,
            ),
            SessionCommands::Show {
                session_id,
                kind,
                db_id,
            } => (
                "Session show",
                session_show_command(kind, session_id, db_id).await,
            ),
            SessionCommands::Delete { session_id, db_id } => (
                "Session delete",
                session_delete_command(session_id, db_id).await,
            ),
            SessionCommands::DeleteTeam {
                team_id,
                session_id,
            } => (
                "Team session delete",
                session_delete_team_command(team_id, session_id).await,
            ),
        },
        Commands::Knowledge { command } => match command {
            KnowledgeCommands::Upload { paths } => {
                ("Upload", knowledge_upload_command(paths).await)
            }
        },
    };

    if let Err(e) = result {
        error!("{} failed: {:#}", label, e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}
