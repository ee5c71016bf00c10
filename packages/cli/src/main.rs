//! `hanna`: command-line access to the Hanna REST API through the
//! authenticated gateway.

use clap::{Parser, Subcommand};
use colored::*;
use gateway::{FileTokenRepository, GatewayConfig, HannaClient, SessionStatus};
use shared::models::ids::ObjectId;
use shared::models::resources::ResourceKind;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, Level};

mod commands;
mod console;
mod error;

use commands::{parse_body, run_resource, ResourceOp};
use console::ConsoleNotifier;
use error::CliError;

#[derive(Parser)]
#[command(name = "hanna")]
#[command(about = "Command-line client for the Hanna CRM API", long_about = None)]
struct Cli {
    /// API root, e.g. https://crm.example.com/api
    #[arg(long, global = true, env = "HANNA_API_BASE_URL")]
    base_url: Option<String>,

    /// Where the session is stored between invocations
    #[arg(long, global = true, env = "HANNA_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log gateway activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the token pair
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "HANNA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and revoke the refresh token
    Logout {
        /// Only forget the local session
        #[arg(long)]
        local: bool,
    },

    /// Show the signed-in user
    Whoami,

    /// List a collection
    List {
        resource: ResourceKind,

        #[arg(long)]
        page: Option<u32>,

        /// Follow pagination to the end
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },

    /// Fetch one item
    Get { resource: ResourceKind, id: String },

    /// Create an item from a JSON object
    Create {
        resource: ResourceKind,

        #[arg(long)]
        data: String,
    },

    /// Partially update an item
    Update {
        resource: ResourceKind,
        id: String,

        #[arg(long)]
        data: String,
    },

    /// Delete an item
    Delete { resource: ResourceKind, id: String },
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        std::env::var("HANNA_LOG_LEVEL")
            .ok()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::WARN)
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(cli: &Cli) -> Result<HannaClient, CliError> {
    let mut config = GatewayConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
        config.validate()?;
    }
    if let Some(session_file) = &cli.session_file {
        config.session_file = session_file.clone();
    }

    debug!("Using session file {}", config.session_file.display());
    let store = Arc::new(FileTokenRepository::load(config.session_file.clone()).await);
    Ok(HannaClient::new(config, store, Arc::new(ConsoleNotifier))?)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let client = connect(&cli).await?;
    let session = client.session();
    let status = session.init().await;

    let result = match cli.command {
        Commands::Login { username, password } => {
            let user = session.login(&username, &password).await?;
            console::success(&format!("Logged in as {}", user.display_name()));
            Ok(())
        }
        Commands::Logout { local } => {
            session.logout(!local).await;
            console::success("Logged out");
            Ok(())
        }
        Commands::Whoami => match status {
            SessionStatus::Authenticated(user) => {
                let role = user.role.map(|r| r.as_str()).unwrap_or("unknown");
                println!("{} ({})", user.display_name().bold(), role);
                println!("session expires {}", user.expires_at.to_rfc3339());
                Ok(())
            }
            SessionStatus::Unauthenticated => {
                Err(CliError::Message("Not logged in".to_string()))
            }
        },
        Commands::List {
            resource,
            page,
            all,
        } => print(&client, resource, ResourceOp::List { page, all }).await,
        Commands::Get { resource, id } => {
            let id = ObjectId::from(id.as_str());
            print(&client, resource, ResourceOp::Get { id }).await
        }
        Commands::Create { resource, data } => {
            let body = parse_body(&data)?;
            print(&client, resource, ResourceOp::Create { body }).await
        }
        Commands::Update { resource, id, data } => {
            let id = ObjectId::from(id.as_str());
            let body = parse_body(&data)?;
            print(&client, resource, ResourceOp::Update { id, body }).await
        }
        Commands::Delete { resource, id } => {
            let id = ObjectId::from(id.as_str());
            print(&client, resource, ResourceOp::Delete { id: id.clone() }).await?;
            console::success(&format!("Deleted {} {}", resource, id));
            Ok(())
        }
    };

    session.teardown().await;
    result
}

async fn print(client: &HannaClient, kind: ResourceKind, op: ResourceOp) -> Result<(), CliError> {
    if let Some(output) = run_resource(client, kind, op).await? {
        console::print_json(&output)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Reported) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {}", "✗".red(), err.to_string().red());
            ExitCode::FAILURE
        }
    }
}
