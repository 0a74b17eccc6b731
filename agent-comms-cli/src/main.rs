//! CLI entry point for agent-comms

mod editor;
mod live;
mod render;

use agent_comms_core::config::{Config, ConfigLoader};
use agent_comms_core::logging::init_logging;
use agent_comms_core::registry::SenderAssignment;
use agent_comms_core::{CommsDb, MessageLog, NameRegistry, ReadCursors, StatusReport};
use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "comms")]
#[command(about = "Shared SQLite group chat for coordinating agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Message database path (overrides config and COMMS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Post a message
    Post {
        /// Sender name (defaults to chat.sender, "nick")
        #[arg(short, long)]
        sender: Option<String>,
        /// Channel
        #[arg(short, long, default_value = "general")]
        channel: String,
        /// Message words, joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Show unread messages for a session and mark them read
    Check { session_id: String },
    /// Live tail of all messages
    Watch,
    /// Interactive chat mode
    Chat,
    /// Show recent messages
    History {
        #[arg(default_value_t = 20)]
        n: u32,
    },
    /// Show agents active recently
    Status,
    /// Assign a name to a session; lists recent senders when run without arguments
    Assign {
        /// Friendly name to give
        #[arg(requires = "agent_id")]
        name: Option<String>,
        /// Sender shown in the log (agent-xxxxxxxx) or a session id prefix
        agent_id: Option<String>,
    },
    /// Auto-assign a name from the working directory suffix
    AutoAssign { session_id: String, cwd: String },
    /// Resolve a session id to its name
    ResolveName { session_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };
    let mut config = config_loader.load()?;
    if let Some(db) = &cli.db {
        config.store.path = db.to_string_lossy().into_owned();
    }

    let _log_guard = init_logging(&config.logging);

    let db = CommsDb::open(&config.store).await?;
    info!(path = %db.path().display(), "Using comms store");

    let result = run(cli.command, &db, &config).await;
    db.close().await;
    result
}

async fn run(command: Commands, db: &CommsDb, config: &Config) -> Result<()> {
    match command {
        Commands::Post {
            sender,
            channel,
            message,
        } => {
            let sender = sender.unwrap_or_else(|| config.chat.sender.clone());
            run_post(db, &sender, &channel, &message.join(" ")).await
        }
        Commands::Check { session_id } => run_check(db, &session_id).await,
        Commands::Watch => live::run_watch(db, &config.poll).await,
        Commands::Chat => live::run_chat(db, &config.poll, &config.chat).await,
        Commands::History { n } => run_history(db, n).await,
        Commands::Status => run_status(db, config.status.window_minutes).await,
        Commands::Assign { name, agent_id } => match (name, agent_id) {
            (Some(name), Some(agent_id)) => run_assign(db, &name, &agent_id).await,
            _ => run_assign_listing(db, config).await,
        },
        Commands::AutoAssign { session_id, cwd } => {
            run_auto_assign(db, config, &session_id, &cwd).await
        }
        Commands::ResolveName { session_id } => {
            println!("{}", NameRegistry::new(db).resolve(&session_id).await?);
            Ok(())
        }
    }
}

async fn run_post(db: &CommsDb, sender: &str, channel: &str, body: &str) -> Result<()> {
    let id = MessageLog::new(db).post(sender, channel, body).await?;
    info!(id, sender, channel, "Message posted");
    Ok(())
}

/// Print unread messages from others and advance the session's cursor.
/// Silent when there is nothing new, so hooks can run it on every step.
async fn run_check(db: &CommsDb, session_id: &str) -> Result<()> {
    let report = ReadCursors::new(db).check(session_id).await?;
    if report.is_empty() {
        return Ok(());
    }

    println!("{}", render::check_header(&report.name));
    for unread in &report.unread {
        println!("{}", render::format_unread(unread));
    }
    Ok(())
}

async fn run_history(db: &CommsDb, n: u32) -> Result<()> {
    let messages = MessageLog::new(db).recent(n).await?;
    if messages.is_empty() {
        println!("No messages yet.");
        return Ok(());
    }
    for message in &messages {
        println!("{}", render::format_row(message));
    }
    Ok(())
}

async fn run_status(db: &CommsDb, window_minutes: u32) -> Result<()> {
    let report = StatusReport::collect(db, window_minutes).await?;
    if report.is_empty() {
        println!(
            "No agents active in the last {} minutes.",
            report.window_minutes
        );
        return Ok(());
    }

    println!("{}", style(render::status_header()).bold());
    println!("{}", "-".repeat(40));
    for activity in &report.senders {
        println!("{}", render::format_status_row(activity));
    }
    Ok(())
}

async fn run_assign(db: &CommsDb, name: &str, agent_id: &str) -> Result<()> {
    let session_id = NameRegistry::new(db).assign_prefix(name, agent_id).await?;
    info!(name, session_id = %session_id, "Assigned name");
    println!("Assigned: {} -> {}", agent_id, name);
    Ok(())
}

async fn run_assign_listing(db: &CommsDb, config: &Config) -> Result<()> {
    let registry = NameRegistry::new(db);
    let senders = MessageLog::new(db).recent_senders(20).await?;

    println!("{}", style("Recent senders:").bold());
    for sender in senders {
        let tag = match registry.sender_assignment(&sender).await? {
            SenderAssignment::Named(name) => format!("  (= {})", name),
            SenderAssignment::Unassigned => format!("  {}", style("[unassigned]").yellow()),
            SenderAssignment::Friendly => String::new(),
        };
        println!("  {}{}", sender, tag);
    }
    println!("\nAvailable names: {}", config.agents.names.join(", "));
    println!("Usage: comms assign <name> <agent-id or session_id prefix>");
    Ok(())
}

async fn run_auto_assign(
    db: &CommsDb,
    config: &Config,
    session_id: &str,
    cwd: &str,
) -> Result<()> {
    let assigned = NameRegistry::new(db)
        .auto_assign(session_id, cwd, &config.agents)
        .await?;
    if let Some(name) = assigned {
        info!(session_id, name = %name, "Auto-assigned name");
        println!("{}", name);
    }
    Ok(())
}
