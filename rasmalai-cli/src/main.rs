//! CLI entry point for rasmalai

mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Confirm;
use rasmalai_chat::ConversationManager;
use rasmalai_core::config::{Config, ConfigLoader};
use rasmalai_core::logging::init_logging;
use rasmalai_core::session::FileHistoryStore;
use rasmalai_core::utils::expand_tilde;
use rasmalai_providers::{GeminiClient, GenerativeProvider, ImageAttachment};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "rasmalai")]
#[command(about = "Chat with Rasmalai AI from your terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat {
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
        /// Open saved chat number N instead of a new chat
        #[arg(short, long)]
        session: Option<usize>,
    },
    /// Send a single message and print the reply
    Send {
        /// Message text
        text: String,
        /// Image file to attach
        #[arg(short, long)]
        image: Option<PathBuf>,
        /// Continue saved chat number N
        #[arg(short, long)]
        session: Option<usize>,
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Manage saved chats
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Show configuration and storage status
    Status,
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List saved chats, newest first
    List,
    /// Print the messages of chat number N
    Show { number: usize },
    /// Delete chat number N
    Delete {
        number: usize,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may come from a local .env file.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };
    let config = config_loader.load()?;
    let _log_guard = init_logging(&config.logging);

    match cli.command {
        Commands::Chat { model, session } => {
            info!("Starting interactive chat");
            run_chat(&config, model, session).await?;
        }
        Commands::Send {
            text,
            image,
            session,
            model,
        } => {
            run_send(&config, &text, image, session, model).await?;
        }
        Commands::History { command } => match command {
            HistoryCommands::List => run_history_list(&config),
            HistoryCommands::Show { number } => run_history_show(&config, number)?,
            HistoryCommands::Delete { number, yes } => run_history_delete(&config, number, yes)?,
        },
        Commands::Status => run_status(&config_loader, &config),
    }

    Ok(())
}

fn history_path(config: &Config) -> PathBuf {
    expand_tilde(&config.storage.data_dir).join(&config.storage.history_file)
}

fn open_manager(config: &Config) -> ConversationManager {
    let path = history_path(config);
    debug!("Using history file {}", path.display());
    ConversationManager::new(FileHistoryStore::new(path), config.chat.clone())
}

fn build_provider(config: &Config, model: Option<String>) -> GeminiClient {
    if config.provider.api_key.trim().is_empty() {
        eprintln!(
            "{}",
            style("No API key configured; set GEMINI_API_KEY. Requests will fail.").yellow()
        );
    }
    let client = GeminiClient::from_config(&config.provider);
    match model {
        Some(model) => client.with_model(model),
        None => client,
    }
}

fn select_numbered(manager: &mut ConversationManager, number: usize) -> Result<()> {
    let id = repl::session_id_at(manager, number)
        .with_context(|| format!("No saved chat number {}", number))?;
    manager.select_session(&id);
    Ok(())
}

/// Run the interactive chat loop
async fn run_chat(config: &Config, model: Option<String>, session: Option<usize>) -> Result<()> {
    let provider = build_provider(config, model);
    let mut manager = open_manager(config);
    if let Some(number) = session {
        select_numbered(&mut manager, number)?;
    }

    println!(
        "{} {}",
        style("Rasmalai AI").bold().magenta(),
        style(format!("({})", provider.model())).dim()
    );
    repl::run(&mut manager, &provider).await
}

/// Send one message and print the reply
async fn run_send(
    config: &Config,
    text: &str,
    image: Option<PathBuf>,
    session: Option<usize>,
    model: Option<String>,
) -> Result<()> {
    let provider = build_provider(config, model);
    let mut manager = open_manager(config);
    if let Some(number) = session {
        select_numbered(&mut manager, number)?;
    }

    let image = image.map(ImageAttachment::from_path);
    if !repl::send_and_render(&mut manager, &provider, text, image).await {
        anyhow::bail!("Nothing to send: provide message text or --image");
    }
    Ok(())
}

fn run_history_list(config: &Config) {
    let manager = open_manager(config);
    repl::print_sessions(&manager);
}

fn run_history_show(config: &Config, number: usize) -> Result<()> {
    let mut manager = open_manager(config);
    select_numbered(&mut manager, number)?;
    repl::print_transcript(&manager);
    Ok(())
}

fn run_history_delete(config: &Config, number: usize, yes: bool) -> Result<()> {
    let mut manager = open_manager(config);
    let id = repl::session_id_at(&manager, number)
        .with_context(|| format!("No saved chat number {}", number))?;
    let title = manager
        .history()
        .get(&id)
        .map(|s| s.title.clone())
        .unwrap_or_default();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", title))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    manager.delete_session(&id);
    println!("{} {}", style("Deleted").green(), title);
    Ok(())
}

fn run_status(loader: &ConfigLoader, config: &Config) {
    let manager = open_manager(config);
    let key_status = if config.provider.api_key.trim().is_empty() {
        style("not set").red()
    } else {
        style("set").green()
    };

    println!("{}", style("Rasmalai status").bold().cyan());
    println!("Config:   {}", loader.config_path().display());
    println!("History:  {}", history_path(config).display());
    println!("Chats:    {}", manager.history().len());
    println!("Model:    {}", config.provider.model);
    println!("API key:  {}", key_status);
}
