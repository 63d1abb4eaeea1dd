use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roundtable_infrastructure::RoundtablePaths;

mod commands;
mod context;
mod logging;
mod render;

use context::AppContext;

#[derive(Parser)]
#[command(name = "roundtable")]
#[command(about = "Roundtable - multi-party discussions between scripted and model-backed characters", long_about = None)]
struct Cli {
    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a discussion in an interactive session
    Chat {
        discussion_id: String,
    },
    /// Start a new discussion and print its id
    New {
        #[arg(long)]
        topic: String,
        /// chat, debate, brainstorm, interview or opinion
        #[arg(long, default_value = "chat")]
        mode: String,
        #[arg(long)]
        title: Option<String>,
        /// Character ids, 1 to 4
        #[arg(required = true)]
        characters: Vec<String>,
    },
    /// List stored discussions
    List,
    /// Delete a discussion
    Delete {
        discussion_id: String,
    },
    /// List built-in and custom characters
    Characters,
    /// List models offered by a provider
    Models {
        provider: String,
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Test the model connection of a character
    Probe {
        character_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = RoundtablePaths::resolve().context("Failed to resolve roundtable directories")?;
    let _log_guard = logging::init(&paths)?;
    let ctx = AppContext::load(paths, cli.config)?;
    tracing::debug!(config = ?ctx.config_service.path(), "Starting roundtable");

    match cli.command {
        Commands::Chat { discussion_id } => commands::chat::run(&ctx, &discussion_id).await?,
        Commands::New {
            topic,
            mode,
            title,
            characters,
        } => commands::discussions::create(&ctx, topic, &mode, title, &characters).await?,
        Commands::List => commands::discussions::list(&ctx).await?,
        Commands::Delete { discussion_id } => {
            commands::discussions::delete(&ctx, &discussion_id).await?
        }
        Commands::Characters => commands::characters::list(&ctx).await?,
        Commands::Models { provider, endpoint } => {
            commands::characters::models(&ctx, &provider, endpoint.as_deref()).await?
        }
        Commands::Probe { character_id } => commands::characters::probe(&ctx, &character_id).await?,
    }

    ctx.usecase.shutdown_all().await;
    Ok(())
}
