mod commands;
mod tui;

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tododash_core::{Config, HttpTodoApi};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tododash")]
#[command(about = "A terminal task dashboard backed by a REST todo API", long_about = None)]
struct Cli {
    /// API base URL (overrides TODODASH_API_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Tasks per page
    #[arg(long, global = true)]
    limit: Option<u32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the Terminal User Interface
    Tui,
    /// List one page of tasks
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// pending, in-progress or completed (empty for all)
        #[arg(long, default_value = "")]
        status: String,
    },
    /// Show a single task
    Show { id: String },
    /// Create a task (deadline: 2025-01-01T09:00, tomorrow, +3d, fri ...)
    Add {
        title: String,
        #[arg(short, long)]
        description: String,
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "pending")]
        status: String,
    },
    /// Replace a task's fields; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show backend statistics
    Stats,
    /// Check the API connection
    Ping,
}

fn init_logging(config: &Config, to_file: bool) -> Result<()> {
    let default_filter = if to_file { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_deref().unwrap_or(default_filter)));

    if to_file {
        // Logging to the terminal would tear the TUI
        fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())
            .with_context(|| format!("Failed to open log file {}", config.log_path().display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(None)?
        .with_base_url(cli.base_url)
        .with_page_limit(cli.limit);

    let command = cli.command.unwrap_or(Commands::Tui);
    init_logging(&config, matches!(command, Commands::Tui))?;
    tracing::debug!(?config, "configuration loaded");

    let api = HttpTodoApi::new(config.base_url.clone())?;

    match command {
        Commands::Tui => tui::run(api, &config)?,
        Commands::List { page, status } => {
            commands::list(&api, page, config.page_limit, &status).await?
        }
        Commands::Show { id } => commands::show(&api, &id).await?,
        Commands::Add {
            title,
            description,
            deadline,
            status,
        } => commands::add(&api, title, description, deadline, &status).await?,
        Commands::Edit {
            id,
            title,
            description,
            deadline,
            status,
        } => {
            let changes = commands::EditArgs {
                title,
                description,
                deadline,
                status,
            };
            commands::edit(&api, &id, changes).await?
        }
        Commands::Delete { id, yes } => commands::delete(&api, &id, yes).await?,
        Commands::Stats => commands::stats(&api).await?,
        Commands::Ping => commands::ping(&api, &config.base_url).await?,
    }
    Ok(())
}
