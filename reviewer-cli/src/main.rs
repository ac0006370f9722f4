//! Reviewer CLI - command line interface for the reviewer assignment engine
//!
//! Assigns pull request reviewers from the author's team and manages the
//! open/merged lifecycle against a local SQLite database.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reviewer_core::Config;
use reviewer_db::Database;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{App, PrArgs, TeamArgs, UserArgs};

/// Reviewer: fair reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "reviewer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the SQLite database (overrides config and env)
    #[arg(long, global = true, env = "REVIEWER_DATABASE_PATH")]
    db: Option<PathBuf>,

    /// Fixed seed for reviewer selection (overrides config and env)
    #[arg(long, global = true, env = "REVIEWER_SEED")]
    seed: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Manage teams
    Team(TeamArgs),

    /// Manage users
    User(UserArgs),

    /// Create, merge and reassign pull requests
    #[command(visible_alias = "pr")]
    PullRequest(PrArgs),

    /// Check that the database is reachable
    Health,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<reviewer_core::Error>() {
                Some(domain) => eprintln!("Error [{}]: {}", domain.code(), domain),
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.db.clone(), cli.seed)?;

    tracing::debug!(
        database = %config.database.path.display(),
        seed = ?config.assignment.seed,
        "Configuration loaded"
    );

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Reviewer - fair reviewer assignment for pull requests");
            println!();
            println!("Use --help for usage information");
            return Ok(());
        }
    };

    match command {
        Commands::Version => {
            println!("reviewer {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Config => {
            println!("Reviewer Configuration");
            println!("======================");
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        Commands::Health => {
            let db = open_database(&config).await?;
            db.ping().await.context("Database did not answer")?;
            println!("ok");
            db.close().await;
        }
        Commands::Team(args) => {
            let db = open_database(&config).await?;
            args.execute(&App::new(&db, &config, cli.json)).await?;
            db.close().await;
        }
        Commands::User(args) => {
            let db = open_database(&config).await?;
            args.execute(&App::new(&db, &config, cli.json)).await?;
            db.close().await;
        }
        Commands::PullRequest(args) => {
            let db = open_database(&config).await?;
            args.execute(&App::new(&db, &config, cli.json)).await?;
            db.close().await;
        }
    }

    Ok(())
}

async fn open_database(config: &Config) -> anyhow::Result<Database> {
    Database::connect_with_retry(&config.database, &config.retry)
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}",
                config.database.path.display()
            )
        })
}
