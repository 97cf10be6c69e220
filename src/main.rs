//! sealcache CLI - inspect and manage an expiring secure store.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sealcache::config::Config;
use sealcache::paths;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sealcache")]
#[command(version, about = "Typed, expiring key-value store for tokens and session data")]
struct Cli {
    /// Config file (default: ~/.sealcache/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store file, overriding the config
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a value
    Set {
        key: String,
        value: String,
        /// Lifetime in seconds (default: never expires)
        #[arg(long)]
        ttl: Option<u64>,
        /// Parse VALUE as JSON instead of storing it as a string
        #[arg(long)]
        json: bool,
    },
    /// Print a value (exit status 1 when absent)
    Get { key: String },
    /// Remove a value
    Rm { key: String },
    /// Check whether a live value exists (exit status 1 when absent)
    Has { key: String },
    /// Show envelope metadata without evicting
    Info {
        key: String,
        #[arg(long)]
        json: bool,
    },
    /// Show counts over the well-known keys
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Evict expired well-known keys
    ClearExpired,
    /// Remove every well-known key
    ClearAll {
        /// Confirm removal
        #[arg(long)]
        yes: bool,
    },
    /// Auth token management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum AuthAction {
    /// Store the auth token
    SetToken {
        token: String,
        /// Lifetime in seconds (default from config, 24h)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Store the refresh token
    SetRefresh {
        token: String,
        /// Lifetime in seconds (default from config, 7d)
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Print the auth token
    Token,
    /// Print the refresh token
    Refresh,
    /// Report whether a live auth token exists (exit status 1 when not)
    Status,
    /// Remove auth token, refresh token, user id and session data
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => paths::get_config_path()?,
    };
    let config = if cli.config.is_some() {
        Config::load_from(&config_path)?
    } else {
        Config::load_or_default(&config_path)?
    };

    init_logging(cli.log_format, &config.log.level);

    let validation = config.validate()?;
    for warning in &validation.warnings {
        tracing::warn!("{warning}");
    }

    let ctx = commands::Context::open(&config, cli.store.as_deref())?;

    match cli.command {
        Commands::Set {
            key,
            value,
            ttl,
            json,
        } => commands::item::set(&ctx, &key, &value, ttl, json).await,
        Commands::Get { key } => commands::item::get(&ctx, &key).await,
        Commands::Rm { key } => commands::item::remove(&ctx, &key).await,
        Commands::Has { key } => commands::item::has(&ctx, &key).await,
        Commands::Info { key, json } => commands::item::info(&ctx, &key, json).await,
        Commands::Stats { json } => commands::maintenance::stats(&ctx, json).await,
        Commands::ClearExpired => commands::maintenance::clear_expired(&ctx).await,
        Commands::ClearAll { yes } => commands::maintenance::clear_all(&ctx, yes).await,
        Commands::Auth { action } => commands::auth::execute(&ctx, action).await,
    }
}

/// Initialize logging to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(format: LogFormat, default_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}
