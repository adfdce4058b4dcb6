mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Types
// ============================================================================

/// Sessionvault - inspect captured platform login sessions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sessionvault.yaml", global = true)]
    config: String,

    /// Sessions file (overrides config file)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show session counts per platform
    Stats,

    /// List distinct user emails across all platforms
    Users,

    /// Show the most recent session for a platform
    Latest {
        /// Platform name (e.g. "marketinout", "tradingview")
        platform: String,

        #[command(flatten)]
        user: UserArgs,
    },

    /// List every valid session for a platform, most recent first
    All {
        /// Platform name
        platform: String,

        #[command(flatten)]
        user: UserArgs,
    },

    /// Show the latest MarketInOut session and its cookie
    Marketinout {
        #[command(flatten)]
        user: UserArgs,
    },

    /// Show snapshot cache diagnostics
    Status,
}

#[derive(Args, Debug)]
struct UserArgs {
    /// Only consider sessions captured by this user
    #[arg(long, requires = "password")]
    email: Option<String>,

    /// Password the sessions were captured with
    #[arg(long, requires = "email")]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let resolver = commands::open_resolver(&cli.config, cli.store.as_deref()).await?;

    match cli.command {
        Commands::Stats => commands::inspect::stats(&resolver).await,
        Commands::Users => commands::inspect::users(&resolver).await,
        Commands::Latest { platform, user } => {
            let creds = commands::credentials(user.email, user.password);
            commands::inspect::latest(&resolver, &platform, creds.as_ref()).await
        }
        Commands::All { platform, user } => {
            let creds = commands::credentials(user.email, user.password);
            commands::inspect::all(&resolver, &platform, creds.as_ref()).await
        }
        Commands::Marketinout { user } => {
            let creds = commands::credentials(user.email, user.password);
            commands::inspect::marketinout(&resolver, creds.as_ref()).await
        }
        Commands::Status => commands::inspect::status(&resolver).await,
    }
}

// ============================================================================
// Initialization
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
