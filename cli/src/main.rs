use std::net::Ipv4Addr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portfolio::{AppConfig, AppState, EnvConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portfolio", about = "Personal portfolio site with a contact form")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). Ignored when RUST_LOG is set.
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    /// Read environment variables from this file instead of `.env`.
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site until Ctrl-C or SIGTERM.
    Serve {
        /// Listening port, overrides PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Validate the configuration and build the backends without serving.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_env_file(cli.env_file.as_deref())?;
    init_tracing(cli.verbosity);

    let config = AppConfig::from_env().context("reading configuration from the environment")?;
    let state = AppState::from_config(&config).context("invalid configuration")?;
    tracing::info!(
        storage = state.contacts.store_kind(),
        mailer = state.contacts.mailer_kind(),
        "backends ready"
    );

    match cli.command {
        Commands::Check => {
            println!(
                "configuration ok: storage={} mailer={}",
                state.contacts.store_kind(),
                state.contacts.mailer_kind()
            );
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            portfolio::serve((Ipv4Addr::UNSPECIFIED, port), portfolio::router(state))
                .await
                .context("error running HTTP server")?;
        }
    }

    Ok(())
}

fn load_env_file(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("loading {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
