//! wot: command-line interface for the web of trust.
//!
//! Subcommands: init, identity, profile, trust, revoke, scan, profiles,
//! graph, doc.

mod commands;
mod config;
mod session;
mod storage;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{LogFormat, LoggingConfig, WotConfig};

/// wot: Decentralized web of trust.
#[derive(Parser, Debug)]
#[command(name = "wot", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "wot.toml")]
    config: PathBuf,

    /// Override the data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration and create a local identity.
    Init(commands::init::InitArgs),
    /// Show, reset or resolve identities.
    Identity(commands::identity::IdentityArgs),
    /// Edit the local profile.
    Profile(commands::profile::ProfileArgs),
    /// Attest trust in a DID.
    Trust(commands::trust::TrustArgs),
    /// Revoke trust in a DID.
    Revoke(commands::revoke::RevokeArgs),
    /// Register a scanned discovery payload.
    Scan(commands::scan::ScanArgs),
    /// List discovered profiles.
    Profiles(commands::profiles::ProfilesArgs),
    /// Print the trust graph.
    Graph(commands::graph::GraphArgs),
    /// Export or import documents.
    Doc(commands::doc::DocArgs),
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = WotConfig::load(&cli.config)?.with_overrides(cli.data_dir.clone(), cli.log_level.clone());
    config.validate()?;
    init_tracing(&config.logging);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config, &config).await,
        Commands::Identity(args) => commands::identity::run(args, &config).await,
        Commands::Profile(args) => commands::profile::run(args, &config),
        Commands::Trust(args) => commands::trust::run(args, &config).await,
        Commands::Revoke(args) => commands::revoke::run(args, &config),
        Commands::Scan(args) => commands::scan::run(args, &config).await,
        Commands::Profiles(args) => commands::profiles::run(args, &config).await,
        Commands::Graph(args) => commands::graph::run(args, &config).await,
        Commands::Doc(args) => commands::doc::run(args, &config),
    }
}
