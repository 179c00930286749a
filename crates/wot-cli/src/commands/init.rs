//! `wot init`: Write a default configuration and create a local identity.

use clap::Args;
use std::path::Path;

use crate::config::WotConfig;
use crate::session::Session;
use crate::storage::Storage;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub async fn run(args: &InitArgs, config_path: &Path, config: &WotConfig) -> anyhow::Result<()> {
    if config_path.exists() && !args.force {
        println!("Using existing configuration at {}", config_path.display());
    } else {
        config.save(config_path)?;
        println!("Wrote configuration to {}", config_path.display());
    }

    let existing = Storage::open(&config.db_path())?.load_identity()?.is_some();
    if existing {
        let session = Session::open(config)?;
        println!("Identity already initialized:");
        println!("  DID:       {}", session.trust().did());
        println!("  Document:  {}", session.trust().doc_url());
        return Ok(());
    }

    let session = Session::create(config).await?;
    println!("Created identity:");
    println!("  DID:       {}", session.trust().did());
    println!("  Document:  {}", session.trust().doc_url());
    println!("Run 'wot profile set --name <name>' to publish a display name.");
    Ok(())
}
