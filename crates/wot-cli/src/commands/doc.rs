//! `wot doc`: Export or import documents.
//!
//! Exported bundles carry the URL alongside the document so that a peer can
//! import them under the same address.

use anyhow::Context;
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::config::WotConfig;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct DocArgs {
    #[command(subcommand)]
    pub action: DocAction,
}

#[derive(Subcommand, Debug)]
pub enum DocAction {
    /// Print a document bundle (the personal document by default).
    Export {
        #[arg(long)]
        url: Option<String>,
    },
    /// Store a document bundle produced by `wot doc export`.
    Import {
        file: PathBuf,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct DocBundle {
    url: String,
    doc: Value,
}

pub fn run(args: &DocArgs, config: &WotConfig) -> anyhow::Result<()> {
    let session = Session::open(config)?;
    match &args.action {
        DocAction::Export { url } => {
            let url = url.as_deref().unwrap_or(session.trust().doc_url()).to_string();
            let doc = session
                .storage()
                .get_document(&url)?
                .with_context(|| format!("no document stored at {url}"))?;
            println!("{}", serde_json::to_string_pretty(&DocBundle { url, doc })?);
        }
        DocAction::Import { file } => {
            let contents = std::fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let bundle: DocBundle = serde_json::from_str(&contents)?;
            if bundle.url == session.trust().doc_url() {
                anyhow::bail!("refusing to overwrite the personal document");
            }
            session.storage().put_document(&bundle.url, &bundle.doc)?;
            println!("Imported {}", bundle.url);
        }
    }
    Ok(())
}
