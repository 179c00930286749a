//! `wot scan`: Register a scanned discovery payload.

use clap::Args;
use wot_discovery::DiscoveryPayload;

use crate::commands::profiles::print_profile;
use crate::config::WotConfig;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Payload JSON: {"did": ..., "userDocUrl": ..., "displayName": ...}
    pub payload: String,
}

pub async fn run(args: &ScanArgs, config: &WotConfig) -> anyhow::Result<()> {
    let payload = DiscoveryPayload::from_json(&args.payload)?;
    let session = Session::open(config)?;
    if payload.did == session.trust().did() {
        anyhow::bail!("payload describes the local identity");
    }
    session.storage().put_contact(&payload)?;

    let discovery = session.discover().await?;
    match discovery.profile(&payload.did) {
        Some(profile) => print_profile(&profile),
        None => println!("Registered {}", payload.user_doc_url),
    }
    Ok(())
}
