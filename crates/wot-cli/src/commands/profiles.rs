//! `wot profiles`: List discovered profiles.

use clap::Args;
use wot_crypto::short_did;
use wot_discovery::TrackedProfile;

use crate::config::WotConfig;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct ProfilesArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn print_profile(profile: &TrackedProfile) {
    println!(
        "{:<24} {:<28} {:<14} {:<12} {:<8}",
        profile.display_name.as_deref().unwrap_or("-"),
        short_did(&profile.did),
        profile.discovery_source.to_string(),
        profile.load_state.to_string(),
        profile.signature_status.to_string(),
    );
}

pub async fn run(args: &ProfilesArgs, config: &WotConfig) -> anyhow::Result<()> {
    let session = Session::open(config)?;
    let discovery = session.discover().await?;
    let profiles = discovery.profiles();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    println!(
        "{:<24} {:<28} {:<14} {:<12} {:<8}",
        "NAME", "DID", "SOURCE", "STATE", "SIGNATURE"
    );
    for profile in &profiles {
        print_profile(profile);
    }
    if discovery.second_degree_count() > 0 {
        println!();
        println!("{} profiles via 2nd-degree trust", discovery.second_degree_count());
    }
    Ok(())
}
