//! `wot revoke`: Revoke trust in a DID.

use clap::Args;

use crate::config::WotConfig;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// DID to stop trusting.
    pub did: String,
}

pub fn run(args: &RevokeArgs, config: &WotConfig) -> anyhow::Result<()> {
    let session = Session::open(config)?;
    match session.trust().revoke_trust(&args.did)? {
        Some(_) => {
            session.persist()?;
            println!("Revoked trust in {}", args.did);
            println!("Copies already delivered to their document are not retracted.");
        }
        None => println!("No trust attestation for {}", args.did),
    }
    Ok(())
}
