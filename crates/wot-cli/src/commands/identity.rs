//! `wot identity`: Show, reset or resolve identities.

use clap::{Args, Subcommand};
use wot_crypto::{did_to_public_key, short_did};

use crate::config::WotConfig;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct IdentityArgs {
    #[command(subcommand)]
    pub action: IdentityAction,
}

#[derive(Subcommand, Debug)]
pub enum IdentityAction {
    /// Show the local DID and personal document.
    Show,
    /// Replace the local identity with a new one.
    Reset {
        /// Confirm that the current secret key will be discarded.
        #[arg(long)]
        yes: bool,
    },
    /// Recover the public key encoded in a DID.
    Resolve {
        did: String,
    },
}

pub async fn run(args: &IdentityArgs, config: &WotConfig) -> anyhow::Result<()> {
    match &args.action {
        IdentityAction::Show => {
            let session = Session::open(config)?;
            let trust = session.trust();
            println!("Identity:");
            println!("  DID:         {}", trust.did());
            println!("  Short:       {}", short_did(trust.did()));
            println!("  Public key:  {}", trust.identity().public_key().to_hex());
            println!("  Document:    {}", trust.doc_url());
        }
        IdentityAction::Reset { yes } => {
            if !yes {
                anyhow::bail!("resetting discards the current secret key; pass --yes to confirm");
            }
            let session = Session::create(config).await?;
            println!("New identity:");
            println!("  DID:       {}", session.trust().did());
            println!("  Document:  {}", session.trust().doc_url());
        }
        IdentityAction::Resolve { did } => {
            let key = did_to_public_key(did)?;
            println!("DID:         {}", did);
            println!("Public key:  {}", key.to_hex());
        }
    }
    Ok(())
}
