//! `wot trust`: Attest trust in a DID.

use clap::Args;
use wot_core::TrustLevel;

use crate::config::WotConfig;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct TrustArgs {
    /// DID to trust.
    pub did: String,
    /// Trust level (full, limited).
    #[arg(short, long, default_value = "full")]
    pub level: TrustLevel,
    /// The trustee's personal document URL, if not already known.
    #[arg(long)]
    pub doc_url: Option<String>,
}

pub async fn run(args: &TrustArgs, config: &WotConfig) -> anyhow::Result<()> {
    let session = Session::open(config)?;
    let outcome = session
        .trust()
        .set_trust(&args.did, args.level, args.doc_url.as_deref())
        .await?;
    session.persist()?;

    let attestation = &outcome.attestation;
    println!("Trust attested:");
    println!("  Trustee:     {}", attestation.trustee_id);
    println!("  Level:       {}", attestation.level);
    println!("  Signed:      {}", attestation.is_signed());
    println!("  Mutual:      {}", session.trust().is_mutual(&args.did));
    if outcome.propagated {
        println!("  Delivered to {}", attestation.trustee_doc_url.as_deref().unwrap_or("-"));
    } else {
        println!("  Not delivered; the trustee's document is not available locally.");
    }
    Ok(())
}
