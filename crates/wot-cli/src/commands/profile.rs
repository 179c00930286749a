//! `wot profile`: Edit the local profile.

use clap::{Args, Subcommand};

use crate::config::WotConfig;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Set and sign the display name and avatar.
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

pub fn run(args: &ProfileArgs, config: &WotConfig) -> anyhow::Result<()> {
    match &args.action {
        ProfileAction::Set { name, avatar } => {
            let session = Session::open(config)?;
            let profile = session.trust().set_profile(name.clone(), avatar.clone())?;
            session.persist()?;
            println!("Profile updated:");
            println!("  Name:    {}", profile.display_name.as_deref().unwrap_or("-"));
            println!("  Avatar:  {}", profile.avatar_url.as_deref().unwrap_or("-"));
            println!("  Signed:  {}", profile.signature.is_some());
        }
    }
    Ok(())
}
