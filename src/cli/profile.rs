// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use super::CliContext;
use crate::models::{Gender, UserProfile};
use crate::storage::ProfileStore;
use crate::utils::format_date;

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Print the stored profile
    Show,

    /// Create the profile or change some of its fields
    Set(SetProfileArgs),

    /// Remove the stored profile
    Delete,
}

#[derive(Args, Debug, Default)]
pub struct SetProfileArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub age: Option<u32>,

    /// male, female or other
    #[arg(long)]
    pub gender: Option<Gender>,

    /// Path to a profile picture
    #[arg(long)]
    pub image: Option<String>,
}

pub async fn run(ctx: &CliContext, command: ProfileCommand) -> Result<()> {
    let store = ctx.profile_store();
    match command {
        ProfileCommand::Show => match store.get().await? {
            Some(user) => print_profile(&user),
            None => println!("No profile yet. Create one with `licky-scan profile set`"),
        },
        ProfileCommand::Set(args) => {
            let existing = store.get().await?;
            let is_new = existing.is_none();
            let user = apply_changes(existing, args)?;
            if is_new {
                store.upsert(user.clone()).await?;
                println!("✅ Profile created for {}", user.name);
            } else {
                store.update(user.clone()).await?;
                println!("✅ Profile updated for {}", user.name);
            }
        }
        ProfileCommand::Delete => {
            if store.delete().await? {
                println!("🗑️ Profile deleted");
            } else {
                println!("No profile to delete");
            }
        }
    }
    Ok(())
}

/// Merge `args` into the existing profile, or build a new one (name and
/// email required)
pub fn apply_changes(existing: Option<UserProfile>, args: SetProfileArgs) -> Result<UserProfile> {
    let mut user = match existing {
        Some(user) => user,
        None => {
            let name = args
                .name
                .clone()
                .ok_or_else(|| anyhow!("--name is required for a new profile"))?;
            let email = args
                .email
                .clone()
                .ok_or_else(|| anyhow!("--email is required for a new profile"))?;
            UserProfile::new(name, email)
        }
    };

    if let Some(name) = args.name {
        user.name = name;
    }
    if let Some(email) = args.email {
        user.email = email;
    }
    if args.age.is_some() {
        user.age = args.age;
    }
    if args.gender.is_some() {
        user.gender = args.gender;
    }
    if args.image.is_some() {
        user.profile_image_path = args.image;
    }
    Ok(user)
}

fn print_profile(user: &UserProfile) {
    println!("👤 {}", user.name);
    println!("  Email:   {}", user.email);
    if let Some(age) = user.age {
        println!("  Age:     {}", age);
    }
    if let Some(gender) = user.gender {
        println!("  Gender:  {}", gender);
    }
    if let Some(path) = &user.profile_image_path {
        println!("  Picture: {}", path);
    }
    println!("  Since:   {}", format_date(user.created_at));
}
