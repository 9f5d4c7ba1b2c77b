// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod profile;
pub mod scan;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::{JsonFileScanStore, JsonProfileStore};

/// Licky tongue scan CLI
#[derive(Parser, Debug)]
#[command(name = "licky-scan")]
#[command(version)]
#[command(about = "Analyze tongue images and manage scan history", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "LICKY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding scan history, profile and captures
    #[arg(long, global = true, env = "LICKY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a tongue image and save the result
    Analyze(scan::AnalyzeArgs),

    /// List saved scans, newest first
    History(scan::HistoryArgs),

    /// Show one scan in detail
    Show {
        /// Scan id
        id: String,
    },

    /// Replace the notes on a scan
    Notes {
        id: String,
        /// New notes; an empty string clears them
        text: String,
    },

    /// Delete one scan
    Delete { id: String },

    /// Delete every scan
    Clear,

    /// Scan count per health status
    Stats,

    /// Manage the user profile
    #[command(subcommand)]
    Profile(profile::ProfileCommand),
}

/// Resolved configuration shared by every command
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: AppConfig,
}

impl CliContext {
    pub fn load(config_file: Option<&std::path::Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = AppConfig::load(config_file).context("Failed to load configuration")?;
        if let Some(dir) = data_dir {
            config.storage.data_dir = dir;
        }
        Ok(Self { config })
    }

    pub async fn scan_store(&self) -> Result<Arc<JsonFileScanStore>> {
        let path = self.config.storage.scans_path();
        let store = JsonFileScanStore::open(&path)
            .await
            .with_context(|| format!("Failed to open scan history at {}", path.display()))?;
        Ok(Arc::new(store))
    }

    pub fn profile_store(&self) -> JsonProfileStore {
        JsonProfileStore::new(self.config.storage.user_path())
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let ctx = CliContext::load(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::Analyze(args) => scan::analyze(&ctx, args).await,
        Commands::History(args) => scan::history(&ctx, args).await,
        Commands::Show { id } => scan::show(&ctx, &id).await,
        Commands::Notes { id, text } => scan::notes(&ctx, &id, text).await,
        Commands::Delete { id } => scan::delete(&ctx, &id).await,
        Commands::Clear => scan::clear(&ctx).await,
        Commands::Stats => scan::stats(&ctx).await,
        Commands::Profile(command) => profile::run(&ctx, command).await,
    }
}
