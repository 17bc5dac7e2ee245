use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::PathBuf;
use vblkpurge_lib::{PersistMode, PurgeConfig};

use crate::config::PurgeToolConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "vblk purging", long_about = None)]
pub struct Cli {
    /// JSON configuration file path
    #[arg(long = "config", short = 'f')]
    pub config: Option<String>,

    /// Path to the block metadata file (`~` and $VARS are expanded)
    #[arg(long = "mpath")]
    pub mpath: Option<String>,

    /// Print the erase commands without running them or updating the metadata file
    #[arg(long = "dry")]
    pub dry: bool,

    /// When to rewrite the metadata file (default: per_block)
    #[arg(long = "persist", value_enum)]
    pub persist: Option<PersistMode>,

    /// Erase utility to invoke (default: nvm_vblk)
    #[arg(long = "program")]
    pub program: Option<String>,

    /// Prefix joined with the device name from the metadata file (default: /dev/)
    #[arg(long = "device-prefix")]
    pub device_prefix: Option<String>,

    /// Suppress progress and report output
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[derive(Debug)]
pub struct MergedConfig {
    pub purge: PurgeConfig,
    pub quiet: bool,
}

/// Expand `~` and environment variables in `raw` and make it absolute.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    expand_path_with(raw, || std::env::var("HOME").ok(), |var| {
        std::env::var(var).map(Some)
    })
}

/// Like [`expand_path`], with the home directory and variables taken from the
/// given lookups. An undefined variable is an error.
fn expand_path_with<H, L, E>(raw: &str, home_dir: H, lookup: L) -> Result<PathBuf>
where
    H: FnOnce() -> Option<String>,
    L: FnMut(&str) -> std::result::Result<Option<String>, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let expanded = shellexpand::full_with_context(raw, home_dir, lookup)
        .with_context(|| format!("Failed to expand path '{}'", raw))?;
    std::path::absolute(&*expanded)
        .with_context(|| format!("Failed to resolve path '{}'", expanded))
}

/// Merge CLI arguments with configuration file, CLI args take precedence
pub fn merge_config(args: &Cli, config: Option<PurgeToolConfig>) -> Result<MergedConfig> {
    let base_config = config.unwrap_or_else(PurgeToolConfig::with_defaults);

    let Some(raw_mpath) = args.mpath.clone().or_else(|| base_config.mpath.clone()) else {
        bail!("Metadata path must be specified either via --mpath or in config file");
    };
    if raw_mpath.trim().is_empty() {
        bail!("Metadata path must not be empty");
    }
    let mpath = expand_path(&raw_mpath)?;

    let persist = match args.persist {
        Some(p) => p,
        None => base_config
            .parse_persist()
            .map_err(|e| anyhow!("Invalid persist mode in config: {}", e))?,
    };

    let program = args
        .program
        .clone()
        .unwrap_or_else(|| base_config.program.clone());
    if program.trim().is_empty() {
        bail!("Erase program must not be empty");
    }

    let device_prefix = args
        .device_prefix
        .clone()
        .unwrap_or_else(|| base_config.device_prefix.clone());

    Ok(MergedConfig {
        purge: PurgeConfig {
            mpath,
            dry_run: args.dry || base_config.dry,
            persist,
            program,
            device_prefix,
        },
        quiet: args.quiet || base_config.quiet,
    })
}
