use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vblkpurge_lib::PersistMode;

/// Default values for options that neither the CLI nor the config file set.
pub struct Defaults;

impl Defaults {
    pub const PERSIST: &'static str = "per_block";
    pub const PROGRAM: &'static str = vblkpurge_lib::erase::DEFAULT_PROGRAM;
    pub const DEVICE_PREFIX: &'static str = vblkpurge_lib::purge::DEFAULT_DEVICE_PREFIX;
    pub const DRY: bool = false;
}

/// Root of the JSON configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeToolConfig {
    /// Metadata file; `~` and environment variables are expanded.
    #[serde(default)]
    pub mpath: Option<String>,
    #[serde(default)]
    pub dry: bool,
    #[serde(default = "default_persist")]
    pub persist: String,
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_device_prefix")]
    pub device_prefix: String,
    #[serde(default)]
    pub quiet: bool,
}

fn default_persist() -> String {
    Defaults::PERSIST.to_string()
}
fn default_program() -> String {
    Defaults::PROGRAM.to_string()
}
fn default_device_prefix() -> String {
    Defaults::DEVICE_PREFIX.to_string()
}

impl PurgeToolConfig {
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)?;
        let config: PurgeToolConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn with_defaults() -> Self {
        Self {
            mpath: None,
            dry: Defaults::DRY,
            persist: Defaults::PERSIST.to_string(),
            program: Defaults::PROGRAM.to_string(),
            device_prefix: Defaults::DEVICE_PREFIX.to_string(),
            quiet: false,
        }
    }

    pub fn parse_persist(&self) -> Result<PersistMode, String> {
        PersistMode::from_str(&self.persist).map_err(|_| {
            format!(
                "Invalid persist mode '{}'. Must be one of: per_block, on_completion",
                self.persist
            )
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        self.parse_persist()?;

        if self.program.trim().is_empty() {
            return Err("program must not be empty".to_string());
        }

        if let Some(ref mpath) = self.mpath
            && mpath.trim().is_empty()
        {
            return Err("mpath must not be empty".to_string());
        }

        Ok(())
    }
}
