//! Loading of the TOML configuration file and the JSON level file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use hexpop_core::LevelLayout;
use hexpop_system_orchestrator::{GridConfig, ShooterConfig};
use serde::Deserialize;

/// Contents of the configuration file; every section is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Grid geometry used when no level is supplied.
    pub(crate) grid: GridConfig,
    /// Shooter tuning.
    pub(crate) shooter: ShooterConfig,
}

impl CliConfig {
    /// Reads and parses the configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("config is not valid toml")
    }
}

/// Reads a level layout; the cell array is validated when the level is loaded.
pub(crate) fn load_level(path: &Path) -> Result<LevelLayout> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse level json at {}", path.display()))
}
