//! Project configuration (dmxctrl.yaml).
//!
//! Optional settings that change how documents are compiled. Command-line
//! flags override whatever the file says.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DmxError, Result};
use crate::parser::{CompileOptions, OverflowPolicy};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "dmxctrl.yaml";

/// Settings loaded from dmxctrl.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `error` rejects regulators running past channel 512, `allow` keeps them.
    pub channel_overflow: OverflowPolicy,

    /// Whether icon files referenced by documents must exist.
    pub check_icons: bool,

    /// Universe for documents that do not name one.
    pub default_universe: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_overflow: OverflowPolicy::Error,
            check_icons: true,
            default_universe: 1,
        }
    }
}

impl Config {
    /// Load config from a dmxctrl.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DmxError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse config from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        // An empty file is a valid, all-default config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(content).map_err(|e| DmxError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILE)),
        })?;

        if config.default_universe == 0 {
            return Err(DmxError::Config {
                message: "default_universe must be at least 1".to_string(),
                help: None,
            });
        }

        Ok(config)
    }

    /// Path of the config file in `dir`, if there is one.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        let path = dir.join(CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Load an explicitly given file, else `dmxctrl.yaml` in `dir`, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit.map(Path::to_path_buf).or_else(|| Self::find(dir)) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            channel_overflow: self.channel_overflow,
            check_icons: self.check_icons,
            default_universe: self.default_universe,
        }
    }
}
