use std::{
    env,
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::config::logger_config::LoggerConfig;
use crate::error::{LaunchError, Result};
use crate::locale::Locale;

/// Environment variable naming the wine prefix when it is not configured explicitly.
pub const PREFIX_ENV_VAR: &str = "WINEPREFIX";

/// Everything a launch request needs.
///
/// Please use [`LaunchConfigBuilder`] to build it from code, or
/// [`LaunchConfigReader`] to load it from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Root of the Wine installation (`bin/`, `lib64/` live below it).
    pub root: PathBuf,
    /// Wine prefix. Required: assembling a launch without one fails with
    /// [`LaunchError::MissingPrefix`].
    #[serde(default)]
    pub prefix: Option<PathBuf>,
    /// Command handed to `explorer.exe`. `None` selects the default startup command.
    #[serde(default)]
    pub cmdline: Option<String>,
    /// Locale override. `None` uses the active locale of the process.
    #[serde(default)]
    pub locale: Option<Locale>,
    #[serde(default)]
    pub logger_config: Option<LoggerConfig>,
}

impl LaunchConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), prefix: None, cmdline: None, locale: None, logger_config: None }
    }

    /// Builds a config the way a host without explicit configuration does: the prefix comes
    /// from `WINEPREFIX`.
    pub fn from_env(root: impl Into<PathBuf>, cmdline: Option<String>) -> Self {
        Self::from_env_with(root, cmdline, |key| env::var_os(key).map(PathBuf::from))
    }

    pub fn from_env_with<F>(root: impl Into<PathBuf>, cmdline: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let mut config = Self::new(root);
        config.cmdline = cmdline;
        config.prefix = prefix_from(lookup);
        config
    }

    /// Fills a missing prefix from `WINEPREFIX`; an explicit prefix always wins.
    pub fn or_env_prefix(mut self) -> Self {
        if self.prefix.is_none() {
            self.prefix = prefix_from(|key| env::var_os(key).map(PathBuf::from));
        }
        self
    }

    pub fn require_prefix(&self) -> Result<&Path> {
        self.prefix.as_deref().ok_or(LaunchError::MissingPrefix)
    }
}

fn prefix_from<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    lookup(PREFIX_ENV_VAR).filter(|p| !p.as_os_str().is_empty())
}

/// `LaunchConfigBuilder` is a convenience builder to create a `LaunchConfig` from code.
pub struct LaunchConfigBuilder {
    config: LaunchConfig,
}

impl LaunchConfigBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { config: LaunchConfig::new(root) }
    }

    pub fn with_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.config.prefix = Some(prefix.into());
        self
    }

    pub fn with_cmdline(mut self, cmdline: impl Into<String>) -> Self {
        self.config.cmdline = Some(cmdline.into());
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.config.locale = Some(locale);
        self
    }

    pub fn with_logger_config(mut self, logger_config: LoggerConfig) -> Self {
        self.config.logger_config = Some(logger_config);
        self
    }

    /// Retrieves the configuration built
    pub fn get(self) -> LaunchConfig {
        self.config
    }
}

pub struct LaunchConfigReader;

impl LaunchConfigReader {
    pub fn read_json(path: &Path) -> Result<LaunchConfig> {
        if !path.exists() {
            return Err(LaunchError::Config(format!("{} not found", path.display())));
        }
        let mut file = File::open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let config = serde_json::from_slice(bytes.as_slice())?;
        Ok(config)
    }

    pub fn write_json(config: &LaunchConfig, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_vec_pretty(config)?.as_slice())?;
        Ok(())
    }
}
