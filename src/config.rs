use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::eval::RuleDef;

/// Embedded scaffold written by `cc-hookguard init`.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Project configuration file name, searched upward from the working directory.
pub const CONFIG_FILE_NAME: &str = ".cc-hookguard.toml";

/// Environment variable naming the agent's project root.
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

// ── Process options ──

/// Options fixed once at process start and passed down by reference.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Explicit config file; disables discovery.
    pub config_path: Option<PathBuf>,
    /// Searched before the working directory's ancestors.
    pub project_dir: Option<PathBuf>,
    /// Where discovery starts.
    pub cwd: PathBuf,
    /// Machine-readable output for reporting commands.
    pub json: bool,
}

// ── File format ──

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Absent when the file has no `[guard]` table.
    #[serde(default)]
    pub guard: Option<GuardConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    /// Debug-log file: absolute, `~`-prefixed, or relative to the config file.
    #[serde(default)]
    pub debug_log: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// A config file together with where it was found.
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: Config,
}

impl Config {
    /// The embedded scaffold, parsed.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// The embedded scaffold as written to disk by `init`.
    pub fn scaffold() -> &'static str {
        DEFAULT_CONFIG
    }

    /// Parse TOML text; `path` is only used in errors.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a config file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Find and load the project configuration.
    ///
    /// Resolution order:
    /// 1. `options.config_path` (must exist)
    /// 2. `$CLAUDE_PROJECT_DIR/.cc-hookguard.toml`
    /// 3. `.cc-hookguard.toml` in the working directory or any ancestor
    ///
    /// `Ok(None)` means no configuration exists, which the guard treats
    /// as "allow everything".
    pub fn discover(options: &Options) -> Result<Option<LoadedConfig>, ConfigError> {
        let Some(path) = locate(options)? else {
            log::debug!("no {CONFIG_FILE_NAME} found from {}", options.cwd.display());
            return Ok(None);
        };
        log::debug!("loading config from {}", path.display());
        let config = Self::load_file(&path)?;
        Ok(Some(LoadedConfig { path, config }))
    }
}

fn locate(options: &Options) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = &options.config_path {
        let path = options.cwd.join(path);
        if !path.is_file() {
            return Err(ConfigError::NotFound { path });
        }
        return Ok(Some(path));
    }

    let project = options
        .project_dir
        .iter()
        .map(|dir| dir.join(CONFIG_FILE_NAME));
    let ancestors = options
        .cwd
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME));
    Ok(project.chain(ancestors).find(|p| p.is_file()))
}

impl LoadedConfig {
    /// Directory the config file lives in; relative paths resolve against it.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Resolved debug-log path, if one is configured.
    pub fn debug_log_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        let Some(raw) = self
            .config
            .guard
            .as_ref()
            .and_then(|g| g.debug_log.as_deref())
            .filter(|p| !p.trim().is_empty())
        else {
            return Ok(None);
        };
        let expanded = shellexpand::full(raw).map_err(|e| ConfigError::DebugLogPath {
            path: raw.to_string(),
            reason: e.to_string(),
        })?;
        let path = Path::new(expanded.as_ref());
        Ok(Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }))
    }
}
