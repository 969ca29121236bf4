//! Locating `archdiag.toml`.
//!
//! Candidates, first hit wins:
//!
//! | Source   | Path                                                   |
//! |----------|--------------------------------------------------------|
//! | flag     | `--config PATH` (not checked for existence)            |
//! | work dir | `./archdiag.toml`, then `./.archdiag.toml`             |
//! | global   | `$ARCHDIAG_CONFIG_DIR/config.toml` or `~/.archdiag/config.toml` |
//!
//! With no hit the built-in defaults apply. Relative paths inside a global
//! config are anchored at the global directory; the others stay relative to
//! the working directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use archdiag::Config;

/// Config file names looked up in the working directory.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["archdiag.toml", ".archdiag.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "ARCHDIAG_CONFIG_DIR";

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` on the command line.
    Explicit(PathBuf),
    /// A config file in the working directory.
    Project(PathBuf),
    /// The per-user config file.
    Global(PathBuf),
    /// Built-in defaults.
    Default,
}

impl ConfigSource {
    /// Config file path, `None` for defaults.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Whether this is the per-user config.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }

    /// Reads and parses the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No archdiag.toml found, using defaults");
            return Ok(Config::default());
        };
        let mut config = Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        if self.is_global() {
            tracing::info!("Using global config: {}", path.display());
            if let Some(dir) = path.parent() {
                anchor_paths(&mut config, dir);
            }
        }
        Ok(config)
    }
}

/// Picks the config for a run started in `work_dir`.
#[must_use]
pub fn resolve(work_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(work_dir, explicit, global_config_dir())
}

/// `resolve` with the global directory passed in, so tests never touch the
/// real environment.
fn resolve_inner(work_dir: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let local = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| work_dir.join(name))
        .find(|p| p.is_file());
    if let Some(path) = local {
        tracing::debug!("Found config: {}", path.display());
        return ConfigSource::Project(path);
    }

    match global_dir.map(|d| d.join(GLOBAL_CONFIG_NAME)) {
        Some(path) if path.is_file() => {
            tracing::debug!("Found global config: {}", path.display());
            ConfigSource::Global(path)
        }
        _ => ConfigSource::Default,
    }
}

/// `$ARCHDIAG_CONFIG_DIR`, else `~/.archdiag`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".archdiag")))
}

fn anchor_paths(config: &mut Config, dir: &Path) {
    let anchor = |p: &mut PathBuf| {
        if p.is_relative() {
            *p = dir.join(&*p);
        }
    };
    if let Some(p) = config.projects_dir.as_mut() {
        anchor(p);
    }
    anchor(&mut config.cache.dir);
}
