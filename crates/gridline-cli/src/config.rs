//! Settings resolved from the YAML config file and global flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gridline_query::{AuditUser, EngineConfig, EvaluationMode};
use serde::Deserialize;

use crate::cli::GlobalArgs;

/// Store directory used when neither the config file nor `--store-dir` names one.
pub const DEFAULT_STORE_DIR: &str = ".gridline";

/// Contents of the YAML config file. Every key is optional.
///
/// ```yaml
/// mode: strict
/// default_page_size: 25
/// storage_key: teamFilters
/// store_dir: /var/lib/gridline
/// user:
///   id: u-17
///   name: Ada
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,
    pub store_dir: Option<PathBuf>,
    pub user: Option<UserConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Everything a command needs to run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub engine: EngineConfig,
    pub store_dir: PathBuf,
    pub user: AuditUser,
}

impl Settings {
    /// Reads the config file, if any, then applies the global flags on top.
    pub fn resolve(global: &GlobalArgs) -> Result<Self> {
        let file = match &global.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let store_dir = global
            .store_dir
            .clone()
            .or(file.store_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
        let user = file
            .user
            .map(|u| AuditUser { id: u.id, name: u.name })
            .unwrap_or_else(AuditUser::anonymous);

        tracing::debug!(
            store_dir = %store_dir.display(),
            mode = ?file.engine.mode,
            page_size = file.engine.default_page_size,
            "settings resolved"
        );
        Ok(Settings {
            engine: file.engine,
            store_dir,
            user,
        })
    }

    /// Applies per-command overrides.
    pub fn with_overrides(mut self, strict: bool, page_size: Option<usize>) -> Self {
        if strict {
            self.engine.mode = EvaluationMode::Strict;
        }
        if let Some(size) = page_size {
            self.engine.default_page_size = size;
        }
        self
    }
}
