use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::errors::LedgerError;

pub const CONFIG_FILE_NAME: &str = "pocket_ledger.json";
const DEFAULT_LEDGER_FILE: &str = "transactions.csv";

/// When mutations reach the ledger file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Every added transaction rewrites the whole file immediately.
    #[default]
    WriteThrough,
    /// Changes stay in memory until the session flushes on exit.
    OnExit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger_file: PathBuf,
    pub sync_policy: SyncPolicy,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_file: PathBuf::from(DEFAULT_LEDGER_FILE),
            sync_policy: SyncPolicy::default(),
            color: true,
        }
    }
}

impl Config {
    /// Resolves a relative ledger path against `base`.
    pub fn ledger_path_in(&self, base: &Path) -> PathBuf {
        if self.ledger_file.is_absolute() {
            self.ledger_file.clone()
        } else {
            base.join(&self.ledger_file)
        }
    }
}

/// Reads the optional JSON settings file.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manager for the settings file inside `base`.
    pub fn in_dir(base: &Path) -> Self {
        Self::new(base.join(CONFIG_FILE_NAME))
    }

    /// Loads the settings; a missing file yields the defaults.
    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
