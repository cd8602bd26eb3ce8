pub mod cli;

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;

use crate::db::{default_db_path, DATA_DIR_NAME};
use crate::deck::DeckOptions;
use crate::error::{Error, Result};

pub use cli::Cli;

const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "lyric-deck.log";

/// Settings read from `~/.lyric-deck/config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    /// Open the saved document once the deck has been generated.
    pub open_after_generate: bool,
    pub deck: DeckOptions,
}

impl AppConfig {
    /// Load from an explicit file, or from the default location when `path`
    /// is `None`. A missing default file yields the built-in defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::MissingConfig(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(LOG_FILE_NAME)),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(CONFIG_FILE_NAME))
}

fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or(Error::NoHomeDir)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
