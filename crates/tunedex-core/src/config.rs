//! Index configuration.
//!
//! Controls how the library tree is built (grouping attributes, transform
//! passes, recent list size) and where the persisted stores live.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::attr::Attr;
use crate::error::{Error, Result};
use crate::track::field;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "TUNEDEX_CONFIG";

const PLAYLISTS_FILE: &str = "playlists.json";
const RATINGS_FILE: &str = "ratings.json";
const FAVOURITES_FILE: &str = "favourites.json";
const CHECKLIST_FILE: &str = "checklist.json";
const HISTORY_FILE: &str = "history.json";
const CURSORS_FILE: &str = "cursors.json";

/// Configuration for building and persisting the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the persisted stores.
    pub data_directory: PathBuf,
    /// Attribute grouping the root collection.
    pub root_attribute: Attr,
    /// Attributes with their own top-level collection.
    pub secondary_attributes: Vec<Attr>,
    /// Attributes with a filter list over the root collection.
    pub filter_attributes: Vec<Attr>,
    /// Entries kept in the recent list.
    pub recent_count: usize,
    /// Strip leading track numbers from track names.
    pub trim_track_numbers: bool,
    /// Strip shared enumeration prefixes from track names.
    pub trim_enumerations: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            root_attribute: Attr::string(field::ALBUM),
            secondary_attributes: vec![Attr::string(field::ARTIST)],
            filter_attributes: vec![Attr::strings(field::COMPOSER)],
            recent_count: 20,
            trim_track_numbers: true,
            trim_enumerations: true,
        }
    }
}

impl IndexConfig {
    /// Load configuration from the default location, writing defaults if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        if !config_path.exists() {
            debug!("Config file not found, using defaults");
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                warn!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;

        info!("Loaded config from {}", path.display());
        debug!("Data directory: {}", config.data_directory.display());
        Ok(config)
    }

    /// Save configuration to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to `path`, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Configuration(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            Error::Configuration(format!("Failed to write config file {}: {e}", path.display()))
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Change the data directory after checking it can hold the stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is relative, not a directory, or not writable.
    pub fn set_data_directory(&mut self, path: PathBuf) -> Result<()> {
        validate_storage_directory(&path)?;
        self.data_directory = path;
        info!("Updated data directory to: {}", self.data_directory.display());
        Ok(())
    }

    /// Check the configured data directory, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is relative, not a directory, or not writable.
    pub fn ensure_data_directory(&self) -> Result<()> {
        validate_storage_directory(&self.data_directory)
    }

    /// Playlist store file.
    #[must_use]
    pub fn playlists_file(&self) -> PathBuf {
        self.data_directory.join(PLAYLISTS_FILE)
    }

    /// Rating store file.
    #[must_use]
    pub fn ratings_file(&self) -> PathBuf {
        self.data_directory.join(RATINGS_FILE)
    }

    /// Favourites flag store file.
    #[must_use]
    pub fn favourites_file(&self) -> PathBuf {
        self.data_directory.join(FAVOURITES_FILE)
    }

    /// Checklist flag store file.
    #[must_use]
    pub fn checklist_file(&self) -> PathBuf {
        self.data_directory.join(CHECKLIST_FILE)
    }

    /// Play history store file.
    #[must_use]
    pub fn history_file(&self) -> PathBuf {
        self.data_directory.join(HISTORY_FILE)
    }

    /// Cursor store file.
    #[must_use]
    pub fn cursors_file(&self) -> PathBuf {
        self.data_directory.join(CURSORS_FILE)
    }

    /// Path of the default config file.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        config_file_path()
    }
}

/// Default directory for the persisted stores.
#[must_use]
pub fn default_data_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tunedex")
}

fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("tunedex")
        .join("config.json")
}

fn validate_storage_directory(path: &Path) -> Result<()> {
    if !path.is_absolute() {
        return Err(Error::Configuration(
            "Data directory must be an absolute path".to_string(),
        ));
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(Error::Configuration(format!(
                "Path exists but is not a directory: {}",
                path.display()
            )));
        }

        let test_file = path.join(".tunedex_write_test");
        match fs::write(&test_file, "test") {
            Ok(()) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                return Err(Error::Configuration(format!(
                    "Directory is not writable: {} ({})",
                    path.display(),
                    e
                )));
            }
        }
    } else {
        fs::create_dir_all(path).map_err(|e| {
            Error::Configuration(format!("Cannot create directory {}: {}", path.display(), e))
        })?;
    }

    Ok(())
}
