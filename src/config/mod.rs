use crate::errors::{AppError, AppResult};
use crate::utils::path::resolve_path;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// On-device store (SQLite key-value file).
    #[serde(default = "default_database")]
    pub database: String,
    /// Stand-in for the hosted backend.
    #[serde(default = "default_remote_database")]
    pub remote_database: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// How long a command waits for background reconciliation before exiting.
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_remote_database() -> String {
    Config::remote_database_file().to_string_lossy().to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_remote_timeout() -> u64 {
    5
}
fn default_currency() -> String {
    "$".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            remote_database: default_remote_database(),
            log_level: default_log_level(),
            remote_timeout_secs: default_remote_timeout(),
            currency: default_currency(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("tito")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".tito")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("tito.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("tito.sqlite")
    }

    pub fn remote_database_file() -> PathBuf {
        Self::config_dir().join("tito-remote.sqlite")
    }

    /// Load the configuration file, or defaults when there is none yet.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn save(&self) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(Self::config_file(), yaml).map_err(|_| AppError::ConfigSave)
    }

    /// Create the config directory and file.
    ///
    /// Relative database names are placed inside the config directory. In
    /// test mode nothing is written to the config file.
    pub fn init_all(
        database: Option<&str>,
        remote_database: Option<&str>,
        is_test: bool,
    ) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let place = |name: &str| {
            let p = resolve_path(name);
            if p.is_absolute() { p } else { dir.join(p) }
        };

        let mut config = Self::load().unwrap_or_default();
        if let Some(name) = database {
            config.database = place(name).to_string_lossy().to_string();
        }
        if let Some(name) = remote_database {
            config.remote_database = place(name).to_string_lossy().to_string();
        }

        if !is_test {
            config.save()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tito.conf");
        fs::write(&path, "database: /tmp/x.sqlite\ncurrency: \"€\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert_eq!(cfg.currency, "€");
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.remote_timeout_secs, 5);
    }

    #[test]
    fn broken_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tito.conf");
        fs::write(&path, "database: [unclosed").unwrap();
        assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.conf")).unwrap();
        assert_eq!(cfg.currency, "$");
    }
}
