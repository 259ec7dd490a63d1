use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Connection settings consumed by the drivers.
///
/// Keys keep the names used by existing `config.toml` files (`dbDriver`,
/// `dbHostname`, ...). For the `sqlite` driver `db_name` is the database file
/// path and the network fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    pub db_driver: String,
    pub db_hostname: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_username: String,
    pub db_password: String,
    pub db_debug: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_driver: "postgres".to_string(),
            db_hostname: "127.0.0.1".to_string(),
            db_port: 5432,
            db_name: "database".to_string(),
            db_username: "username".to_string(),
            db_password: "password".to_string(),
            db_debug: false,
        }
    }
}

impl DatabaseConfig {
    /// Settings for a local SQLite database file.
    #[must_use]
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            db_driver: "sqlite".to_string(),
            db_name: path.into(),
            ..Self::default()
        }
    }
}

/// Whole-application configuration: HTTP listener plus database settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[serde(flatten)]
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database: DatabaseConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Region lookup HTTP service")]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// Address to bind the HTTP listener to
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind the HTTP listener to
    #[arg(long)]
    pub port: Option<u16>,
    /// Database engine name (overrides `dbDriver`)
    #[arg(long)]
    pub db_driver: Option<String>,
    /// Log statements and parameters
    #[arg(long)]
    pub db_debug: bool,
}

impl AppConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns `toml::de::Error` if the text is not valid TOML or a key has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read a configuration file. A missing file at the default location yields defaults.
    ///
    /// # Errors
    /// Returns `ConfigLoadError` if an explicitly named file cannot be read, or any file fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigLoadError::Io { path, source }),
        };

        Self::from_toml_str(&text).map_err(|source| ConfigLoadError::Parse { path, source })
    }

    /// Load the file named by `args` and apply command-line overrides.
    ///
    /// # Errors
    /// Returns `ConfigLoadError` if the file cannot be loaded.
    pub fn from_args(args: Args) -> Result<Self, ConfigLoadError> {
        let mut config = Self::load(args.config.as_deref())?;
        config.apply_overrides(args);
        Ok(config)
    }

    fn apply_overrides(&mut self, args: Args) {
        if let Some(host) = args.host {
            self.host = host;
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(driver) = args.db_driver {
            self.database.db_driver = driver;
        }
        if args.db_debug {
            self.database.db_debug = true;
        }
    }
}
