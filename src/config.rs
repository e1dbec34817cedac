use crate::core::db::Credentials;
use crate::core::{NzError, Result};
use crate::student::LabProfile;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default Netezza port.
pub const DEFAULT_PORT: u16 = 5480;

/// Default number of rows shown when rendering result grids.
pub const DEFAULT_MAX_ROWS: usize = 50;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Backend used to open connections. Only `sqlite` is bundled.
    pub driver: Option<String>,
    pub connection: ConnectionConfig,
    pub lab: Option<LabConfig>,
    pub output: Option<OutputConfig>,
}

/// Connection settings.
#[derive(Debug, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Lab notebook settings.
#[derive(Debug, Deserialize)]
pub struct LabConfig {
    pub student_id: String,
    pub source_database: String,
    pub source_schema: String,
}

/// Console output settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Print plaintext passwords in diagnostics.
    pub reveal_secrets: Option<bool>,
    /// Emit the table style directive before result grids.
    pub table_style: Option<bool>,
    pub max_rows: Option<usize>,
}

impl Config {
    pub fn driver_name(&self) -> &str {
        self.driver.as_deref().unwrap_or("sqlite")
    }

    pub fn credentials(&self) -> Credentials {
        let c = &self.connection;
        Credentials::new(
            c.user.clone(),
            c.password.clone(),
            c.host.clone(),
            c.database.clone(),
            c.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Lab settings combined with the connection's host and login.
    pub fn lab_profile(&self) -> Option<LabProfile> {
        self.lab.as_ref().map(|lab| LabProfile {
            host: self.connection.host.clone(),
            port: self.connection.port.unwrap_or(DEFAULT_PORT),
            user: self.connection.user.clone(),
            password: self.connection.password.clone(),
            source_database: lab.source_database.clone(),
            source_schema: lab.source_schema.clone(),
        })
    }

    pub fn reveal_secrets(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.reveal_secrets)
            .unwrap_or(false)
    }

    pub fn table_style(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.table_style)
            .unwrap_or(false)
    }

    pub fn max_rows(&self) -> usize {
        self.output
            .as_ref()
            .and_then(|o| o.max_rows)
            .unwrap_or(DEFAULT_MAX_ROWS)
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| NzError::Config(e.to_string()))
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = nzkit::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config.credentials());
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| NzError::Config(format!("{}: {}", path.display(), e)))?;
    parse_config(&content)
}

/// `<config dir>/nzkit/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nzkit").join("config.toml"))
}
