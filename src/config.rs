//! Configuration loading and validation
//!
//! The raw [Config] comes from a toml file merged with environment
//! overrides. [Config::job] validates it into a [Job] before any
//! connection to the server is made.

use std::{env, fmt, path::PathBuf};

use anyhow::{Context as _, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Toml},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    naming::Targets,
    period::{Period, PeriodError, RawPeriod},
};

/// Prefix of environment variables overriding file settings.
///
/// Nested keys are separated by `__`, e.g. `LATEST_UPLOADER_SERVER__PASSWORD`.
pub const ENV_PREFIX: &str = "LATEST_UPLOADER_";

/// Keys taken verbatim from the environment instead of being parsed as values
const CREDENTIALS: [&str; 2] = ["server.username", "server.password"];

/// Reasons a configuration is rejected at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no folders configured")]
    NoFolders,
    #[error("folder '{0}' is not an absolute path")]
    RelativeFolder(String),
    #[error("file type '{0}' must start with '.' and must not contain '/'")]
    InvalidFileType(String),
    #[error("output name '{0}' must be a plain file name")]
    InvalidName(String),
    #[error("output name '{0}' is derived more than once")]
    DuplicateName(String),
    #[error(transparent)]
    Period(#[from] PeriodError),
}

/// Raw configuration as found in the config file
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    /// Absolute remote folders, processed in order
    pub folders: Vec<String>,
    /// Suffix of files to consider, e.g. `.jpg`
    pub file_type: String,
    #[serde(default = "default_label")]
    pub label: String,
    /// Output name when no periods are configured, defaults to `current<file_type>`
    pub target_name: Option<String>,
    /// Additional output name for the newest file regardless of time of day
    pub overall_name: Option<String>,
    #[serde(default)]
    pub periods: Vec<RawPeriod>,
}

fn default_label() -> String {
    "recent".to_owned()
}

/// Where the files live
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ServerConfig {
    /// FTP server with plain username/password login
    Ftp(FtpConfig),
    /// Local directory standing in for the server root, e.g. a mounted share
    Local { root: PathBuf },
}

#[derive(Clone, Deserialize)]
pub struct FtpConfig {
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
}

fn default_port() -> u16 {
    21
}

fn default_username() -> String {
    "anonymous".to_owned()
}

fn default_password() -> String {
    "anonymous@".to_owned()
}

impl fmt::Debug for FtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpConfig")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl FtpConfig {
    /// Override credentials from the environment.
    ///
    /// Figment would turn `123456` into a number and `0123` into `123`,
    /// so these variables are read as plain strings.
    fn credentials_from_env(&mut self) {
        if let Ok(username) = env::var(format!("{ENV_PREFIX}SERVER__USERNAME")) {
            self.username = username;
        }
        if let Ok(password) = env::var(format!("{ENV_PREFIX}SERVER__PASSWORD")) {
            self.password = password;
        }
    }
}

impl Config {
    /// Try loading the configuration from a toml file and the environment
    pub fn try_load(toml: &str) -> Result<Self> {
        let env = Env::prefixed(ENV_PREFIX)
            .split("__")
            .filter(|key| !CREDENTIALS.iter().any(|c| key == *c));

        let mut config: Self = Figment::new()
            .merge(Toml::file(toml))
            .merge(env)
            .extract()
            .with_context(|| format!("failed to load configuration from {toml}"))?;

        if let ServerConfig::Ftp(ftp) = &mut config.server {
            ftp.credentials_from_env();
        }
        Ok(config)
    }

    /// Validate the configuration into a [Job]
    pub fn job(&self) -> Result<Job, ConfigError> {
        if self.folders.is_empty() {
            return Err(ConfigError::NoFolders);
        }
        let folders = self
            .folders
            .iter()
            .map(|folder| normalize_folder(folder))
            .collect::<Result<Vec<_>, _>>()?;

        let file_type = self.file_type.trim();
        if file_type.len() < 2 || !file_type.starts_with('.') || file_type.contains('/') {
            return Err(ConfigError::InvalidFileType(self.file_type.clone()));
        }

        if self.label.contains('/') {
            return Err(ConfigError::InvalidName(self.label.clone()));
        }
        let target_name = match &self.target_name {
            Some(name) => checked_name(name)?,
            None => format!("current{file_type}"),
        };
        let overall_name = self.overall_name.as_deref().map(checked_name).transpose()?;

        let periods = self
            .periods
            .iter()
            .map(Period::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let targets = Targets::derive(
            &self.label,
            file_type,
            &target_name,
            overall_name.as_deref(),
            &periods,
        )?;

        Ok(Job {
            folders,
            file_type: file_type.to_owned(),
            targets,
        })
    }
}

/// Validated work description for one run
#[derive(Debug, Clone)]
pub struct Job {
    pub folders: Vec<String>,
    pub file_type: String,
    pub targets: Targets,
}

/// Strip trailing slashes from an absolute folder, keeping `/` itself
fn normalize_folder(folder: &str) -> Result<String, ConfigError> {
    if !folder.starts_with('/') {
        return Err(ConfigError::RelativeFolder(folder.to_owned()));
    }
    let trimmed = folder.trim_end_matches('/');
    Ok(if trimmed.is_empty() { "/" } else { trimmed }.to_owned())
}

fn checked_name(name: &str) -> Result<String, ConfigError> {
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(ConfigError::InvalidName(name.to_owned()));
    }
    Ok(name.to_owned())
}
