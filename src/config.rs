use serde_derive::Deserialize;
use std::io::Read;
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use thiserror::*;

use crate::controller::ServerConfig;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error {0} when reading config")]
    IoError(#[from] std::io::Error),
    #[error("cannot open config file '{0}' : {1}")]
    OpeningError(PathBuf, std::io::Error),
    #[error("UTF8 format error when reading config")]
    Utf8Error,
    #[error("format error {0} when reading config")]
    FormatError(#[from] serde_yaml::Error),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("no storage url configured, set DATABASE_URL")]
    MissingStorageUrl,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Listen {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl From<&Listen> for ServerConfig {
    fn from(listen: &Listen) -> Self {
        ServerConfig {
            host: listen.host.clone(),
            port: listen.port,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listen: Listen,
    #[serde(default)]
    pub storage: StorageConfig,
    pub log: Option<crate::log::Log>,
}

/// Environment lookup, swappable in tests.
pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

impl Config {
    pub const PATH_VAR: &'static str = "TASKTRACKER_CONFIG";

    pub fn from_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let p = path.as_ref();
        let mut file = File::open(p).map_err(|e| ConfigError::OpeningError(p.to_owned(), e))?;
        let mut contents = vec![];
        file.read_to_end(&mut contents)?;
        let contents = String::from_utf8(contents).map_err(|_| ConfigError::Utf8Error)?;
        let config = Config::from_str(&contents)?;
        Ok(config)
    }

    /// Configuration from the file named by `TASKTRACKER_CONFIG` (if any),
    /// overridden by `HOST`, `PORT` and `DATABASE_URL` / `MONGO_URI`.
    pub fn load(env: &dyn Env) -> Result<Self, ConfigError> {
        let mut config = match env.var(Self::PATH_VAR) {
            Some(path) => Config::from_file(path)?,
            None => Config {
                listen: Listen::default(),
                storage: StorageConfig::default(),
                log: None,
            },
        };

        if let Some(host) = env.var("HOST") {
            config.listen.host = host;
        }
        if let Some(port) = env.var("PORT") {
            config.listen.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(url) = env.var("DATABASE_URL").or_else(|| env.var("MONGO_URI")) {
            config.storage.url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.url.trim().is_empty() {
            return Err(ConfigError::MissingStorageUrl);
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod testdata {
    use super::Config;

    pub fn test_config() -> Config {
        Config::from_str(
            r#"
        log:
            level: trace
            structured: false
        storage:
            url: "memory://"
        listen:
            host: 127.0.0.1
            port: 5055
        "#,
        )
        .unwrap()
    }
}
