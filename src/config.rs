use std::fs;
use std::str::FromStr;
use std::time::Duration;

use serde_derive::Deserialize;
use serde_json::from_str;

use crate::error::ConfigError;
use crate::pool::Pool;
use crate::target::{HttpTarget, Target};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct Configs {
    #[serde(default)]
    pub load_balancer: ServerConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub servers: Vec<BackendConfig>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// One backend entry: a bare URL, `{ "url": .. }` or `{ "host": .., "port": .. }`.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BackendConfig {
    Url(String),
    WithUrl {
        url: String,
        #[serde(default = "default_alive")]
        alive: bool,
    },
    HostPort {
        host: String,
        port: u16,
        #[serde(default = "default_alive")]
        alive: bool,
    },
}

fn default_alive() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl BackendConfig {
    pub fn address(&self) -> String {
        match self {
            BackendConfig::Url(url) | BackendConfig::WithUrl { url, .. } => url.clone(),
            BackendConfig::HostPort { host, port, .. } => format!("http://{}:{}", host, port),
        }
    }

    pub fn alive(&self) -> bool {
        match self {
            BackendConfig::Url(_) => true,
            BackendConfig::WithUrl { alive, .. } | BackendConfig::HostPort { alive, .. } => *alive,
        }
    }

    fn build_target(&self) -> Result<HttpTarget, ConfigError> {
        let target = HttpTarget::new(&self.address())?;
        target.set_alive(self.alive());
        Ok(target)
    }
}

impl Configs {
    pub fn from_file(path: &str) -> Result<Configs, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        input.parse()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds one target per backend entry, keeping their order.
    pub fn build_pool(&self) -> Result<Pool, ConfigError> {
        let targets = self
            .servers
            .iter()
            .map(|server| server.build_target().map(|t| Box::new(t) as Box<dyn Target>))
            .collect::<Result<Vec<_>, _>>()?;
        Pool::new(targets)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl FromStr for Configs {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Configs, ConfigError> {
        let configs: Configs = from_str(input)?;
        configs.validate()?;
        Ok(configs)
    }
}
