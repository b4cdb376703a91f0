use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::broker::ledger::DEFAULT_INITIAL_CASH;
use crate::error::ConfigError;
use crate::model::forest::ForestParams;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const CONFIG_PATH_ENV: &str = "PAPER_SIGNAL_CONFIG";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrokerConfig {
    pub initial_cash: f64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            initial_cash: DEFAULT_INITIAL_CASH,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub n_estimators: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let params = ForestParams::default();
        Self {
            n_estimators: params.n_estimators,
            seed: params.seed,
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
        }
    }
}

impl ModelConfig {
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            seed: self.seed,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub model: ModelConfig,
    /// Default tracing filter; RUST_LOG takes precedence.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            broker: BrokerConfig::default(),
            model: ModelConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `.env`, then the YAML file named by `PAPER_SIGNAL_CONFIG` (or
    /// `config.yaml`), then applies `HOST`, `PORT` and `INITIAL_CASH` overrides.
    /// A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(cash) = lookup("INITIAL_CASH") {
            self.broker.initial_cash = cash.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "INITIAL_CASH".to_string(),
                value: cash.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.broker.initial_cash.is_finite() {
            return Err(ConfigError::Invalid("broker.initial_cash must be finite".to_string()));
        }
        if self.model.n_estimators == 0 {
            return Err(ConfigError::Invalid("model.n_estimators must be at least 1".to_string()));
        }
        if self.model.min_samples_split < 2 {
            return Err(ConfigError::Invalid("model.min_samples_split must be at least 2".to_string()));
        }
        Ok(())
    }
}
