use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::lookup::LookupConfig;

const LOCAL_CONFIG_PATH: &str = "ferrous-lookup.toml";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-lookup.toml in current directory
    /// 3. Default configuration
    ///
    /// Command-line and environment values are applied on top.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        let lookup = &mut self.lookup;
        if let Some(server) = overrides.server {
            lookup.server = Some(server);
        }
        if let Some(record_type) = overrides.record_type {
            lookup.record_type = Some(record_type);
        }
        if let Some(class) = overrides.class {
            lookup.class = class;
        }
        if let Some(timeout) = overrides.timeout {
            lookup.timeout = timeout;
        }
        if overrides.insecure {
            lookup.verify_tls = false;
        }
        if overrides.http3 {
            lookup.http3 = true;
        }
        if overrides.dnssec {
            lookup.dnssec = true;
        }
        if overrides.padding {
            lookup.padding = true;
        }
        if let Some(subnet) = overrides.subnet {
            lookup.subnet = Some(subnet);
        }
        if let Some(option) = overrides.edns_option {
            lookup.edns_option = Some(option);
        }
        if overrides.json {
            lookup.json = true;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lookup.validate().map_err(ConfigError::Validation)
    }
}

/// Command-line overrides for configuration. Boolean switches can only turn
/// a setting on (or, for `insecure`, turn verification off).
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub record_type: Option<String>,
    pub class: Option<String>,
    pub timeout: Option<u64>,
    pub insecure: bool,
    pub http3: bool,
    pub dnssec: bool,
    pub padding: bool,
    pub subnet: Option<String>,
    pub edns_option: Option<String>,
    pub json: bool,
    pub log_level: Option<String>,
}
