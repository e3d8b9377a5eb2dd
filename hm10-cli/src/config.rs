//! Tool configuration - stored in HM10_HOME

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hm10_driver::DriverConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory, set HM10_HOME")]
    NoHome,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Serial device the module is attached to
    pub device: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// Silence after the first byte that ends a response
    pub idle_gap_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            // module factory default
            baud_rate: 9600,
            read_timeout_ms: 1000,
            idle_gap_ms: 50,
        }
    }
}

impl Config {
    /// Command line flags win over the file
    pub fn override_with(
        &mut self,
        device: Option<String>,
        baud_rate: Option<u32>,
        read_timeout_ms: Option<u64>,
    ) {
        if let Some(device) = device {
            self.device = device;
        }
        if let Some(baud_rate) = baud_rate {
            self.baud_rate = baud_rate;
        }
        if let Some(read_timeout_ms) = read_timeout_ms {
            self.read_timeout_ms = read_timeout_ms;
        }
    }

    pub fn idle_gap(&self) -> Duration {
        Duration::from_millis(self.idle_gap_ms)
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            ..DriverConfig::default()
        }
    }
}

/// HM10_HOME, or `~/.hm10`
pub fn hm10_home() -> Result<PathBuf, ConfigError> {
    if let Ok(home) = std::env::var("HM10_HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .map(|home| home.join(".hm10"))
        .ok_or(ConfigError::NoHome)
}

/// Load `config.json` from `home`, falling back to defaults if it is missing
pub fn load(home: &Path) -> Result<Config, ConfigError> {
    let path = home.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    parse(&data).map_err(|source| ConfigError::Parse { path, source })
}

pub fn save(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let path = home.join(CONFIG_FILE);
    let io_err = |source| ConfigError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(home).map_err(io_err)?;
    let data = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, data).map_err(io_err)?;
    Ok(path)
}

fn parse(data: &str) -> Result<Config, serde_json::Error> {
    serde_json::from_str(data)
}
