//! # flowguard configuration
//!
//! One validated [`AgentConfig`] loaded at startup and read-only afterwards.
//!
//! Sources, later ones winning:
//! 1. Built-in defaults for every optional field
//! 2. The configuration file (`.yaml`, `.yml` or `.json`)
//! 3. `FLOWGUARD_*` environment variables, `__` separating nested keys
//!    (`FLOWGUARD_CYCLE__PAUSE_SECS=2`)
//!
//! Relative artifact and log file paths are resolved against the directory
//! holding the configuration file.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod capture;
mod collector;
mod cycle;
mod error;
mod logging;
mod model;
mod validation;

pub use capture::CaptureConfig;
pub use collector::CollectorConfig;
pub use cycle::CycleConfig;
pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use model::ModelConfig;

pub const ENV_PREFIX: &str = "FLOWGUARD_";

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct AgentConfig {
    /// Address identifying the monitored device; also used as the device
    /// name in every operational message.
    pub device_ip: IpAddr,

    #[validate(nested)]
    #[serde(default)]
    pub capture: CaptureConfig,

    #[validate(nested)]
    pub collector: CollectorConfig,

    #[validate(nested)]
    #[serde(default)]
    pub model: ModelConfig,

    #[validate(nested)]
    #[serde(default)]
    pub logging: LoggingConfig,

    #[validate(nested)]
    #[serde(default)]
    pub cycle: CycleConfig,
}

impl AgentConfig {
    /// Loads, validates and path-resolves the configuration at `path`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_env(path.as_ref(), Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn load_with_env(path: &Path, env: Env) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Figment::new().merge(Yaml::file(path)),
            Some("json") => Figment::new().merge(Json::file(path)),
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let mut config: Self = figment.merge(env).extract()?;
        config.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.model.resolve(base);
        config.logging.resolve(base);
        Ok(config)
    }

    /// Device identity used as the prefix of operational messages.
    pub fn device(&self) -> String {
        self.device_ip.to_string()
    }
}

pub(crate) fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
