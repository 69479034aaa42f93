//! Layered configuration: optional `configuration.*` file, then `APP__`
//! prefixed environment variables (`__` separates nested sections).

use config::{Config as Cfg, Environment as EnvSource, File};
use serde::Deserialize;

pub use config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn is_prod(self) -> bool {
        matches!(self, Environment::Prod)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Dev
    }
}

/// Settings shared by every service binary.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Build a config source layering the optional `configuration` file under
/// `APP__` prefixed environment variables, then deserialize into `T`.
pub fn load<T: serde::de::DeserializeOwned>() -> Result<T, config::ConfigError> {
    dotenvy::dotenv().ok();
    let cfg = Cfg::builder()
        .add_source(File::with_name("configuration").required(false))
        .add_source(EnvSource::with_prefix("APP").separator("__"))
        .build()?;
    cfg.try_deserialize()
}
