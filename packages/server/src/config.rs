use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::engagement::ScoringPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Real-time hub settings.
#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    /// Per-connection outbound queue length. A full queue drops the message
    /// for that connection only.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub engagement: ScoringPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PULSE__DATABASE__URL)
            .add_source(
                Environment::with_prefix("PULSE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
