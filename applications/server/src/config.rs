/// Server configuration
use crate::error::{Result, ServerError};
use jukebox_rotation::RotationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_cache")]
    pub cache: CacheSettings,

    #[serde(default)]
    pub rotation: RotationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Maximum number of cached entries
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl ServerConfig {
    /// Load configuration from an optional file, then the environment
    ///
    /// Environment variables use the `JUKEBOX_` prefix and `__` between
    /// nested keys, e.g. `JUKEBOX_ROTATION__STRATEGY=artist_radio`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path));
            }
            None if Path::new("config.toml").exists() => {
                settings = settings.add_source(config::File::with_name("config.toml"));
            }
            None => {}
        }

        settings = settings.add_source(
            config::Environment::with_prefix("JUKEBOX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(ServerError::Config(
                "storage.database_url is required".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(ServerError::Config(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }

        if self.cache.capacity == 0 {
            return Err(ServerError::Config(
                "cache.capacity must be at least 1".to_string(),
            ));
        }

        if self.rotation.source_timeout_ms == 0 {
            return Err(ServerError::Config(
                "rotation.source_timeout_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        max_connections: default_max_connections(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/jukebox.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_cache() -> CacheSettings {
    CacheSettings {
        capacity: default_capacity(),
    }
}

fn default_capacity() -> usize {
    4096
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            cache: default_cache(),
            rotation: RotationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukebox_rotation::{ReplenishStrategy, UpdateMissPolicy};

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        config.validate().unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.database_url, "sqlite://./data/jukebox.db");
        assert_eq!(config.cache.capacity, 4096);
        assert_eq!(config.rotation.strategy, ReplenishStrategy::History);
    }

    #[test]
    fn load_from_file_keeps_unset_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jukebox.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9090

[rotation]
strategy = "artist_radio"
update_miss_policy = "resolve"
source_timeout_ms = 1500
"#,
        )
        .unwrap();

        let config = ServerConfig::load(Some(&path)).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.max_connections, 5);
        assert_eq!(config.rotation.strategy, ReplenishStrategy::ArtistRadio);
        assert_eq!(config.rotation.update_miss_policy, UpdateMissPolicy::Resolve);
        assert_eq!(config.rotation.source_timeout_ms, 1500);
        assert_eq!(config.rotation.least_played_limit, 50);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut config = ServerConfig::default();
        config.cache.capacity = 0;
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }
}
