//! Configuration management for the collection server
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (collections.toml)
//! - Environment variables (COLLECTIONS__*)
//!
//! ## Example config file (collections.toml):
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [storage]
//! shopping_list_file = "shopping-list.json"
//! patients_file = "patients.json"
//!
//! [auth]
//! enabled = true
//! username = "admin"
//! password_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main configuration for the collection server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Data file locations for the file-backed services
    #[serde(default)]
    pub storage: StorageConfig,

    /// Basic authentication gate
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Shopping list data file
    #[serde(default = "default_shopping_list_file")]
    pub shopping_list_file: PathBuf,

    /// Patient queue data file
    #[serde(default = "default_patients_file")]
    pub patients_file: PathBuf,
}

/// Basic authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require credentials on every route
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub username: Option<String>,

    /// Argon2 PHC string, see `collection-server hash-password`
    #[serde(default)]
    pub password_hash: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_shopping_list_file() -> PathBuf {
    PathBuf::from(crate::shopping::DEFAULT_DATA_FILE)
}

fn default_patients_file() -> PathBuf {
    PathBuf::from(crate::patients::DEFAULT_DATA_FILE)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            shopping_list_file: default_shopping_list_file(),
            patients_file: default_patients_file(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the default locations, optionally adding a
    /// required file on top
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "collections.toml",
            ".collections.toml",
            "config/collections.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "collections") {
            let xdg_config = config_dir.config_dir().join("collections.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // COLLECTIONS__SERVER__PORT=9000 etc.
        builder = builder.add_source(
            Environment::with_prefix("COLLECTIONS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        std::fs::write(path, self.to_toml()?)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Socket address to listen on
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert!(!config.auth.enabled);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.patients_file, PathBuf::from("patients.json"));
        assert_eq!(config.bind_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_serialize_config() {
        let toml_str = ServiceConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[auth]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[auth]\nenabled = true\nusername = \"admin\"\n",
        )
        .unwrap();

        let config = ServiceConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert!(config.auth.enabled);
        assert_eq!(config.auth.username.as_deref(), Some("admin"));
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
