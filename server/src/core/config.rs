//! Application configuration
//!
//! Layered: serde defaults < TOML config file < CLI/env overlay.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SESSION_TTL_DAYS, MAX_UPLOAD_BYTES,
};

/// Check if the host binds all interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    host == "0.0.0.0" || host == "::"
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub uploads: UploadsConfig,
    pub debug: bool,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Authentication settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub session_ttl_days: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
        }
    }
}

/// Image upload settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub enabled: bool,
    pub max_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Load configuration: file (if any) overlaid with CLI options
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let mut config = match Self::config_path(cli) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        // CLI/env overlay
        if let Some(host) = &cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if cli.no_auth {
            config.auth.enabled = false;
        }
        if cli.debug {
            config.debug = true;
        }
        if let Some(enabled) = cli.uploads_enabled {
            config.uploads.enabled = enabled;
        }

        Ok(config)
    }

    fn config_path(cli: &CliConfig) -> Option<PathBuf> {
        if let Some(path) = &cli.config {
            return Some(path.clone());
        }
        // Default location: ./.pacecrew/config.toml
        let cwd = std::env::current_dir().ok()?;
        Some(cwd.join(APP_DOT_FOLDER).join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.auth.enabled);
        assert!(config.uploads.enabled);
        assert!(!config.debug);
    }

    #[test]
    fn test_cli_overlay() {
        let cli = CliConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(9999),
            no_auth: true,
            debug: true,
            config: None,
            uploads_enabled: Some(false),
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9999);
        assert!(!config.auth.enabled);
        assert!(config.debug);
        assert!(!config.uploads.enabled);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            port = 4900

            [auth]
            session_ttl_days = 30
            "#,
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 4900);
        // Unspecified sections fall back to defaults
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.auth.session_ttl_days, 30);
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
