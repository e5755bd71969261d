use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite file, or `:memory:`
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory uploaded images are written to and served from
    pub dir: String,
    pub max_upload_mb: usize,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl MediaConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/cosmetics.db"

[server]
host = "0.0.0.0"
port = 3000

[media]
dir = "target/media"
max_upload_mb = 5
"#;

impl Default for Config {
    fn default() -> Self {
        parse_config(DEFAULT_CONFIG).unwrap_or_else(|e| panic!("embedded config is invalid: {e}"))
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(contents)?)
}

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

/// Resolve a configured relative path against the executable directory.
/// `:memory:` and absolute paths are returned unchanged.
pub fn resolve_path(path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if path == crate::shared::data::db::IN_MEMORY || candidate.is_absolute() {
        return candidate.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(candidate);
        }
    }

    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/cosmetics.db");
        assert_eq!(config.server.address(), "0.0.0.0:3000");
        assert_eq!(config.media.max_upload_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn test_missing_section_is_an_error() {
        assert!(parse_config("[database]\npath = \"x.db\"\n").is_err());
    }

    #[test]
    fn test_resolve_path_keeps_special_values() {
        assert_eq!(resolve_path(":memory:"), PathBuf::from(":memory:"));
        let absolute = if cfg!(windows) { "C:\\data\\app.db" } else { "/data/app.db" };
        assert_eq!(resolve_path(absolute), PathBuf::from(absolute));
        assert!(resolve_path("db/app.db").ends_with("db/app.db"));
    }
}
