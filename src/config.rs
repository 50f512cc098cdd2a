//! Configuration file
//!
//! Optional TOML file at `~/.rdcli/config.toml`. Everything in it can be
//! overridden on the command line; a missing file means defaults.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 6379
//! auth = "secret"
//!
//! [repl]
//! history_size = 1000
//! max_redirects = 5
//! color = true
//! ```

use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_HISTORY_SIZE: usize = 1000;
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfiguration {
    pub server: Option<ServerConfig>,
    pub repl: Option<ReplConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub auth: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplConfig {
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_SIZE,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            color: true,
        }
    }
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

fn default_max_redirects() -> u32 {
    DEFAULT_MAX_REDIRECTS
}

fn default_color() -> bool {
    true
}

impl CliConfiguration {
    /// Load from `path`. A missing file yields the default configuration;
    /// a file that exists but fails to parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let path = expand_config_path(path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: CliConfiguration = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn resolved_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn resolved_repl(&self) -> ReplConfig {
        self.repl.clone().unwrap_or_default()
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_config_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_defaults() {
        let config = CliConfiguration::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(config.server.is_none());
        let repl = config.resolved_repl();
        assert_eq!(repl.history_size, DEFAULT_HISTORY_SIZE);
        assert_eq!(repl.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert!(repl.color);
    }

    #[test]
    fn test_full_file_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nhost = \"10.0.0.5\"\nport = 7000\nauth = \"pw\"\n\n[repl]\nhistory_size = 50\nmax_redirects = 2\ncolor = false\n",
        )
        .unwrap();

        let config = CliConfiguration::load(&path).unwrap();
        let server = config.resolved_server();
        assert_eq!(server.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(server.port, Some(7000));
        assert_eq!(server.auth.as_deref(), Some("pw"));
        let repl = config.resolved_repl();
        assert_eq!(repl.history_size, 50);
        assert_eq!(repl.max_redirects, 2);
        assert!(!repl.color);
    }

    #[test]
    fn test_partial_repl_section_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[repl]\nmax_redirects = 10\n").unwrap();

        let repl = CliConfiguration::load(&path).unwrap().resolved_repl();
        assert_eq!(repl.max_redirects, 10);
        assert_eq!(repl.history_size, DEFAULT_HISTORY_SIZE);
        assert!(repl.color);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nhost=").unwrap();
        assert!(CliConfiguration::load(&path).is_err());
    }
}
