//! Command-line arguments
//!
//! `-h` is the server host here, as redis-cli users expect, so the
//! automatic help short flag is disabled and only `--help` prints usage.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rdcli",
    version,
    about = "Interactive command-line client for key-value stores",
    disable_help_flag = true
)]
pub struct Cli {
    /// Server hostname
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Server port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Unix socket path (overrides host and port)
    #[arg(short = 's', long)]
    pub socket: Option<String>,

    /// Password for authentication
    #[arg(short = 'a', long)]
    pub auth: Option<String>,

    /// Server URI, e.g. redis://:password@host:port/db
    #[arg(short = 'u', long)]
    pub uri: Option<String>,

    /// Database number
    #[arg(short = 'n', long)]
    pub db: Option<i64>,

    /// Enable cluster mode: follow MOVED redirects
    #[arg(short = 'c', long)]
    pub cluster: bool,

    /// Redirect hops to follow before giving up
    #[arg(long)]
    pub max_redirects: Option<u32>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(long, default_value = "~/.rdcli/config.toml")]
    pub config: PathBuf,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Command to run non-interactively; omit for the prompt
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["rdcli"]);
        assert_eq!(cli.host, None);
        assert_eq!(cli.db, None);
        assert!(!cli.cluster);
        assert!(cli.command.is_empty());
        assert_eq!(cli.config, PathBuf::from("~/.rdcli/config.toml"));
    }

    #[test]
    fn test_short_h_is_host() {
        let cli = Cli::parse_from(["rdcli", "-h", "10.0.0.1", "-p", "7000", "-c"]);
        assert_eq!(cli.host.as_deref(), Some("10.0.0.1"));
        assert_eq!(cli.port, Some(7000));
        assert!(cli.cluster);
    }

    #[test]
    fn test_trailing_command() {
        let cli = Cli::parse_from(["rdcli", "-a", "pw", "get", "foo"]);
        assert_eq!(cli.auth.as_deref(), Some("pw"));
        assert_eq!(cli.command, ["get", "foo"]);
    }

    #[test]
    fn test_uri_flag() {
        let cli = Cli::parse_from(["rdcli", "-u", "redis://:pw@10.0.0.1:7000/2"]);
        assert_eq!(cli.uri.as_deref(), Some("redis://:pw@10.0.0.1:7000/2"));
    }

    #[test]
    fn test_socket_and_redirect_cap() {
        let cli = Cli::parse_from(["rdcli", "-s", "/tmp/redis.sock", "--max-redirects", "3"]);
        assert_eq!(cli.socket.as_deref(), Some("/tmp/redis.sock"));
        assert_eq!(cli.max_redirects, Some(3));
    }
}
