//! Session bootstrap
//!
//! Merges command-line arguments over the configuration file, connects
//! to the default node, and hands back a ready session. Precedence is
//! always individual flag, then `--uri`, then file, then built-in
//! default.

use crate::args::Cli;
use rdcli::config::{CliConfiguration, DEFAULT_HOST, DEFAULT_PORT};
use rdcli::driver::{NodeId, RedisDriver};
use rdcli::error::{CliError, Result};
use rdcli::registry::ClientRegistry;
use rdcli::session::{ReplSession, StdoutSink};

/// Pieces of a `redis://[:password@]host[:port][/db]` URI.
#[derive(Debug, Default, PartialEq)]
struct UriParts {
    host: Option<String>,
    port: Option<u16>,
    auth: Option<String>,
    db: Option<i64>,
}

fn parse_uri(uri: &str) -> Result<UriParts> {
    let rest = match uri.split_once("://") {
        Some(("redis", rest)) => rest,
        Some((scheme, _)) => {
            return Err(CliError::ParseError(format!(
                "Unsupported URI scheme '{}'",
                scheme
            )))
        }
        None => uri,
    };

    let (userinfo, addr_and_db) = match rest.rsplit_once('@') {
        Some((userinfo, tail)) => (Some(userinfo), tail),
        None => (None, rest),
    };
    let auth = userinfo
        .map(|info| match info.split_once(':') {
            Some((_, password)) => password,
            None => info,
        })
        .filter(|password| !password.is_empty())
        .map(str::to_string);

    let (addr, db) = match addr_and_db.split_once('/') {
        Some((addr, tail)) if !tail.is_empty() => {
            let db = tail.parse::<i64>().map_err(|_| {
                CliError::ParseError(format!("Invalid database number '{}'", tail))
            })?;
            (addr, Some(db))
        }
        Some((addr, _)) => (addr, None),
        None => (addr_and_db, None),
    };

    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| CliError::ParseError(format!("Invalid port '{}'", port)))?;
            (host, Some(port))
        }
        None => (addr, None),
    };

    Ok(UriParts {
        host: (!host.is_empty()).then(|| host.to_string()),
        port,
        auth,
        db,
    })
}

pub async fn create_session(
    cli: &Cli,
    config: &CliConfiguration,
) -> Result<ReplSession<RedisDriver>> {
    let server = config.resolved_server();
    let repl = config.resolved_repl();
    let uri = match &cli.uri {
        Some(uri) => parse_uri(uri)?,
        None => UriParts::default(),
    };

    if cli.no_color || !repl.color {
        colored::control::set_override(false);
    }

    let node = match &cli.socket {
        Some(path) => NodeId::new(path.clone()),
        None => {
            let host = cli
                .host
                .clone()
                .or(uri.host)
                .or(server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string());
            let port = cli.port.or(uri.port).or(server.port).unwrap_or(DEFAULT_PORT);
            NodeId::from_host_port(&host, port)
        }
    };

    let auth = cli.auth.clone().or(uri.auth).or(server.auth);
    let db = cli.db.or(uri.db).unwrap_or(0);
    let driver = RedisDriver::new(auth, db);
    let registry = ClientRegistry::connect(driver, node).await?;

    let max_redirects = cli.max_redirects.unwrap_or(repl.max_redirects);
    Ok(ReplSession::new(
        registry,
        cli.cluster,
        max_redirects,
        repl.history_size,
        Box::new(StdoutSink),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_uri() {
        let parts = parse_uri("redis://:secret@10.0.0.1:7000/2").unwrap();
        assert_eq!(parts.host.as_deref(), Some("10.0.0.1"));
        assert_eq!(parts.port, Some(7000));
        assert_eq!(parts.auth.as_deref(), Some("secret"));
        assert_eq!(parts.db, Some(2));
    }

    #[test]
    fn test_host_only_uri() {
        let parts = parse_uri("redis://10.0.0.1").unwrap();
        assert_eq!(parts.host.as_deref(), Some("10.0.0.1"));
        assert_eq!(parts.port, None);
        assert_eq!(parts.auth, None);
        assert_eq!(parts.db, None);
    }

    #[test]
    fn test_schemeless_uri() {
        let parts = parse_uri("10.0.0.1:6380").unwrap();
        assert_eq!(parts.host.as_deref(), Some("10.0.0.1"));
        assert_eq!(parts.port, Some(6380));
    }

    #[test]
    fn test_username_is_ignored_password_kept() {
        let parts = parse_uri("redis://user:pw@host").unwrap();
        assert_eq!(parts.auth.as_deref(), Some("pw"));
        assert_eq!(parts.host.as_deref(), Some("host"));
    }

    #[test]
    fn test_bad_scheme_and_bad_numbers_are_errors() {
        assert!(parse_uri("http://host").is_err());
        assert!(parse_uri("redis://host:notaport").is_err());
        assert!(parse_uri("redis://host:6379/notadb").is_err());
    }
}
