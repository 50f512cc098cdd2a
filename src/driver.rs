//! Backend driver seam
//!
//! Everything protocol-level lives behind the [`Driver`] trait: opening a
//! connection to one node, invoking a command, opening a push stream for
//! blocking commands, and closing. The production implementation wraps
//! the `redis` crate; tests substitute a scripted driver.

use crate::reply::Reply;
use futures_util::StreamExt;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Buffered push events per blocking stream.
const PUSH_BUFFER: usize = 64;

/// Identifies one backend node: `host:port` for TCP, a bare path for
/// unix-socket nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn from_host_port(host: &str, port: u16) -> Self {
        NodeId(format!("{}:{}", host, port))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failures reported by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverError {
    /// Cluster redirect: the key's slot now lives on another node
    Moved { slot: u16, node: NodeId },

    /// Verb not supported and no raw-send path available
    Unsupported(String),

    /// Transport-level failure (refused, dropped, timed out)
    ConnectionLost(String),

    /// Backend rejected the command
    Reply(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Moved { slot, node } => write!(f, "MOVED {} {}", slot, node),
            DriverError::Unsupported(msg) => write!(f, "{}", msg),
            DriverError::ConnectionLost(msg) => write!(f, "{}", msg),
            DriverError::Reply(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DriverError {}

/// Push-stream flavor for blocking commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Subscribe,
    PatternSubscribe,
    Monitor,
}

/// Capability set consumed from the backend driver.
#[allow(async_fn_in_trait)]
pub trait Driver {
    type Conn;

    /// Open a connection to `node`.
    async fn connect(&self, node: &NodeId) -> Result<Self::Conn, DriverError>;

    /// Invoke one command and return its structured reply.
    async fn invoke(
        &self,
        conn: &mut Self::Conn,
        verb: &str,
        args: &[String],
    ) -> Result<Reply, DriverError>;

    /// Open a push stream on `node` for a blocking command. Returns the
    /// server's acknowledgment reply alongside the stream. Dropping the
    /// receiver tears the stream down.
    async fn open_stream(
        &self,
        node: &NodeId,
        kind: StreamKind,
        args: &[String],
    ) -> Result<(Reply, mpsc::Receiver<Reply>), DriverError>;

    /// Release a connection.
    async fn close(&self, conn: Self::Conn);
}

/// Production driver over the `redis` crate.
#[derive(Debug, Clone)]
pub struct RedisDriver {
    auth: Option<String>,
    db: i64,
}

impl RedisDriver {
    pub fn new(auth: Option<String>, db: i64) -> Self {
        Self { auth, db }
    }

    fn client(&self, node: &NodeId) -> Result<redis::Client, DriverError> {
        let addr = connection_addr(node);
        let info = redis::ConnectionInfo {
            addr,
            redis: redis::RedisConnectionInfo {
                db: self.db,
                username: None,
                password: self.auth.clone(),
            },
        };
        redis::Client::open(info).map_err(map_redis_error)
    }
}

fn connection_addr(node: &NodeId) -> redis::ConnectionAddr {
    match node.as_str().rsplit_once(':') {
        Some((host, port)) => match port.parse::<u16>() {
            Ok(port) => redis::ConnectionAddr::Tcp(host.to_string(), port),
            Err(_) => redis::ConnectionAddr::Unix(PathBuf::from(node.as_str())),
        },
        None => redis::ConnectionAddr::Unix(PathBuf::from(node.as_str())),
    }
}

fn map_redis_error(err: redis::RedisError) -> DriverError {
    if err.kind() == redis::ErrorKind::Moved {
        if let Some((addr, slot)) = err.redirect_node() {
            return DriverError::Moved { slot, node: NodeId::new(addr) };
        }
    }
    if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        return DriverError::ConnectionLost(err.to_string());
    }
    DriverError::Reply(err.to_string())
}

impl Driver for RedisDriver {
    type Conn = redis::aio::MultiplexedConnection;

    async fn connect(&self, node: &NodeId) -> Result<Self::Conn, DriverError> {
        let client = self.client(node)?;
        client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(map_redis_error)
    }

    async fn invoke(
        &self,
        conn: &mut Self::Conn,
        verb: &str,
        args: &[String],
    ) -> Result<Reply, DriverError> {
        let mut command = redis::cmd(verb);
        for arg in args {
            command.arg(arg);
        }
        let value: redis::Value = command.query_async(conn).await.map_err(map_redis_error)?;
        Ok(Reply::from(value))
    }

    async fn open_stream(
        &self,
        node: &NodeId,
        kind: StreamKind,
        args: &[String],
    ) -> Result<(Reply, mpsc::Receiver<Reply>), DriverError> {
        let client = self.client(node)?;
        let (tx, rx) = mpsc::channel(PUSH_BUFFER);

        let ack = match kind {
            StreamKind::Subscribe | StreamKind::PatternSubscribe => match args.last() {
                Some(channel) => Reply::Text(channel.clone()),
                None => Reply::Text("OK".to_string()),
            },
            StreamKind::Monitor => Reply::Text("OK".to_string()),
        };

        match kind {
            StreamKind::Subscribe | StreamKind::PatternSubscribe => {
                let conn = client.get_async_connection().await.map_err(map_redis_error)?;
                let mut pubsub = conn.into_pubsub();
                for channel in args {
                    match kind {
                        StreamKind::Subscribe => pubsub.subscribe(channel).await,
                        _ => pubsub.psubscribe(channel).await,
                    }
                    .map_err(map_redis_error)?;
                }
                tokio::spawn(async move {
                    let mut pubsub = pubsub;
                    let mut messages = pubsub.on_message();
                    while let Some(message) = messages.next().await {
                        let payload = message
                            .get_payload::<redis::Value>()
                            .unwrap_or(redis::Value::Nil);
                        if tx.send(Reply::from(payload)).await.is_err() {
                            break;
                        }
                    }
                });
            }
            StreamKind::Monitor => {
                let conn = client.get_async_connection().await.map_err(map_redis_error)?;
                let mut monitor = conn.into_monitor();
                monitor.monitor().await.map_err(map_redis_error)?;
                tokio::spawn(async move {
                    let mut lines = monitor.into_on_message::<String>();
                    while let Some(line) = lines.next().await {
                        if tx.send(Reply::Text(line)).await.is_err() {
                            break;
                        }
                    }
                });
            }
        }

        Ok((ack, rx))
    }

    async fn close(&self, conn: Self::Conn) {
        drop(conn);
    }
}
