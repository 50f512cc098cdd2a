//! Single-command execution
//!
//! One [`Executor`] wraps one tokenized command. Running it against a
//! connection produces an [`Outcome`]: the command completed, the node
//! answered with a cluster redirect, the command failed, or it was a
//! blocking command that opened a push stream. Redirects are reported
//! upward rather than followed here; connection management stays with
//! the caller.

use crate::driver::{Driver, DriverError, NodeId, StreamKind};
use crate::error::{CliError, Result};
use crate::formatter::{format_reply, Rendered};
use crate::reply::Reply;

/// Commands that hold the connection open and push replies.
const BLOCKING_COMMANDS: [&str; 3] = ["subscribe", "psubscribe", "monitor"];

/// A pending cluster redirect, carrying everything needed to retry.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub slot: u16,
    pub target: NodeId,
    pub command: Vec<String>,
    pub key: Option<String>,
}

/// Side output emitted while a command runs.
#[derive(Debug)]
pub enum ExecEvent {
    Reply(Rendered),
    Error(DriverError),
}

/// Terminal state of one execution attempt.
pub enum Outcome {
    Completed,
    Redirected(Redirect),
    Failed,
    Streaming(tokio::sync::mpsc::Receiver<Reply>),
}

/// One tokenized command, ready to run.
#[derive(Debug, Clone)]
pub struct Executor {
    origin: Vec<String>,
    verb: String,
    args: Vec<String>,
    stream_kind: Option<StreamKind>,
}

impl Executor {
    /// Build an executor from tokenized input. Fails on empty input.
    pub fn new(tokens: &[String]) -> Result<Self> {
        let mut parts = tokens.to_vec();
        if parts.is_empty() {
            return Err(CliError::ParseError("Empty command".to_string()));
        }
        let verb = parts.remove(0).to_lowercase();
        let stream_kind = match verb.as_str() {
            "subscribe" => Some(StreamKind::Subscribe),
            "psubscribe" => Some(StreamKind::PatternSubscribe),
            "monitor" => Some(StreamKind::Monitor),
            _ => None,
        };
        Ok(Self {
            origin: tokens.to_vec(),
            verb,
            args: parts,
            stream_kind,
        })
    }

    /// First argument, the routing key for keyed commands.
    pub fn key(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Whether this command holds the connection open and streams replies.
    pub fn blocking(&self) -> bool {
        self.stream_kind.is_some()
    }

    /// Run against an established connection on `node`.
    ///
    /// Replies and errors go through `emit`; the returned outcome tells
    /// the caller whether to stop, retry elsewhere, or drain a stream.
    pub async fn run<D: Driver>(
        &self,
        driver: &D,
        node: &NodeId,
        conn: &mut D::Conn,
        emit: &mut dyn FnMut(ExecEvent),
    ) -> Outcome {
        if let Some(kind) = self.stream_kind {
            return match driver.open_stream(node, kind, &self.args).await {
                Ok((ack, rx)) => {
                    // The subscription acknowledgment prints before any push.
                    emit(ExecEvent::Reply(format_reply(&ack)));
                    Outcome::Streaming(rx)
                }
                Err(err) => {
                    emit(ExecEvent::Error(err));
                    Outcome::Failed
                }
            };
        }

        match driver.invoke(conn, &self.verb, &self.args).await {
            Ok(reply) => {
                emit(ExecEvent::Reply(format_reply(&reply)));
                Outcome::Completed
            }
            Err(DriverError::Moved { slot, node: target }) => Outcome::Redirected(Redirect {
                slot,
                target,
                command: self.origin.clone(),
                key: self.key().map(str::to_string),
            }),
            Err(err) => {
                emit(ExecEvent::Error(err));
                Outcome::Failed
            }
        }
    }
}

/// True when `verb` names a blocking, stream-producing command.
pub fn is_blocking(verb: &str) -> bool {
    BLOCKING_COMMANDS.contains(&verb.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_lowercased_args_preserved() {
        let exec = Executor::new(&["GET".to_string(), "Key".to_string()]).unwrap();
        assert_eq!(exec.verb(), "get");
        assert_eq!(exec.key(), Some("Key"));
        assert!(!exec.blocking());
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(Executor::new(&[]).is_err());
    }

    #[test]
    fn test_blocking_verbs() {
        for verb in ["subscribe", "PSUBSCRIBE", "Monitor"] {
            let exec = Executor::new(&[verb.to_string()]).unwrap();
            assert!(exec.blocking(), "{} should block", verb);
            assert!(is_blocking(verb));
        }
        assert!(!is_blocking("get"));
    }

    #[test]
    fn test_keyless_command() {
        let exec = Executor::new(&["ping".to_string()]).unwrap();
        assert_eq!(exec.key(), None);
    }
}
