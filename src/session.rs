//! Interactive session
//!
//! Owns the read-eval-print loop: reading lines, tokenizing, running the
//! command through the executor, following cluster redirects up to a hop
//! cap, and draining push streams until Ctrl-C. Output goes through an
//! [`OutputSink`] so the whole loop is testable without a terminal.

use crate::driver::{Driver, DriverError};
use crate::error::{CliError, Result};
use crate::executor::{ExecEvent, Executor, Outcome};
use crate::formatter::format_reply;
use crate::history::CommandHistory;
use crate::input::render_input;
use crate::registry::ClientRegistry;
use crate::reply::Reply;
use crate::tokenizer::tokenize;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use tokio::sync::mpsc;

/// Where rendered output lines go.
pub trait OutputSink: Send {
    fn line(&mut self, text: String);
}

/// Writes lines to stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn line(&mut self, text: String) {
        println!("{}", text);
    }
}

pub struct ReplSession<D: Driver> {
    registry: ClientRegistry<D>,
    cluster_mode: bool,
    max_redirects: u32,
    history_size: usize,
    sink: Box<dyn OutputSink>,
}

impl<D: Driver> ReplSession<D> {
    pub fn new(
        registry: ClientRegistry<D>,
        cluster_mode: bool,
        max_redirects: u32,
        history_size: usize,
        sink: Box<dyn OutputSink>,
    ) -> Self {
        Self {
            registry,
            cluster_mode,
            max_redirects,
            history_size,
            sink,
        }
    }

    /// Run one tokenized command to completion, following redirects.
    ///
    /// Command errors are printed and absorbed; losing the connection to
    /// the default node is fatal and propagates.
    pub async fn dispatch(&mut self, tokens: &[String]) -> Result<()> {
        let exec = Executor::new(tokens)?;

        // Key affinity only matters when the backend is a cluster.
        let key_hint = if self.cluster_mode { exec.key() } else { None };
        let mut node = self
            .registry
            .resolve(key_hint, None)
            .await
            .map_err(CliError::Driver)?;

        let mut hops: u32 = 0;
        loop {
            let mut events = Vec::new();
            let outcome = {
                let (driver, conn) = match self.registry.driver_and_connection(&node) {
                    Some(pair) => pair,
                    None => {
                        return Err(CliError::Driver(DriverError::ConnectionLost(format!(
                            "No connection to {}",
                            node
                        ))))
                    }
                };
                exec.run(driver, &node, conn, &mut |event| events.push(event))
                    .await
            };

            for event in events {
                match event {
                    ExecEvent::Reply(rendered) => {
                        for line in rendered.into_lines() {
                            self.sink.line(line.green().to_string());
                        }
                    }
                    ExecEvent::Error(err) => {
                        let fatal = matches!(err, DriverError::ConnectionLost(_))
                            && node == *self.registry.default_node();
                        if fatal {
                            return Err(CliError::Driver(err));
                        }
                        self.sink.line(format!("(error) {}", err).red().to_string());
                    }
                }
            }

            match outcome {
                Outcome::Completed | Outcome::Failed => return Ok(()),
                Outcome::Streaming(rx) => {
                    self.stream_replies(rx).await;
                    return Ok(());
                }
                Outcome::Redirected(redirect) => {
                    if !self.cluster_mode {
                        self.sink.line(
                            format!("MOVED slot={} node={}", redirect.slot, redirect.target)
                                .red()
                                .to_string(),
                        );
                        return Ok(());
                    }
                    hops += 1;
                    if hops > self.max_redirects {
                        self.sink.line(
                            format!("(error) Too many cluster redirects (max {})", self.max_redirects)
                                .red()
                                .to_string(),
                        );
                        return Ok(());
                    }
                    self.sink.line(
                        format!(
                            "-> Redirected to slot [{}] located at {}",
                            redirect.slot, redirect.target
                        )
                        .yellow()
                        .to_string(),
                    );
                    node = match self
                        .registry
                        .resolve(redirect.key.as_deref(), Some(&redirect.target))
                        .await
                    {
                        Ok(node) => node,
                        Err(err) => {
                            self.sink.line(format!("(error) {}", err).red().to_string());
                            return Ok(());
                        }
                    };
                }
            }
        }
    }

    /// Drain a push stream until the server ends it or Ctrl-C.
    async fn stream_replies(&mut self, mut rx: mpsc::Receiver<Reply>) {
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(reply) => {
                        for line in format_reply(&reply).into_lines() {
                            self.sink.line(line.green().to_string());
                        }
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    }

    /// Run a single command and exit.
    pub async fn run_once(&mut self, command: &[String]) -> Result<()> {
        let result = self.dispatch(command).await;
        self.registry.shutdown_all().await;
        result
    }

    /// Interactive prompt loop.
    pub async fn run_interactive(&mut self) -> Result<()> {
        let result = self.repl_loop().await;
        self.registry.shutdown_all().await;
        result
    }

    async fn repl_loop(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        let mut history = CommandHistory::new(self.history_size)?;
        for entry in history.entries() {
            let _ = editor.add_history_entry(entry);
        }

        let result = self.read_lines(&mut editor, &mut history).await;
        persist_history(&history, result)
    }

    async fn read_lines(
        &mut self,
        editor: &mut DefaultEditor,
        history: &mut CommandHistory,
    ) -> Result<()> {
        let prompt = format!("{}> ", self.registry.default_node());
        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    let rendered = render_input(&line);
                    let trimmed = rendered.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let tokens = match tokenize(trimmed) {
                        Ok(tokens) => tokens,
                        Err(err) => {
                            let err = CliError::from(err);
                            self.sink.line(format!("(error) {}", err).red().to_string());
                            continue;
                        }
                    };
                    if tokens.is_empty() {
                        continue;
                    }

                    let verb = tokens[0].to_lowercase();
                    if verb == "exit" || verb == "quit" {
                        break;
                    }
                    if verb == "clear" {
                        print!("\x1b[H\x1b[2J");
                        std::io::stdout().flush()?;
                        continue;
                    }

                    let _ = editor.add_history_entry(trimmed);
                    history.append(trimmed);

                    self.dispatch(&tokens).await?;
                }
                Err(ReadlineError::Interrupted) => {
                    self.sink.line("Use exit to quit".dimmed().to_string());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

/// Write history back to disk before surfacing the loop's result. When
/// the loop failed, the save is best-effort and the failure wins.
fn persist_history(history: &CommandHistory, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => history.save(),
        Err(err) => {
            let _ = history.save();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_history_persists_when_the_loop_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");
        let mut history = CommandHistory::with_path(&path, 100).unwrap();
        history.append("get foo");

        let fatal = CliError::Driver(DriverError::ConnectionLost("gone".into()));
        let result = persist_history(&history, Err(fatal));

        assert!(result.is_err());
        let reloaded = CommandHistory::with_path(&path, 100).unwrap();
        assert_eq!(reloaded.entries(), ["get foo"]);
    }

    #[test]
    fn test_history_persists_on_clean_exit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");
        let mut history = CommandHistory::with_path(&path, 100).unwrap();
        history.append("ping");

        persist_history(&history, Ok(())).unwrap();

        let reloaded = CommandHistory::with_path(&path, 100).unwrap();
        assert_eq!(reloaded.entries(), ["ping"]);
    }
}
