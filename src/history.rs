//! Persistent command history
//!
//! One plain-text file, one command per line, trimmed to a maximum
//! number of entries on save. Lives at `~/.rdcli/history` by default.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

const HISTORY_FILE: &str = "history";
const CONFIG_DIR: &str = ".rdcli";

pub struct CommandHistory {
    path: PathBuf,
    max_entries: usize,
    entries: Vec<String>,
}

impl CommandHistory {
    /// Open the history at its default location, creating parents as
    /// needed on save.
    pub fn new(max_entries: usize) -> Result<Self> {
        Self::with_path(default_path(), max_entries)
    }

    pub fn with_path(path: impl Into<PathBuf>, max_entries: usize) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            fs::read_to_string(&path)?
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        Ok(Self {
            path,
            max_entries,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a command. Blank lines and immediate repeats are skipped.
    pub fn append(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() {
            return;
        }
        if self.entries.last().map(String::as_str) == Some(command) {
            return;
        }
        self.entries.push(command.to_string());
    }

    /// Write the newest `max_entries` commands back to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let start = self.entries.len().saturating_sub(self.max_entries);
        let mut body = self.entries[start..].join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        fs::write(&self.path, body)?;
        Ok(())
    }
}

fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(CONFIG_DIR).join(HISTORY_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let history = CommandHistory::with_path(dir.path().join("history"), 100).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_append_skips_blank_and_repeats() {
        let dir = tempdir().unwrap();
        let mut history = CommandHistory::with_path(dir.path().join("history"), 100).unwrap();
        history.append("get foo");
        history.append("get foo");
        history.append("   ");
        history.append("set foo bar");
        history.append("get foo");
        assert_eq!(history.entries(), ["get foo", "set foo bar", "get foo"]);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history");
        let mut history = CommandHistory::with_path(&path, 100).unwrap();
        history.append("ping");
        history.append("info");
        history.save().unwrap();

        let reloaded = CommandHistory::with_path(&path, 100).unwrap();
        assert_eq!(reloaded.entries(), ["ping", "info"]);
    }

    #[test]
    fn test_save_trims_to_max() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");
        let mut history = CommandHistory::with_path(&path, 2).unwrap();
        history.append("one");
        history.append("two");
        history.append("three");
        history.save().unwrap();

        let reloaded = CommandHistory::with_path(&path, 2).unwrap();
        assert_eq!(reloaded.entries(), ["two", "three"]);
    }
}
