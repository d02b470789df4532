//! Address-bar collaborators for link sync. Writes are best-effort: callers log and move on.

#![forbid(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history api unavailable")]
    Unavailable,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Replace the current location without navigating.
pub trait History {
    fn replace_state(&mut self, href: &str) -> Result<(), HistoryError>;
}

impl<H: History + ?Sized> History for Box<H> {
    fn replace_state(&mut self, href: &str) -> Result<(), HistoryError> { (**self).replace_state(href) }
}

/// Keeps every replaced location; the last one is the current link.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistory {
    writes: Vec<String>,
}

impl MemoryHistory {
    pub fn new() -> Self { Self::default() }
    pub fn current(&self) -> Option<&str> { self.writes.last().map(String::as_str) }
    pub fn writes(&self) -> &[String] { &self.writes }
}

impl History for MemoryHistory {
    fn replace_state(&mut self, href: &str) -> Result<(), HistoryError> {
        self.writes.push(href.to_string());
        Ok(())
    }
}

/// Stores the current link in a file, overwriting it on every replace.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
    base: String,
}

impl FileHistory {
    /// `base` is prefixed to the path-only href (e.g. `http://localhost:5000`).
    pub fn new(path: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self { path: path.into(), base: base.into().trim_end_matches('/').to_string() }
    }
}

impl History for FileHistory {
    fn replace_state(&mut self, href: &str) -> Result<(), HistoryError> {
        std::fs::write(&self.path, format!("{}{}\n", self.base, href))?;
        Ok(())
    }
}

/// History that is switched off; every write fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledHistory;

impl History for DisabledHistory {
    fn replace_state(&mut self, _href: &str) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable)
    }
}
