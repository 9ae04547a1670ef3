use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::config::FieldLimits;
use crate::model::flight::Flight;
use crate::store::logbook::{LogBook, StoreError};

/// On-disk form of a logbook
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogBookFile {
    /// Id the next added flight gets. Kept so ids stay unique across
    /// sessions even after the highest flight is deleted.
    #[serde(default = "default_next_id")]
    pub next_id: u64,
    #[serde(default)]
    pub flights: Vec<Flight>,
}

fn default_next_id() -> u64 {
    1
}

impl LogBookFile {
    pub fn from_logbook(book: &LogBook) -> Self {
        LogBookFile {
            next_id: book.next_id(),
            flights: book.iter().cloned().collect(),
        }
    }

    pub fn into_logbook(self, limits: FieldLimits) -> Result<LogBook, LogBookError> {
        Ok(LogBook::from_flights(self.flights, self.next_id, limits)?)
    }
}

/// Error type for logbook file I/O
#[derive(Debug, thiserror::Error)]
pub enum LogBookError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse logbook: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("invalid logbook: {0}")]
    Invalid(#[from] StoreError),
}

/// Read the raw logbook file. A missing file is an empty logbook.
pub fn read_logbook_file(path: &Path) -> Result<LogBookFile, LogBookError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no logbook file; starting empty");
        return Ok(LogBookFile {
            next_id: default_next_id(),
            flights: Vec::new(),
        });
    }
    let text = fs::read_to_string(path).map_err(|e| LogBookError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&text)?)
}

pub fn load_logbook(path: &Path, limits: FieldLimits) -> Result<LogBook, LogBookError> {
    let book = read_logbook_file(path)?.into_logbook(limits)?;
    tracing::debug!(path = %path.display(), flights = book.len(), "logbook loaded");
    Ok(book)
}

pub fn save_logbook(path: &Path, book: &LogBook) -> Result<(), LogBookError> {
    let mut text = serde_json::to_string_pretty(&LogBookFile::from_logbook(book))?;
    text.push('\n');
    atomic_write(path, text.as_bytes()).map_err(|e| LogBookError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), flights = book.len(), "logbook saved");
    Ok(())
}

/// Write `content` to a temp file next to `path`, then rename it over
/// `path`, so readers never see a partial logbook.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
