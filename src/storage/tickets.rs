//! JSONL ticket files
//!
//! One ticket record per line. Blank lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{EpicMap, Ticket};

#[derive(Debug, Error)]
pub enum TicketFileError {
    #[error("Failed to open ticket file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read line {line}: {source}")]
    Read { line: usize, source: std::io::Error },

    #[error("Failed to parse ticket at line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

/// A file of ticket records in JSON Lines format
pub struct TicketFile {
    path: PathBuf,
}

impl TicketFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns true when the path looks like a JSON Lines file
    pub fn is_jsonl(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("jsonl"))
            .unwrap_or(false)
    }

    /// Reads all tickets, preserving file order
    pub fn read_all(&self) -> Result<Vec<Ticket>, TicketFileError> {
        let file = File::open(&self.path).map_err(|source| TicketFileError::Open {
            path: self.path.clone(),
            source,
        })?;

        read_tickets(BufReader::new(file))
    }

    /// Reads the file as an epic lookup keyed by ticket key
    pub fn read_epics(&self) -> Result<EpicMap, TicketFileError> {
        Ok(self
            .read_all()?
            .into_iter()
            .map(|epic| (epic.key.clone(), epic))
            .collect())
    }
}

fn read_tickets(reader: impl BufRead) -> Result<Vec<Ticket>, TicketFileError> {
    let mut tickets = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line = line.map_err(|source| TicketFileError::Read {
            line: line_num,
            source,
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let ticket: Ticket = serde_json::from_str(&line).map_err(|source| {
            TicketFileError::Parse {
                line: line_num,
                source,
            }
        })?;
        tickets.push(ticket);
    }

    Ok(tickets)
}
