//! Chunked CSV reader
//!
//! Streams the source file in bounded batches so arbitrarily large exports
//! never have to fit in memory at once.

use crate::error::{Result, VidSweepError};
use crate::types::{REQUIRED_COLUMNS, Row};
use csv::{DeserializeRecordsIntoIter, ReaderBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Lazy, single-pass sequence of row batches
pub struct ChunkReader {
    path: PathBuf,
    records: DeserializeRecordsIntoIter<File, Row>,
    chunk_size: usize,
    chunks_read: usize,
    skipped: usize,
    done: bool,
}

impl ChunkReader {
    /// Open `path` and validate its header.
    ///
    /// Fails with `NotFound`, `EmptyData` (no header line) or `Schema`
    /// (required columns missing) before any row is read.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self> {
        let path = path.as_ref();
        if chunk_size == 0 {
            return Err(VidSweepError::InvalidConfig(
                "chunk size must be at least 1".into(),
            ));
        }
        if !path.exists() {
            return Err(VidSweepError::NotFound(path.display().to_string()));
        }

        let mut reader = ReaderBuilder::new().from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(VidSweepError::EmptyData(path.display().to_string()));
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h == **col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(VidSweepError::Schema { missing });
        }

        Ok(Self {
            path: path.to_path_buf(),
            records: reader.into_deserialize(),
            chunk_size,
            chunks_read: 0,
            skipped: 0,
            done: false,
        })
    }

    /// Malformed records dropped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn next_chunk(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(self.chunk_size.min(4096));

        while rows.len() < self.chunk_size {
            match self.records.next() {
                Some(Ok(row)) => rows.push(row),
                Some(Err(e)) if is_record_error(&e) => {
                    self.skipped += 1;
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    tracing::debug!(line, error = %e, "skipping malformed record");
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        Ok(rows)
    }
}

/// Record-level problems are tolerated; I/O problems are not
fn is_record_error(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::UnequalLengths { .. }
            | csv::ErrorKind::Deserialize { .. }
            | csv::ErrorKind::Utf8 { .. }
    )
}

impl Iterator for ChunkReader {
    type Item = Result<Vec<Row>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let rows = match self.next_chunk() {
            Ok(rows) => rows,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if rows.is_empty() {
            self.done = true;
            if self.chunks_read == 0 {
                return Some(Err(VidSweepError::EmptyData(
                    self.path.display().to_string(),
                )));
            }
            return None;
        }

        self.chunks_read += 1;
        Some(Ok(rows))
    }
}
