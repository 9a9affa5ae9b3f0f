use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::{HarvestError, Result};

/// Plain-text file holding the last processed vacancy id.
#[derive(Debug, Clone)]
pub struct CheckpointFile {
    path: PathBuf,
}

impl CheckpointFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `None` when no checkpoint has been written yet.
    pub fn load(&self) -> Result<Option<i64>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let trimmed = raw.trim();
        trimmed.parse::<i64>().map(Some).map_err(|e| {
            HarvestError::Checkpoint(format!("{trimmed:?} in {}: {e}", self.path.display()))
        })
    }

    pub fn save(&self, id: i64) -> Result<()> {
        write_atomic(&self.path, id.to_string().as_bytes())?;
        tracing::info!("Checkpoint saved: last processed ID = {id}");
        Ok(())
    }
}

/// Read every row of a CSV file with a header. A missing file reads as empty.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(rows)
}

/// Overwrite `path` with a header row followed by every row.
pub fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| HarvestError::Io(e.into_error()))?;
    write_atomic(path, &bytes)
}

/// Write to a temp file next to `path`, then rename over it.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| HarvestError::Io(e.error))?;
    Ok(())
}
