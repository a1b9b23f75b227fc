use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::error::TelemetryError;
use super::event::LogEntry;
use crate::kernel::time::{self, Timestamp};

pub const DEFAULT_PREFIX: &str = "mcp_logs_";

/// Writes entry snapshots as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    prefix: String,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<prefix>YYYYmmdd_HHMMSS.json`
    pub fn default_path(&self, at: &Timestamp) -> PathBuf {
        self.dir.join(format!("{}{}.json", self.prefix, time::compact(at)))
    }

    /// Serialize `entries` to `destination`, or to [`Exporter::default_path`] for now.
    ///
    /// The file is written beside the target and renamed into place, so the target
    /// either holds the complete export or is left untouched.
    pub fn export(
        &self,
        entries: &[LogEntry],
        destination: Option<&Path>,
    ) -> Result<PathBuf, TelemetryError> {
        let path = match destination {
            Some(p) => p.to_path_buf(),
            None => self.default_path(&time::now()),
        };
        let json = serde_json::to_vec_pretty(entries)?;
        write_atomic(&path, &json)?;

        tracing::info!(path = %path.display(), entries = entries.len(), "Telemetry log exported");
        Ok(path)
    }

    /// Read back a file produced by [`Exporter::export`].
    pub fn load(path: &Path) -> Result<Vec<LogEntry>, TelemetryError> {
        let content = fs::read(path).map_err(|source| TelemetryError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&content)?)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(".", DEFAULT_PREFIX)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), TelemetryError> {
    let io_err = |source: std::io::Error| TelemetryError::Export {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    // Dropping the temp file on any early return removes it.
    let tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer.write_all(data).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
