//! Report artifacts
//!
//! The rendered report lives in memory as an SVG string plus PNG bytes until
//! the very last pipeline step writes both to disk. File stems embed the
//! generation timestamp at second precision, so reruns never overwrite
//! earlier output; two runs inside the same second are an accepted
//! collision, not a handled case.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::{Error, Result};

/// Timestamp layout embedded in output file stems (sortable, second
/// precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// In-memory vector + raster encodings of one rendered report.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    svg: String,
    png: Vec<u8>,
}

/// Paths of one persisted report pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedReport {
    /// Vector (SVG) output path
    pub vector_path: PathBuf,
    /// Raster (PNG) output path
    pub raster_path: PathBuf,
}

impl ReportArtifact {
    pub(super) const fn new(svg: String, png: Vec<u8>) -> Self {
        Self { svg, png }
    }

    /// The vector encoding.
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// The raster encoding.
    #[must_use]
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Output stem for one generation instant.
    #[must_use]
    pub fn file_stem(prefix: &str, at: DateTime<Local>) -> String {
        format!("{prefix}_{}", at.format(TIMESTAMP_FORMAT))
    }

    /// Write both encodings into `dir` under a shared timestamped stem.
    ///
    /// # Errors
    /// Returns [`Error::PermissionDenied`] when the OS refuses the write and
    /// [`Error::Io`] for any other filesystem failure. The artifact itself is
    /// untouched either way; the caller decides whether a failed write is
    /// fatal.
    pub fn persist_into(
        &self,
        dir: &Path,
        prefix: &str,
        at: DateTime<Local>,
    ) -> Result<SavedReport> {
        let stem = Self::file_stem(prefix, at);
        let vector_path = dir.join(format!("{stem}.svg"));
        let raster_path = dir.join(format!("{stem}.png"));

        write_bytes(&vector_path, self.svg.as_bytes())?;
        write_bytes(&raster_path, &self.png)?;

        info!(
            vector = %vector_path.display(),
            raster = %raster_path.display(),
            "report persisted"
        );
        Ok(SavedReport {
            vector_path,
            raster_path,
        })
    }
}

/// Write one file, classifying permission refusals apart from other I/O
/// failures.
fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            Error::PermissionDenied {
                path: path.to_path_buf(),
                source: e,
            }
        } else {
            Error::Io(e)
        }
    })
}
