//! Dated, collision-free storage for uploaded files
//!
//! Files land under `base_dir/YYYY/MM/<uuid>/<sanitized filename>`. The
//! returned path doubles as the source identifier of the file's passages.

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::Result;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\-.]").unwrap());

/// Location of a stored upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: Uuid,
    pub path: PathBuf,
}

impl StoredFile {
    /// Path as a passage source identifier
    pub fn source(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Stores uploaded files in a dated directory tree
#[derive(Debug, Clone)]
pub struct FileClerk {
    base_dir: PathBuf,
}

impl FileClerk {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.base_dir.clone())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `data` under a fresh path for `filename`
    pub async fn store(&self, filename: &str, data: &[u8]) -> Result<StoredFile> {
        let stored = self.reserve(filename);
        self.save(&stored, data).await?;
        Ok(stored)
    }

    /// Pick the path `filename` will be stored at, without touching disk
    ///
    /// Lets callers use [`StoredFile::source`] before the upload is kept.
    pub fn reserve(&self, filename: &str) -> StoredFile {
        self.generate_path(filename, Utc::now())
    }

    /// Write `data` at a reserved path
    pub async fn save(&self, stored: &StoredFile, data: &[u8]) -> Result<()> {
        if let Some(parent) = stored.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&stored.path, data).await?;

        tracing::info!("Stored {} bytes at {}", data.len(), stored.path.display());
        Ok(())
    }

    /// Path for `filename` uploaded at `now`, with a new id
    pub fn generate_path(&self, filename: &str, now: DateTime<Utc>) -> StoredFile {
        let id = Uuid::new_v4();
        let path = self
            .base_dir
            .join(format!("{:04}", now.year()))
            .join(format!("{:02}", now.month()))
            .join(id.to_string())
            .join(sanitize_filename(filename));

        StoredFile { id, path }
    }
}

/// Replace everything but word characters, `-` and `.` with `_`
///
/// Names made only of dots, and empty names, cannot escape the upload
/// directory either.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(filename, "_");
    if cleaned.chars().all(|c| c == '.') {
        return "_".repeat(cleaned.len().max(1));
    }
    cleaned.into_owned()
}
