// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scratch files for uploaded images
//!
//! Uploads are written under server-generated names; the client filename
//! only contributes a sanitized extension.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Longest client extension carried over to the scratch name
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to stage upload at {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Directory where uploads are staged before recognition
#[derive(Debug, Clone)]
pub struct UploadStaging {
    dir: PathBuf,
}

impl UploadStaging {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scratch path for an upload: `<uuid>[.<ext>]`
    pub fn scratch_path(&self, client_filename: &str) -> PathBuf {
        let name = match safe_extension(client_filename) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        self.dir.join(name)
    }

    /// Write the upload to a fresh scratch file
    pub async fn stage(&self, client_filename: &str, bytes: &[u8]) -> Result<StagedUpload, StagingError> {
        let path = self.scratch_path(client_filename);
        // Guard first so a partial write is still cleaned up
        let staged = StagedUpload {
            path: path.clone(),
            removed: false,
        };

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StagingError::Write {
                path: path.display().to_string(),
                source,
            })?;

        debug!("Staged {} bytes at {}", bytes.len(), path.display());
        Ok(staged)
    }
}

/// Extension of the client filename when it is short and alphanumeric
fn safe_extension(client_filename: &str) -> Option<String> {
    let (_, ext) = client_filename.rsplit_once('.')?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

/// A staged upload, removed on `cleanup` or when dropped
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    removed: bool,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the scratch file if it still exists. Failures are logged,
    /// never returned.
    pub async fn cleanup(mut self) {
        self.removed = true;
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => {
                if let Err(e) = tokio::fs::remove_file(&self.path).await {
                    warn!("Failed to remove staged upload {}: {}", self.path.display(), e);
                }
            }
            Ok(false) => {}
            Err(e) => warn!("Failed to stat staged upload {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.removed && self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("Failed to remove staged upload {}: {}", self.path.display(), e);
            }
        }
    }
}
