//! Model artifact persistence
//!
//! On disk the artifact is a JSON envelope:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "checksum": 2864434397,
//!   "payload": "{\"schema\":[...],\"forest\":{...},...}"
//! }
//! ```
//!
//! The payload is the serialized `TrainedModel`, kept as a string so the
//! CRC32 covers exactly the bytes that are parsed back.
//!
//! Writes go to `<artifact>.tmp`, are fsynced, then renamed over the old
//! artifact, so a crash mid-write never leaves a half-written model behind.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::checksum::compute_checksum;
use super::errors::{ModelError, ModelResult};
use super::trained::TrainedModel;

/// Current artifact format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEnvelope {
    format_version: u32,
    checksum: u32,
    payload: String,
}

impl TrainedModel {
    /// Writes the model to `path`, atomically replacing any previous
    /// artifact.
    pub fn save(&self, path: &Path) -> ModelResult<()> {
        let payload =
            serde_json::to_string(self).map_err(|e| ModelError::write_failed(path, e))?;
        let envelope = ArtifactEnvelope {
            format_version: ARTIFACT_FORMAT_VERSION,
            checksum: compute_checksum(payload.as_bytes()),
            payload,
        };
        let content =
            serde_json::to_vec(&envelope).map_err(|e| ModelError::write_failed(path, e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ModelError::write_failed(path, e))?;
        }

        let temp_path = temp_path_for(path);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| ModelError::write_failed(&temp_path, e))?;
        file.write_all(&content)
            .map_err(|e| ModelError::write_failed(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| ModelError::write_failed(&temp_path, e))?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(ModelError::write_failed(path, e));
        }

        if let Some(parent) = path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }

    /// Loads and verifies an artifact.
    ///
    /// # Errors
    ///
    /// - `ArtifactMissing` if nothing exists at `path`
    /// - `ArtifactUnreadable` if the file or its JSON cannot be read
    /// - `UnsupportedVersion` for an unknown envelope version
    /// - `ChecksumMismatch` if the payload was altered
    /// - `Incompatible` if the forest and schema disagree
    pub fn load(path: &Path) -> ModelResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ModelError::ArtifactMissing {
                    path: path.display().to_string(),
                }
            } else {
                ModelError::unreadable(path, e)
            }
        })?;

        let envelope: ArtifactEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| ModelError::unreadable(path, e))?;

        if envelope.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                path: path.display().to_string(),
                found: envelope.format_version,
            });
        }

        let computed = compute_checksum(envelope.payload.as_bytes());
        if computed != envelope.checksum {
            return Err(ModelError::ChecksumMismatch {
                path: path.display().to_string(),
                expected: envelope.checksum,
                computed,
            });
        }

        let model: TrainedModel = serde_json::from_str(&envelope.payload)
            .map_err(|e| ModelError::unreadable(path, e))?;
        model.validate()?;

        Ok(model)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
