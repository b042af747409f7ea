//! Versioned artifact files plus the one mutable thing in the whole
//! model system: the serving pointer.
//!
//! Publish ordering is the crash-safety story: the artifact blob is made
//! fully durable first, then the pointer is swapped atomically. A crash
//! between the two leaves the previous pointer serving a complete
//! artifact; there is no state in which the pointer names a partial file.

use super::artifact::{current_timestamp, deserialize_artifact, serialize_artifact, ArtifactHeader};
use super::ARTIFACT_FORMAT_VERSION;
use crate::classifier::KnnClassifier;
use crate::error::ModelError;
use crate::store::write_atomic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const SERVING_POINTER: &str = "serving.json";

/// The "currently serving" reference. Artifact files are immutable; this
/// pointer is the only thing `publish` ever replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServingPointer {
    pub version: u32,
    pub file: String,
    pub sample_count: usize,
    pub created_at: u64,
}

/// Directory of `artifact_NNNN.hcm` files plus `serving.json`.
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ModelStore { root: root.into() }
    }

    /// Writes a fresh immutable artifact, then swaps the serving pointer.
    pub fn publish(
        &self,
        classifier: &KnnClassifier,
        sample_count: usize,
    ) -> Result<ServingPointer, ModelError> {
        let version = self.next_version()?;
        let header = ArtifactHeader {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_version: version,
            sample_count,
            created_at: current_timestamp(),
        };
        let bytes = serialize_artifact(classifier, &header)?;

        let file = format!("artifact_{version:04}.hcm");
        let path = self.root.join(&file);
        if path.exists() {
            // artifacts are immutable once created
            return Err(ModelError::VersionExists { version });
        }
        write_atomic(&path, &bytes)?;

        let pointer = ServingPointer {
            version,
            file,
            sample_count,
            created_at: header.created_at,
        };
        let pointer_bytes = serde_json::to_vec_pretty(&pointer)?;
        write_atomic(&self.root.join(SERVING_POINTER), &pointer_bytes)?;

        log::info!("published model v{version} ({sample_count} samples) under {}", self.root.display());
        Ok(pointer)
    }

    /// Reads the serving pointer, or `None` when nothing was published.
    pub fn serving_pointer(&self) -> Result<Option<ServingPointer>, ModelError> {
        let path = self.root.join(SERVING_POINTER);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Loads the currently serving artifact.
    pub fn load_serving(&self) -> Result<(ArtifactHeader, KnnClassifier), ModelError> {
        let pointer = self.serving_pointer()?.ok_or_else(|| ModelError::NoServingModel {
            path: self.root.display().to_string(),
        })?;
        let bytes = std::fs::read(self.root.join(&pointer.file))?;
        deserialize_artifact(&bytes)
    }

    /// Headers of every artifact in the store, oldest first.
    pub fn artifact_headers(&self) -> Result<Vec<ArtifactHeader>, ModelError> {
        let mut headers = Vec::new();
        for file in self.artifact_files()? {
            let bytes = std::fs::read(self.root.join(&file))?;
            let (header, _) = deserialize_artifact(&bytes)?;
            headers.push(header);
        }
        headers.sort_by_key(|h| h.model_version);
        Ok(headers)
    }

    fn artifact_files(&self) -> Result<Vec<String>, ModelError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut files = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with("artifact_") && name.ends_with(".hcm") {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }

    fn next_version(&self) -> Result<u32, ModelError> {
        let last = self
            .artifact_files()?
            .iter()
            .filter_map(|name| {
                name.strip_prefix("artifact_")?.strip_suffix(".hcm")?.parse::<u32>().ok()
            })
            .max()
            .unwrap_or(0);
        Ok(last + 1)
    }
}
