//! Artifact envelope: MessagePack + LZ4 with a SHA-256 trailer.
//!
//! The checksum means a torn or tampered blob is rejected before it can
//! deserialize into a half-usable classifier; combined with the store's
//! write-then-rename publish, no reader ever observes a partial artifact.

use super::ARTIFACT_FORMAT_VERSION;
use crate::classifier::KnnClassifier;
use crate::error::ModelError;
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

const CHECKSUM_LEN: usize = 32;

/// Metadata carried inside every artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Envelope layout version, for forward-compat rejection.
    pub format_version: u32,
    /// Monotonic model version assigned by the store at publish time.
    pub model_version: u32,
    /// Corpus size the classifier was fitted on.
    pub sample_count: usize,
    /// Publish timestamp (unix milliseconds).
    pub created_at: u64,
}

#[derive(Serialize, Deserialize)]
struct ArtifactBody {
    header: ArtifactHeader,
    classifier: KnnClassifier,
}

/// Serialize any value into the checksummed envelope.
pub fn encode_envelope<T: Serialize>(value: &T) -> Result<Vec<u8>, ModelError> {
    let msgpack = to_vec_named(value)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

/// Verify the trailer checksum, then decompress and deserialize.
pub fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ModelError> {
    // minimum: LZ4 size prefix + checksum trailer
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(ModelError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    if hasher.finalize().as_slice() != checksum_bytes {
        return Err(ModelError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| ModelError::Decompression)?;
    Ok(from_slice(&msgpack)?)
}

/// Serialize a fitted classifier plus its header into one blob.
pub fn serialize_artifact(
    classifier: &KnnClassifier,
    header: &ArtifactHeader,
) -> Result<Vec<u8>, ModelError> {
    encode_envelope(&ArtifactBody { header: header.clone(), classifier: classifier.clone() })
}

/// Decode an artifact blob, rejecting unknown envelope layouts.
pub fn deserialize_artifact(bytes: &[u8]) -> Result<(ArtifactHeader, KnnClassifier), ModelError> {
    let body: ArtifactBody = decode_envelope(bytes)?;
    if body.header.format_version > ARTIFACT_FORMAT_VERSION {
        return Err(ModelError::VersionMismatch {
            found: body.header.format_version,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    Ok((body.header, body.classifier))
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
