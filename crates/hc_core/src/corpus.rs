//! Training corpus: the immutable base sample set plus feedback unions.

use crate::digit::Digit;
use crate::error::ModelError;
use crate::landmarks::{FeatureVector, FEATURE_DIM};
use crate::model::artifact::{decode_envelope, encode_envelope};
use crate::store::write_atomic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// One labeled feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSample {
    pub features: FeatureVector,
    pub label: Digit,
}

/// A labeled sample set.
///
/// The base corpus on disk is never rewritten by retraining; feedback
/// samples are folded in via [`TrainingCorpus::merge`], which returns a
/// new corpus and leaves the receiver untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCorpus {
    samples: Vec<CorpusSample>,
}

impl TrainingCorpus {
    pub fn new(samples: Vec<CorpusSample>) -> Self {
        TrainingCorpus { samples }
    }

    pub fn samples(&self) -> &[CorpusSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of distinct labels present.
    pub fn label_count(&self) -> usize {
        self.samples.iter().map(|s| s.label).collect::<BTreeSet<_>>().len()
    }

    /// Union of this corpus and `extra`, in stable order (base first).
    pub fn merge(&self, extra: impl IntoIterator<Item = CorpusSample>) -> TrainingCorpus {
        let mut samples = self.samples.clone();
        samples.extend(extra);
        TrainingCorpus { samples }
    }

    /// Writes the corpus in the checksummed artifact envelope, atomically.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let bytes = encode_envelope(self)?;
        write_atomic(path, &bytes)?;
        log::info!("saved corpus: {} samples, {} labels -> {}", self.len(), self.label_count(), path.display());
        Ok(())
    }

    /// Loads and validates a corpus file. Every sample must carry the
    /// full 63-wide vector; anything else means the file is corrupt.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path)?;
        let corpus: TrainingCorpus = decode_envelope(&bytes)?;
        if corpus.samples.iter().any(|s| s.features.dim() != FEATURE_DIM) {
            return Err(ModelError::Corrupted);
        }
        log::debug!("loaded corpus: {} samples from {}", corpus.len(), path.display());
        Ok(corpus)
    }
}
