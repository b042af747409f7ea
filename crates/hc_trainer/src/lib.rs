//! Base corpus builder.
//!
//! Turns a curated dataset of landmark dumps (`<dataset>/<digit>/*.json`,
//! one dump per captured image) into the immutable base corpus file the
//! retraining job unions feedback into. Dumps that fail to parse are
//! skipped with a warning; they never abort the build.

use anyhow::{Context, Result};
use hc_core::{
    CorpusSample, Digit, DumpExtractor, FeatureVector, Frame, LandmarkExtractor, TrainingCorpus,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Summary of a corpus build, printed by the CLI and optionally written
/// as a JSON sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusMetadata {
    /// Samples that made it into the corpus.
    pub samples: usize,
    /// Distinct labels present.
    pub labels: usize,
    /// Dumps skipped because they would not parse or extract.
    pub skipped: usize,
    /// SHA256 checksum of the written file (hex string).
    pub checksum: String,
    /// Creation time (RFC3339).
    pub created_at: String,
    /// Written file size in bytes.
    pub file_size: u64,
}

/// Builds the base corpus from a per-label dataset directory.
pub fn build_corpus(dataset: &Path, out: &Path) -> Result<CorpusMetadata> {
    let mut samples: Vec<CorpusSample> = Vec::new();
    let mut skipped = 0usize;
    let extractor = DumpExtractor;

    let entries = std::fs::read_dir(dataset)
        .with_context(|| format!("failed to read dataset directory: {}", dataset.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let dir_name = entry.file_name().to_string_lossy().into_owned();
        let label = match dir_name.parse::<u8>().ok().and_then(|v| Digit::new(v).ok()) {
            Some(label) => label,
            None => {
                log::warn!("dataset directory {dir_name:?} is not a digit label, skipping");
                continue;
            }
        };

        for dump in std::fs::read_dir(entry.path())? {
            let path = dump?.path();
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::warn!("{}: unreadable, skipping: {err}", path.display());
                    skipped += 1;
                    continue;
                }
            };
            match extractor.detect(&Frame::new(bytes)).into_iter().next() {
                Some(hand) => samples.push(CorpusSample {
                    features: FeatureVector::from_landmarks(&hand),
                    label,
                }),
                None => {
                    log::warn!("{}: no hand in dump, skipping", path.display());
                    skipped += 1;
                }
            }
        }
    }

    let corpus = TrainingCorpus::new(samples);
    let labels = corpus.label_count();
    let sample_count = corpus.len();
    corpus
        .save(out)
        .with_context(|| format!("failed to write corpus: {}", out.display()))?;

    let written = std::fs::read(out)?;
    let mut hasher = Sha256::new();
    hasher.update(&written);
    let checksum = format!("{:x}", hasher.finalize());

    Ok(CorpusMetadata {
        samples: sample_count,
        labels,
        skipped,
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        file_size: written.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::{synthetic_hand, LANDMARK_COUNT};
    use tempfile::TempDir;

    fn write_dump(dir: &Path, name: &str, digit: Digit) {
        let hand = synthetic_hand(digit);
        let points: Vec<_> = hand.0.to_vec();
        std::fs::write(dir.join(name), serde_json::to_vec(&points).unwrap()).unwrap();
    }

    #[test]
    fn builds_a_corpus_from_label_directories() {
        let dataset = TempDir::new().unwrap();
        for label in [1u8, 2, 3] {
            let dir = dataset.path().join(label.to_string());
            std::fs::create_dir_all(&dir).unwrap();
            write_dump(&dir, "a.json", Digit::new(label).unwrap());
            write_dump(&dir, "b.json", Digit::new(label).unwrap());
        }

        let out = dataset.path().join("base.hcc");
        let meta = build_corpus(dataset.path(), &out).unwrap();

        assert_eq!(meta.samples, 6);
        assert_eq!(meta.labels, 3);
        assert_eq!(meta.skipped, 0);
        assert_eq!(TrainingCorpus::load(&out).unwrap().len(), 6);
    }

    #[test]
    fn bad_dumps_are_skipped_not_fatal() {
        let dataset = TempDir::new().unwrap();
        let dir = dataset.path().join("4");
        std::fs::create_dir_all(&dir).unwrap();
        write_dump(&dir, "good.json", Digit::new(4).unwrap());
        std::fs::write(dir.join("bad.json"), b"not a dump").unwrap();
        // wrong point count
        let short: Vec<_> = synthetic_hand(Digit::new(4).unwrap()).0[..LANDMARK_COUNT - 1].to_vec();
        std::fs::write(dir.join("short.json"), serde_json::to_vec(&short).unwrap()).unwrap();

        let out = dataset.path().join("base.hcc");
        let meta = build_corpus(dataset.path(), &out).unwrap();

        assert_eq!(meta.samples, 1);
        assert_eq!(meta.skipped, 2);
    }

    #[test]
    fn non_label_directories_are_ignored() {
        let dataset = TempDir::new().unwrap();
        std::fs::create_dir_all(dataset.path().join("notes")).unwrap();
        let dir = dataset.path().join("2");
        std::fs::create_dir_all(&dir).unwrap();
        write_dump(&dir, "a.json", Digit::new(2).unwrap());

        let out = dataset.path().join("base.hcc");
        let meta = build_corpus(dataset.path(), &out).unwrap();
        assert_eq!(meta.samples, 1);
        assert_eq!(meta.labels, 1);
    }
}
