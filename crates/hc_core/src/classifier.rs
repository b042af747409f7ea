//! Digit classifier over flattened hand landmarks.

use crate::corpus::TrainingCorpus;
use crate::digit::Digit;
use crate::error::TrainError;
use crate::landmarks::{squared_distance, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Neighbors consulted per prediction.
pub const DEFAULT_K: usize = 5;

/// k-nearest-neighbour gesture classifier.
///
/// The fit is the training set itself, which keeps retraining exactly
/// reproducible: the same corpus always yields the same artifact and the
/// same predictions. `predict` is a pure function of the vector and the
/// fitted samples; it touches no shared state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    k: usize,
    samples: Vec<(FeatureVector, Digit)>,
}

impl KnnClassifier {
    /// Fits on the corpus with the default neighbourhood size.
    ///
    /// Fails with [`TrainError::InsufficientClasses`] when fewer than two
    /// distinct labels are present; a one-class fit would answer that
    /// class for every pose in the game.
    pub fn fit(corpus: &TrainingCorpus) -> Result<Self, TrainError> {
        Self::fit_with_k(corpus, DEFAULT_K)
    }

    pub fn fit_with_k(corpus: &TrainingCorpus, k: usize) -> Result<Self, TrainError> {
        let labels = corpus.label_count();
        if labels < 2 {
            return Err(TrainError::InsufficientClasses { found: labels });
        }
        let samples = corpus
            .samples()
            .iter()
            .map(|s| (s.features.clone(), s.label))
            .collect::<Vec<_>>();
        log::debug!("fitted knn classifier: {} samples, {} labels, k={}", samples.len(), labels, k);
        Ok(KnnClassifier { k: k.max(1), samples })
    }

    /// Majority vote among the k nearest samples; ties go to the label
    /// with the nearest member, so the answer is deterministic.
    pub fn predict(&self, features: &FeatureVector) -> Digit {
        let mut neighbors: Vec<(f32, Digit)> = self
            .samples
            .iter()
            .map(|(v, label)| (squared_distance(v, features), *label))
            .collect();
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));
        neighbors.truncate(self.k.min(neighbors.len()));

        let mut votes: BTreeMap<Digit, usize> = BTreeMap::new();
        for (_, label) in &neighbors {
            *votes.entry(*label).or_insert(0) += 1;
        }
        let best = votes.values().copied().max().unwrap_or(0);
        // fit guarantees a non-empty sample set, so the scan always hits
        neighbors
            .iter()
            .find(|(_, label)| votes[label] == best)
            .map(|(_, label)| *label)
            .unwrap_or_else(|| unreachable!("classifier fitted with an empty sample set"))
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn k(&self) -> usize {
        self.k
    }
}
