//! Hot-swappable handle to the currently loaded classifier.

use super::artifact::ArtifactHeader;
use super::store::ModelStore;
use crate::classifier::KnnClassifier;
use crate::digit::Digit;
use crate::error::ModelError;
use crate::landmarks::FeatureVector;
use std::sync::{Arc, RwLock};

/// An artifact deserialized into a usable classifier.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub header: ArtifactHeader,
    pub classifier: KnnClassifier,
}

/// The shared mutable reference between live inference and retraining.
///
/// Swaps replace the `Arc`, never the weights under it: a prediction that
/// started before [`ServingModel::install`] finishes against the version
/// it snapshotted, and every later call observes the new one. With no
/// model installed, prediction fails with [`ModelError::Unavailable`] and
/// serving stays blocked until a load succeeds.
#[derive(Debug, Default)]
pub struct ServingModel {
    inner: RwLock<Option<Arc<LoadedModel>>>,
}

impl ServingModel {
    /// A handle with nothing loaded yet.
    pub fn empty() -> Self {
        ServingModel { inner: RwLock::new(None) }
    }

    /// Loads whatever the store's pointer currently names.
    pub fn from_store(store: &ModelStore) -> Result<Self, ModelError> {
        let (header, classifier) = store.load_serving()?;
        let serving = ServingModel::empty();
        serving.install(LoadedModel { header, classifier });
        Ok(serving)
    }

    /// Atomically replaces the served model.
    pub fn install(&self, model: LoadedModel) {
        let version = model.header.model_version;
        *self.inner.write().unwrap() = Some(Arc::new(model));
        log::info!("serving model v{version}");
    }

    /// The current model, pinned: the returned `Arc` stays valid across
    /// any number of concurrent installs.
    pub fn snapshot(&self) -> Option<Arc<LoadedModel>> {
        self.inner.read().unwrap().clone()
    }

    pub fn version(&self) -> Option<u32> {
        self.snapshot().map(|m| m.header.model_version)
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Digit, ModelError> {
        let model = self.snapshot().ok_or(ModelError::Unavailable)?;
        Ok(model.classifier.predict(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TrainingCorpus;
    use crate::model::ARTIFACT_FORMAT_VERSION;
    use crate::synthetic::{synthetic_corpus, synthetic_hand};

    fn loaded(version: u32) -> LoadedModel {
        let corpus = TrainingCorpus::new(synthetic_corpus(2, version as u64));
        LoadedModel {
            header: ArtifactHeader {
                format_version: ARTIFACT_FORMAT_VERSION,
                model_version: version,
                sample_count: corpus.len(),
                created_at: 0,
            },
            classifier: KnnClassifier::fit(&corpus).unwrap(),
        }
    }

    #[test]
    fn empty_handle_refuses_to_predict() {
        let serving = ServingModel::empty();
        let v = FeatureVector::from_landmarks(&synthetic_hand(Digit::ALL[0]));
        assert!(matches!(serving.predict(&v), Err(ModelError::Unavailable)));
    }

    #[test]
    fn install_makes_new_calls_observe_the_new_version() {
        let serving = ServingModel::empty();
        serving.install(loaded(1));
        assert_eq!(serving.version(), Some(1));
        serving.install(loaded(2));
        assert_eq!(serving.version(), Some(2));
    }

    #[test]
    fn a_pinned_snapshot_survives_a_swap() {
        let serving = ServingModel::empty();
        serving.install(loaded(1));

        let in_flight = serving.snapshot().unwrap();
        serving.install(loaded(2));

        // the in-flight prediction still runs against v1
        assert_eq!(in_flight.header.model_version, 1);
        let v = FeatureVector::from_landmarks(&synthetic_hand(Digit::ALL[3]));
        assert_eq!(in_flight.classifier.predict(&v), Digit::ALL[3]);
        assert_eq!(serving.version(), Some(2));
    }
}
