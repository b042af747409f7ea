//! The offline retraining job.
//!
//! Merges the immutable base corpus with unconsumed feedback, refits the
//! classifier and republishes. Per-sample extraction failures are skipped
//! and logged, never fatal to the run; a failed run (insufficient
//! classes, corpus load failure) aborts before publishing, so the
//! last-known-good artifact keeps serving and the pending records stay
//! unconsumed for the next attempt.

use crate::classifier::KnnClassifier;
use crate::corpus::{CorpusSample, TrainingCorpus};
use crate::error::TrainError;
use crate::extract::LandmarkExtractor;
use crate::feedback::FeedbackStore;
use crate::landmarks::FeatureVector;
use crate::model::{LoadedModel, ModelStore, ServingModel};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct RetrainOptions {
    /// Fit and report, but skip the publish / swap / consume tail.
    pub dry_run: bool,
}

/// What one run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrainReport {
    /// Version of the published artifact; `None` on a dry run.
    pub version: Option<u32>,
    /// Size of the merged corpus the fit saw.
    pub corpus_size: usize,
    /// Feedback records folded in (and marked consumed).
    pub feedback_used: usize,
    /// Feedback records skipped because their image would not extract.
    pub feedback_skipped: usize,
}

/// Batch retraining job. Runs independently of live inference; the
/// serving handle is the only thing the two flows share.
pub struct Retrainer {
    corpus_path: PathBuf,
    feedback: FeedbackStore,
    models: ModelStore,
    extractor: Box<dyn LandmarkExtractor>,
    serving: Arc<ServingModel>,
}

impl Retrainer {
    pub fn new(
        corpus_path: impl Into<PathBuf>,
        feedback: FeedbackStore,
        models: ModelStore,
        extractor: Box<dyn LandmarkExtractor>,
        serving: Arc<ServingModel>,
    ) -> Self {
        Retrainer {
            corpus_path: corpus_path.into(),
            feedback,
            models,
            extractor,
            serving,
        }
    }

    pub fn run(&self) -> Result<RetrainReport, TrainError> {
        self.run_with(RetrainOptions::default())
    }

    pub fn run_with(&self, options: RetrainOptions) -> Result<RetrainReport, TrainError> {
        let base = TrainingCorpus::load(&self.corpus_path)?;
        log::info!(
            "retrain: base corpus {} samples, {} labels",
            base.len(),
            base.label_count()
        );

        let pending = self.feedback.unconsumed()?;
        log::info!("retrain: {} unconsumed feedback records", pending.len());

        let mut extra: Vec<CorpusSample> = Vec::new();
        let mut used: Vec<Uuid> = Vec::new();
        let mut skipped = 0usize;

        for record in &pending {
            let image = match self.feedback.fetch_image(record) {
                Ok(image) => image,
                Err(err) => {
                    log::warn!("feedback {}: image fetch failed, skipping: {err}", record.id);
                    skipped += 1;
                    continue;
                }
            };
            // first-hand policy, same as the live pipeline
            let Some(hand) = self.extractor.detect(&image).into_iter().next() else {
                log::warn!("feedback {}: no hand in stored image, skipping", record.id);
                skipped += 1;
                continue;
            };
            extra.push(CorpusSample {
                features: FeatureVector::from_landmarks(&hand),
                label: record.corrected,
            });
            used.push(record.id);
        }

        let merged = base.merge(extra);
        let classifier = KnnClassifier::fit(&merged)?;

        if options.dry_run {
            log::info!("retrain: dry run, not publishing ({} samples)", merged.len());
            return Ok(RetrainReport {
                version: None,
                corpus_size: merged.len(),
                feedback_used: used.len(),
                feedback_skipped: skipped,
            });
        }

        // Ordering matters: artifact durable, then pointer swap, then live
        // install, and only after all of that mark the records consumed. A
        // crash anywhere up to the last step retries cleanly next run.
        let pointer = self.models.publish(&classifier, merged.len())?;
        let (header, classifier) = self.models.load_serving()?;
        self.serving.install(LoadedModel { header, classifier });
        self.feedback.mark_consumed(&used)?;

        log::info!(
            "retrain: published v{} ({} samples, {} feedback folded in, {} skipped)",
            pointer.version,
            merged.len(),
            used.len(),
            skipped
        );
        Ok(RetrainReport {
            version: Some(pointer.version),
            corpus_size: merged.len(),
            feedback_used: used.len(),
            feedback_skipped: skipped,
        })
    }
}
