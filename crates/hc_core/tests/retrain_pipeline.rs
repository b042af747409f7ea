//! End-to-end retraining pipeline: feedback store -> corpus merge ->
//! fit -> atomic publish -> serving swap -> consumption marking.

use hc_core::{
    synthetic_corpus, Config, Digit, FeedbackStore, Frame, ModelStore, Retrainer, ServingModel,
    SyntheticExtractor, TrainError, TrainingCorpus,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn digit(v: u8) -> Digit {
    Digit::new(v).unwrap()
}

fn write_base_corpus(path: &Path, samples_per_digit: usize) {
    TrainingCorpus::new(synthetic_corpus(samples_per_digit, 42)).save(path).unwrap();
}

fn retrainer(config: &Config, serving: Arc<ServingModel>) -> Retrainer {
    Retrainer::new(
        &config.base_corpus,
        FeedbackStore::open(&config.feedback_dir),
        ModelStore::new(&config.model_dir),
        Box::new(SyntheticExtractor),
        serving,
    )
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        base_corpus: dir.path().join("base.hcc"),
        model_dir: dir.path().join("model"),
        feedback_dir: dir.path().join("feedback"),
    }
}

#[test]
fn feedback_is_folded_in_published_and_consumed() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_base_corpus(&config.base_corpus, 3);

    let feedback = FeedbackStore::open(&config.feedback_dir);
    feedback
        .record(&SyntheticExtractor::frame_for(digit(4)), Some(digit(9)), digit(4))
        .unwrap();
    feedback
        .record(&SyntheticExtractor::frame_for(digit(7)), None, digit(7))
        .unwrap();

    let serving = Arc::new(ServingModel::empty());
    let report = retrainer(&config, serving.clone()).run().unwrap();

    assert_eq!(report.version, Some(1));
    assert_eq!(report.corpus_size, 30 + 2);
    assert_eq!(report.feedback_used, 2);
    assert_eq!(report.feedback_skipped, 0);

    // the live handle now serves the published version
    assert_eq!(serving.version(), Some(1));
    // the artifact store agrees
    let store = ModelStore::new(&config.model_dir);
    assert_eq!(store.serving_pointer().unwrap().unwrap().version, 1);

    // both records were folded in, so both are consumed
    assert!(FeedbackStore::open(&config.feedback_dir).unconsumed().unwrap().is_empty());
}

#[test]
fn unextractable_feedback_is_skipped_and_stays_unconsumed() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_base_corpus(&config.base_corpus, 3);

    let feedback = FeedbackStore::open(&config.feedback_dir);
    // a stored image the extractor finds no hand in
    let blind_id = feedback.record(&Frame::new(vec![0]), Some(digit(2)), digit(6)).unwrap();
    feedback
        .record(&SyntheticExtractor::frame_for(digit(6)), Some(digit(2)), digit(6))
        .unwrap();

    let serving = Arc::new(ServingModel::empty());
    let report = retrainer(&config, serving).run().unwrap();

    // the run still succeeds, with the blind sample contributing nothing
    assert_eq!(report.version, Some(1));
    assert_eq!(report.corpus_size, 30 + 1);
    assert_eq!(report.feedback_used, 1);
    assert_eq!(report.feedback_skipped, 1);

    let pending = FeedbackStore::open(&config.feedback_dir).unconsumed().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, blind_id);
}

#[test]
fn rerun_without_new_feedback_reproduces_the_corpus_size() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_base_corpus(&config.base_corpus, 2);

    let feedback = FeedbackStore::open(&config.feedback_dir);
    feedback
        .record(&SyntheticExtractor::frame_for(digit(1)), Some(digit(10)), digit(1))
        .unwrap();

    let serving = Arc::new(ServingModel::empty());
    let job = retrainer(&config, serving.clone());

    let first = job.run().unwrap();
    assert_eq!(first.corpus_size, 21);
    assert_eq!(first.feedback_used, 1);

    let second = job.run().unwrap();
    assert_eq!(second.corpus_size, first.corpus_size);
    assert_eq!(second.feedback_used, 0);
    assert_eq!(second.version, Some(2));
    assert_eq!(serving.version(), Some(2));
}

#[test]
fn dry_run_publishes_and_consumes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_base_corpus(&config.base_corpus, 2);

    let feedback = FeedbackStore::open(&config.feedback_dir);
    feedback
        .record(&SyntheticExtractor::frame_for(digit(8)), None, digit(8))
        .unwrap();

    let serving = Arc::new(ServingModel::empty());
    let report = retrainer(&config, serving.clone())
        .run_with(hc_core::RetrainOptions { dry_run: true })
        .unwrap();

    assert_eq!(report.version, None);
    assert_eq!(report.corpus_size, 21);
    assert_eq!(serving.version(), None);
    assert!(ModelStore::new(&config.model_dir).serving_pointer().unwrap().is_none());
    assert_eq!(FeedbackStore::open(&config.feedback_dir).unconsumed().unwrap().len(), 1);
}

#[test]
fn single_class_corpus_aborts_without_touching_the_serving_model() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    // publish a good model first
    write_base_corpus(&config.base_corpus, 2);
    let serving = Arc::new(ServingModel::empty());
    retrainer(&config, serving.clone()).run().unwrap();
    assert_eq!(serving.version(), Some(1));

    // degrade the base corpus to a single label
    let one_label: Vec<_> = synthetic_corpus(3, 7)
        .into_iter()
        .filter(|s| s.label == digit(5))
        .collect();
    TrainingCorpus::new(one_label).save(&config.base_corpus).unwrap();

    let feedback = FeedbackStore::open(&config.feedback_dir);
    let id = feedback
        .record(&SyntheticExtractor::frame_for(digit(5)), None, digit(5))
        .unwrap();

    let result = retrainer(&config, serving.clone()).run();
    assert!(matches!(result, Err(TrainError::InsufficientClasses { found: 1 })));

    // previous artifact keeps serving, feedback stays pending for retry
    assert_eq!(serving.version(), Some(1));
    assert_eq!(
        ModelStore::new(&config.model_dir).serving_pointer().unwrap().unwrap().version,
        1
    );
    let pending = FeedbackStore::open(&config.feedback_dir).unconsumed().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
}

#[test]
fn published_model_serves_the_corrected_label() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_base_corpus(&config.base_corpus, 4);

    let feedback = FeedbackStore::open(&config.feedback_dir);
    feedback
        .record(&SyntheticExtractor::frame_for(digit(9)), Some(digit(3)), digit(9))
        .unwrap();

    let serving = Arc::new(ServingModel::empty());
    retrainer(&config, serving.clone()).run().unwrap();

    let pipeline = hc_core::GesturePipeline::new(Box::new(SyntheticExtractor), serving);
    let got = pipeline.classify(&SyntheticExtractor::frame_for(digit(9))).unwrap();
    assert_eq!(got, Some(digit(9)));
}
